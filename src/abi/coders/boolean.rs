use super::{invalid_value, Codec};
use crate::abi::reader::Reader;
use crate::abi::value::AbiValue;
use crate::abi::writer::Writer;
use crate::error::AbiResult;

/// `bool`: one word holding 0 or 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanCoder {
    local_name: Option<String>,
}

impl BooleanCoder {
    pub fn new(local_name: Option<String>) -> Self {
        Self { local_name }
    }
}

impl Codec for BooleanCoder {
    fn name(&self) -> &str {
        "bool"
    }

    fn type_name(&self) -> String {
        "bool".to_string()
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        match value {
            AbiValue::Bool(b) => Ok(writer.write_index(usize::from(*b))),
            _ => Err(invalid_value(self, value, "invalid bool")),
        }
    }

    /// Any non-zero word decodes as `true`
    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let value = !reader.read_value()?.is_zero();
        Ok(reader.coerce(self.name(), AbiValue::Bool(value)))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::Bool(false)
    }
}
