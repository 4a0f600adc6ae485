use super::{invalid_value, Codec};
use crate::abi::reader::Reader;
use crate::abi::value::AbiValue;
use crate::abi::writer::Writer;
use crate::error::AbiResult;

/// The empty slot: occupies zero bytes on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NullCoder {
    local_name: Option<String>,
}

impl NullCoder {
    pub fn new(local_name: Option<String>) -> Self {
        Self { local_name }
    }
}

impl Codec for NullCoder {
    fn name(&self) -> &str {
        "null"
    }

    fn type_name(&self) -> String {
        String::new()
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn encode(&self, _writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        match value {
            AbiValue::Null => Ok(0),
            _ => Err(invalid_value(self, value, "not null")),
        }
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        reader.read_bytes(0, false)?;
        Ok(reader.coerce(self.name(), AbiValue::Null))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::Null
    }
}
