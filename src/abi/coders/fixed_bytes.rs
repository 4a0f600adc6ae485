use super::{invalid_value, out_of_range, Codec};
use crate::abi::reader::Reader;
use crate::abi::value::AbiValue;
use crate::abi::writer::Writer;
use crate::error::AbiResult;

/// `bytesN`: N bytes left-aligned in one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedBytesCoder {
    size: usize,
    name: String,
    local_name: Option<String>,
}

impl FixedBytesCoder {
    /// `size` must be in `1..=32`, the factory checks it
    pub fn new(size: usize, local_name: Option<String>) -> Self {
        Self {
            size,
            name: format!("bytes{}", size),
            local_name,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl Codec for FixedBytesCoder {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> String {
        self.name.clone()
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        let bytes = match value {
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => b,
            _ => return Err(invalid_value(self, value, "invalid fixed bytes")),
        };
        if bytes.len() != self.size {
            return Err(out_of_range(self, value, "incorrect data length"));
        }
        Ok(writer.write_bytes(bytes))
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let bytes = reader.read_bytes(self.size, false)?.to_vec();
        Ok(reader.coerce(self.name(), AbiValue::FixedBytes(bytes)))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::FixedBytes(vec![0u8; self.size])
    }
}
