use super::{invalid_value, Codec};
use crate::abi::reader::Reader;
use crate::abi::value::AbiValue;
use crate::abi::writer::Writer;
use crate::error::{AbiError, AbiResult};

fn write_payload(writer: &mut Writer, bytes: &[u8]) -> usize {
    writer.write_index(bytes.len()) + writer.write_bytes(bytes)
}

/// Length word then payload; a truncated final payload is tolerated in loose mode
fn read_payload<'a>(reader: &mut Reader<'a>, type_name: &str) -> AbiResult<&'a [u8]> {
    let len = reader.read_index(type_name)?;
    reader.read_bytes(len, true)
}

/// `bytes`: length-prefixed, padded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicBytesCoder {
    local_name: Option<String>,
}

impl DynamicBytesCoder {
    pub fn new(local_name: Option<String>) -> Self {
        Self { local_name }
    }
}

impl Codec for DynamicBytesCoder {
    fn name(&self) -> &str {
        "bytes"
    }

    fn type_name(&self) -> String {
        "bytes".to_string()
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        match value {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Ok(write_payload(writer, b)),
            _ => Err(invalid_value(self, value, "invalid bytes")),
        }
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let bytes = read_payload(reader, self.name())?.to_vec();
        Ok(reader.coerce(self.name(), AbiValue::Bytes(bytes)))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::Bytes(Vec::new())
    }
}

/// `string`: UTF-8 encoded like `bytes`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringCoder {
    local_name: Option<String>,
}

impl StringCoder {
    pub fn new(local_name: Option<String>) -> Self {
        Self { local_name }
    }
}

impl Codec for StringCoder {
    fn name(&self) -> &str {
        "string"
    }

    fn type_name(&self) -> String {
        "string".to_string()
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        true
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        match value {
            AbiValue::String(s) => Ok(write_payload(writer, s.as_bytes())),
            _ => Err(invalid_value(self, value, "invalid string")),
        }
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let at = reader.consumed();
        let bytes = read_payload(reader, self.name())?;
        let s = std::str::from_utf8(bytes).map_err(|e| {
            AbiError::malformed("string", format!("invalid UTF-8: {}", e), reader.data().len(), at)
        })?;
        Ok(reader.coerce(self.name(), AbiValue::String(s.to_string())))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::String(String::new())
    }
}
