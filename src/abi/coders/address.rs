use ethers_core::types::Address;

use super::{invalid_value, Codec};
use crate::abi::reader::Reader;
use crate::abi::value::{parse_address, AbiValue};
use crate::abi::writer::Writer;
use crate::error::{AbiError, AbiResult};

/// `address`: 20 bytes right-aligned in one word
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCoder {
    local_name: Option<String>,
}

impl AddressCoder {
    pub fn new(local_name: Option<String>) -> Self {
        Self { local_name }
    }
}

impl Codec for AddressCoder {
    fn name(&self) -> &str {
        "address"
    }

    fn type_name(&self) -> String {
        "address".to_string()
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        false
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        let address = match value {
            AbiValue::Address(a) => *a,
            AbiValue::String(s) => {
                parse_address(s).map_err(|e| invalid_value(self, value, &e.to_string()))?
            }
            _ => return Err(invalid_value(self, value, "invalid address")),
        };

        let mut word = [0u8; 32];
        word[12..].copy_from_slice(address.as_bytes());
        Ok(writer.write_word(&word))
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let at = reader.consumed();
        let word = reader.read_word()?;
        if word[..12].iter().any(|b| *b != 0) {
            return Err(AbiError::malformed("address", "address word has non-zero high bytes", reader.data().len(), at));
        }
        let address = Address::from_slice(&word[12..]);
        Ok(reader.coerce(self.name(), AbiValue::Address(address)))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::Address(Address::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_address() {
        let mut addr = [0u8; 20];
        addr[0] = 0xde;
        addr[19] = 0xad;

        let coder = AddressCoder::new(None);
        let mut writer = Writer::new();
        coder
            .encode(&mut writer, &AbiValue::Address(Address::from(addr)))
            .unwrap();
        let encoded = writer.into_bytes();

        assert_eq!(encoded.len(), 32);
        assert!(encoded[..12].iter().all(|b| *b == 0));
        assert_eq!(encoded[12], 0xde);
        assert_eq!(encoded[31], 0xad);
    }

    #[test]
    fn test_encode_address_string() {
        let coder = AddressCoder::new(Some("to".into()));
        let mut writer = Writer::new();
        coder
            .encode(
                &mut writer,
                &AbiValue::String("Z5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed".into()),
            )
            .unwrap();
        assert_eq!(writer.as_bytes()[12], 0x5a);

        let err = coder
            .encode(&mut writer, &AbiValue::Bool(true))
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_decode_rejects_dirty_word() {
        let data = [0xffu8; 32];
        let mut reader = Reader::new(&data, false, None);
        let err = AddressCoder::new(None).decode(&mut reader).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MalformedData);
    }
}
