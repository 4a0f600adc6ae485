use ethers_core::types::{I256, U256};

use super::{invalid_value, out_of_range, Codec};
use crate::abi::reader::Reader;
use crate::abi::value::AbiValue;
use crate::abi::writer::Writer;
use crate::error::AbiResult;

/// `uintN` / `intN`, always one word
///
/// Signed values are written as 256-bit two's complement, so a negative
/// `int8` fills the whole word with `0xff` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberCoder {
    size: usize,
    signed: bool,
    name: String,
    local_name: Option<String>,
}

impl NumberCoder {
    /// `size` is the width in bytes, `1..=32`; the factory checks it
    pub fn new(size: usize, signed: bool, local_name: Option<String>) -> Self {
        let name = format!("{}int{}", if signed { "" } else { "u" }, size * 8);
        Self {
            size,
            signed,
            name,
            local_name,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn signed(&self) -> bool {
        self.signed
    }

    fn bits(&self) -> usize {
        self.size * 8
    }

    fn unsigned_word(&self, value: &AbiValue) -> AbiResult<U256> {
        let v = match value {
            AbiValue::Uint(u) => *u,
            AbiValue::Int(i) if i.is_negative() => {
                return Err(out_of_range(self, value, "value out-of-bounds"))
            }
            AbiValue::Int(i) => i.into_raw(),
            _ => return Err(invalid_value(self, value, "invalid number")),
        };
        if v.bits() > self.bits() {
            return Err(out_of_range(self, value, "value out-of-bounds"));
        }
        Ok(v)
    }

    fn signed_word(&self, value: &AbiValue) -> AbiResult<U256> {
        let v = match value {
            AbiValue::Int(i) => *i,
            AbiValue::Uint(u) if u.bit(255) => {
                return Err(out_of_range(self, value, "value out-of-bounds"))
            }
            AbiValue::Uint(u) => I256::from_raw(*u),
            _ => return Err(invalid_value(self, value, "invalid number")),
        };

        // -2^(bits-1) <= v < 2^(bits-1)
        let bound = U256::one() << (self.bits() - 1);
        let raw = v.into_raw();
        let in_range = if v.is_negative() {
            let (magnitude, _) = (!raw).overflowing_add(U256::one());
            magnitude <= bound
        } else {
            raw < bound
        };
        if !in_range {
            return Err(out_of_range(self, value, "value out-of-bounds"));
        }
        Ok(raw)
    }
}

impl Codec for NumberCoder {
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
        let word = if self.signed {
            self.signed_word(value)?
        } else {
            self.unsigned_word(value)?
        };
        Ok(writer.write_value(word))
    }

    /// Reads the full word; signed values take their sign from bit 255
    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let word = reader.read_value()?;
        let value = if self.signed {
            AbiValue::Int(I256::from_raw(word))
        } else {
            AbiValue::Uint(word)
        };
        Ok(reader.coerce(self.name(), value))
    }

    fn default_value(&self) -> AbiValue {
        if self.signed {
            AbiValue::Int(I256::zero())
        } else {
            AbiValue::Uint(U256::zero())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn encode(coder: &NumberCoder, value: AbiValue) -> AbiResult<Vec<u8>> {
        let mut writer = Writer::new();
        coder.encode(&mut writer, &value)?;
        Ok(writer.into_bytes())
    }

    #[test]
    fn test_uint8_bounds() {
        let coder = NumberCoder::new(1, false, None);
        assert_eq!(coder.name(), "uint8");

        assert_eq!(encode(&coder, AbiValue::uint(255)).unwrap()[31], 0xff);
        let err = encode(&coder, AbiValue::uint(256)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);
        assert!(encode(&coder, AbiValue::int(-1)).is_err());
    }

    #[test]
    fn test_int8_bounds() {
        let coder = NumberCoder::new(1, true, None);

        assert!(encode(&coder, AbiValue::int(127)).is_ok());
        assert!(encode(&coder, AbiValue::int(-128)).is_ok());
        assert!(encode(&coder, AbiValue::int(128)).is_err());
        assert!(encode(&coder, AbiValue::int(-129)).is_err());
    }

    #[test]
    fn test_negative_fills_word() {
        let coder = NumberCoder::new(1, true, None);
        let encoded = encode(&coder, AbiValue::int(-1)).unwrap();
        assert_eq!(encoded, vec![0xff; 32]);

        let mut reader = Reader::new(&encoded, false, None);
        assert_eq!(coder.decode(&mut reader).unwrap(), AbiValue::int(-1));
    }

    #[test]
    fn test_int256_extremes() {
        let coder = NumberCoder::new(32, true, None);
        assert!(encode(&coder, AbiValue::Int(I256::MIN)).is_ok());
        assert!(encode(&coder, AbiValue::Int(I256::MAX)).is_ok());

        let uint = NumberCoder::new(32, false, None);
        assert!(encode(&uint, AbiValue::Uint(U256::MAX)).is_ok());
        // Unsigned magnitude above int256 max
        assert!(encode(&coder, AbiValue::Uint(U256::MAX)).is_err());
    }

    #[test]
    fn test_decode_is_not_masked() {
        // A uint8 slot holding 0x0100 decodes to the full word value
        let mut data = [0u8; 32];
        data[30] = 1;
        let mut reader = Reader::new(&data, false, None);
        let value = NumberCoder::new(1, false, None).decode(&mut reader).unwrap();
        assert_eq!(value, AbiValue::uint(256));
    }

    #[test]
    fn test_non_number_rejected() {
        let coder = NumberCoder::new(32, false, None);
        let err = encode(&coder, AbiValue::Bool(true)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);
    }
}
