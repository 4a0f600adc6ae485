use super::tuple::{pack, unpack};
use super::{invalid_value, out_of_range, Codec, Coder};
use crate::abi::param::ArrayLength;
use crate::abi::reader::Reader;
use crate::abi::value::AbiValue;
use crate::abi::writer::Writer;
use crate::config::WORD_SIZE;
use crate::error::{AbiError, AbiResult};

/// `T[]` and `T[K]`
///
/// Elements are laid out exactly like a tuple of K copies of `T`; the
/// dynamic form writes the element count first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayCoder {
    coder: Box<Coder>,
    length: ArrayLength,
    local_name: Option<String>,
}

impl ArrayCoder {
    pub fn new(coder: Coder, length: ArrayLength, local_name: Option<String>) -> Self {
        Self {
            coder: Box::new(coder),
            length,
            local_name,
        }
    }

    pub fn element(&self) -> &Coder {
        &self.coder
    }

    pub fn length(&self) -> ArrayLength {
        self.length
    }
}

impl Codec for ArrayCoder {
    fn name(&self) -> &str {
        "array"
    }

    fn type_name(&self) -> String {
        match self.length {
            ArrayLength::Dynamic => format!("{}[]", self.coder.type_name()),
            ArrayLength::Fixed(n) => format!("{}[{}]", self.coder.type_name(), n),
        }
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        self.length == ArrayLength::Dynamic || self.coder.is_dynamic()
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        let items = match value {
            AbiValue::Array(items) => items,
            _ => return Err(invalid_value(self, value, "expected array value")),
        };

        let mut written = 0;
        match self.length {
            ArrayLength::Dynamic => written += writer.write_index(items.len()),
            ArrayLength::Fixed(n) if n != items.len() => {
                return Err(out_of_range(self, value, &format!("expected {} elements", n)))
            }
            ArrayLength::Fixed(_) => {}
        }

        let values: Vec<&AbiValue> = items.iter().collect();
        written += pack(writer, std::iter::repeat(&*self.coder).take(items.len()), &values)?;
        Ok(written)
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let count = match self.length {
            ArrayLength::Fixed(n) => {
                if self.coder.head_size().saturating_mul(n) > reader.remaining() {
                    return Err(AbiError::malformed(
                        self.type_name(),
                        "insufficient data length",
                        reader.data().len(),
                        reader.consumed(),
                    ));
                }
                n
            }
            ArrayLength::Dynamic => {
                let at = reader.consumed();
                let count = reader.read_index(self.name())?;
                // Every element takes at least one word of head
                if count.saturating_mul(WORD_SIZE) > reader.data().len() {
                    return Err(AbiError::malformed(
                        self.type_name(),
                        "insufficient data length",
                        reader.data().len(),
                        at,
                    ));
                }
                count
            }
        };

        let values = unpack(reader, std::iter::repeat(&*self.coder).take(count))?;
        Ok(reader.coerce(self.name(), AbiValue::Array(values)))
    }

    fn default_value(&self) -> AbiValue {
        match self.length {
            ArrayLength::Dynamic => AbiValue::Array(Vec::new()),
            ArrayLength::Fixed(n) => AbiValue::Array(vec![self.coder.default_value(); n]),
        }
    }
}
