use std::collections::HashSet;

use super::{invalid_value, Codec, Coder};
use crate::abi::reader::Reader;
use crate::abi::value::{AbiValue, Record};
use crate::abi::writer::{HeadTailWriter, Writer};
use crate::error::{AbiError, AbiResult};

/// Encode `values` with `coders` as one head/tail block
pub(crate) fn pack<'c, I>(writer: &mut Writer, coders: I, values: &[&AbiValue]) -> AbiResult<usize>
where
    I: IntoIterator<Item = &'c Coder>,
{
    let mut layout = HeadTailWriter::new();

    for (coder, value) in coders.into_iter().zip(values) {
        if coder.is_dynamic() {
            layout.write_dynamic(|w| coder.encode(w, value))?;
        } else {
            layout.write_static(|w| coder.encode(w, value))?;
        }
    }

    Ok(layout.finish(writer))
}

/// Decode one head/tail block
///
/// Offsets of dynamic children are taken relative to where the block
/// starts, so the block's reader position is captured before the first read.
pub(crate) fn unpack<'c, I>(reader: &mut Reader<'_>, coders: I) -> AbiResult<Vec<AbiValue>>
where
    I: IntoIterator<Item = &'c Coder>,
{
    let base = reader.sub_reader(0)?;
    let mut values = Vec::new();

    for coder in coders {
        let value = if coder.is_dynamic() {
            let offset = reader.read_index(coder.name())?;
            let mut tail = base.sub_reader(offset)?;
            coder.decode(&mut tail)?
        } else {
            coder.decode(reader)?
        };
        values.push(value);
    }

    Ok(values)
}

/// `tuple(...)`: fixed sequence of heterogeneous children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleCoder {
    coders: Vec<Coder>,
    dynamic: bool,
    local_name: Option<String>,
}

impl TupleCoder {
    pub fn new(coders: Vec<Coder>, local_name: Option<String>) -> Self {
        let dynamic = coders.iter().any(|c| c.is_dynamic());
        Self {
            coders,
            dynamic,
            local_name,
        }
    }

    pub fn coders(&self) -> &[Coder] {
        &self.coders
    }

    fn names(&self) -> Vec<Option<String>> {
        self.coders
            .iter()
            .map(|c| c.local_name().map(str::to_string))
            .collect()
    }

    /// Encode positional values against the components
    pub fn encode_values(&self, writer: &mut Writer, values: &[AbiValue]) -> AbiResult<usize> {
        let refs: Vec<&AbiValue> = values.iter().collect();
        self.encode_refs(writer, &refs, &values)
    }

    fn encode_refs(
        &self,
        writer: &mut Writer,
        values: &[&AbiValue],
        shown: &dyn std::fmt::Debug,
    ) -> AbiResult<usize> {
        if values.len() != self.coders.len() {
            return Err(AbiError::ArgumentMismatch {
                types: self.coders.len(),
                values: values.len(),
                value: format!("{:?}", shown),
            });
        }
        pack(writer, &self.coders, values)
    }

    /// Decode the components into a record, without the coerce hook
    pub fn decode_record(&self, reader: &mut Reader<'_>) -> AbiResult<Record> {
        let values = unpack(reader, &self.coders)?;
        Ok(Record::with_names(values, self.names()))
    }

    pub fn default_record(&self) -> Record {
        let values = self.coders.iter().map(|c| c.default_value()).collect();
        Record::with_names(values, self.names())
    }

    /// Order keyed fields by component name
    fn keyed<'v>(&self, value: &AbiValue, fields: &'v [(String, AbiValue)]) -> AbiResult<Vec<&'v AbiValue>> {
        let mut seen = HashSet::new();
        for coder in &self.coders {
            let name = coder.local_name().ok_or_else(|| {
                invalid_value(self, value, "cannot encode object for signature with missing names")
            })?;
            if !seen.insert(name) {
                return Err(invalid_value(self, value, "cannot encode object for signature with duplicate names"));
            }
        }

        self.coders
            .iter()
            .map(|coder| {
                let name = coder.local_name().unwrap_or_default();
                fields
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, v)| v)
                    .ok_or_else(|| invalid_value(self, value, &format!("missing value for component {}", name)))
            })
            .collect()
    }
}

impl Codec for TupleCoder {
    fn name(&self) -> &str {
        "tuple"
    }

    fn type_name(&self) -> String {
        let inner: Vec<String> = self.coders.iter().map(|c| c.type_name()).collect();
        format!("({})", inner.join(","))
    }

    fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        let values: Vec<&AbiValue> = match value {
            AbiValue::Tuple(record) => record.iter().collect(),
            AbiValue::Array(items) => items.iter().collect(),
            AbiValue::Struct(fields) => self.keyed(value, fields)?,
            _ => return Err(invalid_value(self, value, "invalid tuple value")),
        };
        self.encode_refs(writer, &values, value)
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        let record = self.decode_record(reader)?;
        Ok(reader.coerce(self.name(), AbiValue::Tuple(record)))
    }

    fn default_value(&self) -> AbiValue {
        AbiValue::Tuple(self.default_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::coders::{BooleanCoder, NumberCoder, StringCoder};
    use crate::error::ErrorKind;

    fn person() -> TupleCoder {
        TupleCoder::new(
            vec![
                Coder::String(StringCoder::new(Some("name".into()))),
                Coder::Number(NumberCoder::new(1, false, Some("age".into()))),
            ],
            None,
        )
    }

    #[test]
    fn test_dynamic_flag() {
        assert!(person().is_dynamic());

        let fixed = TupleCoder::new(vec![Coder::Bool(BooleanCoder::new(None))], None);
        assert!(!fixed.is_dynamic());
        assert_eq!(fixed.type_name(), "(bool)");
    }

    #[test]
    fn test_roundtrip_named() {
        let coder = person();
        let value = AbiValue::tuple(vec![AbiValue::String("bob".into()), AbiValue::uint(30)]);

        let mut writer = Writer::new();
        coder.encode(&mut writer, &value).unwrap();
        let encoded = writer.into_bytes();
        // offset, age, length, payload
        assert_eq!(encoded.len(), 128);
        assert_eq!(encoded[31], 64);

        let mut reader = Reader::new(&encoded, false, None);
        let decoded = coder.decode(&mut reader).unwrap();
        let record = decoded.as_tuple().unwrap();
        assert_eq!(record["name"], AbiValue::String("bob".into()));
        assert_eq!(record[1], AbiValue::uint(30));
    }

    #[test]
    fn test_keyed_reorders() {
        let coder = person();
        let keyed = AbiValue::Struct(vec![
            ("age".into(), AbiValue::uint(30)),
            ("name".into(), AbiValue::String("bob".into())),
        ]);
        let positional = AbiValue::tuple(vec![AbiValue::String("bob".into()), AbiValue::uint(30)]);

        let mut a = Writer::new();
        let mut b = Writer::new();
        coder.encode(&mut a, &keyed).unwrap();
        coder.encode(&mut b, &positional).unwrap();
        assert_eq!(a.into_bytes(), b.into_bytes());
    }

    #[test]
    fn test_keyed_requires_names() {
        let coder = TupleCoder::new(
            vec![
                Coder::Bool(BooleanCoder::new(Some("a".into()))),
                Coder::Bool(BooleanCoder::new(None)),
            ],
            None,
        );
        let keyed = AbiValue::Struct(vec![("a".into(), AbiValue::Bool(true))]);
        let err = coder.encode(&mut Writer::new(), &keyed).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidValue);

        let dup = TupleCoder::new(
            vec![
                Coder::Bool(BooleanCoder::new(Some("a".into()))),
                Coder::Bool(BooleanCoder::new(Some("a".into()))),
            ],
            None,
        );
        assert!(dup.encode(&mut Writer::new(), &keyed).is_err());
    }

    #[test]
    fn test_count_mismatch() {
        let err = person()
            .encode(&mut Writer::new(), &AbiValue::tuple(vec![AbiValue::uint(1)]))
            .unwrap_err();
        assert!(matches!(err, AbiError::ArgumentMismatch { types: 2, values: 1, .. }));
    }

    #[test]
    fn test_default_value_keeps_names() {
        let value = person().default_value();
        let record = value.as_tuple().unwrap();
        assert_eq!(record.get_by_name("name"), Some(&AbiValue::String(String::new())));
        assert_eq!(record.get_by_name("age"), Some(&AbiValue::uint(0)));
    }
}
