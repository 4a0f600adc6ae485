//! Coder factory and the top-level encode/decode facade
//!
//! Every call builds a fresh coder tree from its type descriptors, wraps the
//! parameters in a synthetic tuple named `_` and runs a single pass over it.

use std::fmt;
use std::sync::Arc;

use super::coders::{
    AddressCoder, ArrayCoder, BooleanCoder, Codec, Coder, DynamicBytesCoder, FixedBytesCoder,
    NullCoder, NumberCoder, StringCoder, TupleCoder,
};
use super::param::{ParamKind, ParamType, ToParamType};
use super::reader::{CoerceFn, Reader};
use super::value::{AbiValue, Record};
use super::writer::Writer;
use crate::config::{CoderSettings, WORD_SIZE};
use crate::error::{AbiError, AbiResult};
use crate::{log_debug, log_warn};
use crate::utils::crypto::{decode_hex, encode_hex};

/// Name of the wrapper tuple around a parameter list
const TOP_LEVEL_NAME: &str = "_";

/// ABI coder
#[derive(Clone, Default)]
pub struct AbiCoder {
    settings: CoderSettings,
    coerce: Option<Arc<CoerceFn>>,
}

impl fmt::Debug for AbiCoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbiCoder")
            .field("settings", &self.settings)
            .field("coerce", &self.coerce.is_some())
            .finish()
    }
}

impl AbiCoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: CoderSettings) -> Self {
        Self {
            settings,
            coerce: None,
        }
    }

    /// Like [`AbiCoder::with_settings`], rejecting settings that fail validation
    pub fn try_with_settings(settings: CoderSettings) -> Result<Self, Vec<String>> {
        let issues = settings.validate();
        if issues.is_empty() {
            Ok(Self::with_settings(settings))
        } else {
            Err(issues)
        }
    }

    /// Install a hook that post-processes every decoded value
    ///
    /// The hook receives the coder name (`uint8`, `address`, `tuple`, ...)
    /// and the decoded value, and returns the value to keep.
    pub fn with_coerce<F>(mut self, coerce: F) -> Self
    where
        F: Fn(&str, AbiValue) -> AbiValue + Send + Sync + 'static,
    {
        self.coerce = Some(Arc::new(coerce));
        self
    }

    pub fn settings(&self) -> &CoderSettings {
        &self.settings
    }

    /// Bytes per ABI word
    pub fn word_size(&self) -> usize {
        WORD_SIZE
    }

    /// Build the coder tree for one type descriptor
    pub fn get_coder(&self, param: &ParamType) -> AbiResult<Coder> {
        let depth = param.depth();
        if depth > self.settings.max_depth {
            return Err(AbiError::invalid_type(
                param.type_string(),
                format!("nesting depth {} exceeds limit of {}", depth, self.settings.max_depth),
            ));
        }
        build_coder(param, self.settings.max_static_words)
    }

    fn top_level<T: ToParamType>(&self, types: &[T]) -> AbiResult<TupleCoder> {
        let coders = types
            .iter()
            .map(|t| self.get_coder(&t.to_param_type()?))
            .collect::<AbiResult<Vec<_>>>()?;
        Ok(TupleCoder::new(coders, Some(TOP_LEVEL_NAME.to_string())))
    }

    /// Encode `values` as the parameter list `types`
    pub fn encode<T: ToParamType>(&self, types: &[T], values: &[AbiValue]) -> AbiResult<Vec<u8>> {
        if types.len() != values.len() {
            return Err(AbiError::ArgumentMismatch {
                types: types.len(),
                values: values.len(),
                value: format!("{:?}", values),
            });
        }

        let coder = self.top_level(types)?;
        let mut writer = Writer::new();
        coder.encode_values(&mut writer, values)?;

        if self.settings.log_calls {
            log_debug!(
                "abi::coder",
                "encoded parameters",
                types = coder.type_name(),
                data = writer.data(),
            );
        }

        Ok(writer.into_bytes())
    }

    /// [`AbiCoder::encode`] returning `0x` prefixed hex
    pub fn encode_hex<T: ToParamType>(&self, types: &[T], values: &[AbiValue]) -> AbiResult<String> {
        Ok(encode_hex(&self.encode(types, values)?))
    }

    /// Decode `data` as the parameter list `types`
    ///
    /// With `loose` set, a buffer whose final payload stops short of its word
    /// padding still decodes.
    pub fn decode<T: ToParamType>(
        &self,
        types: &[T],
        data: impl AsRef<[u8]>,
        loose: bool,
    ) -> AbiResult<Record> {
        let data = data.as_ref();
        let coder = self.top_level(types)?;
        let mut reader =
            Reader::new(data, loose, self.coerce.as_deref()).with_max_inflation(self.settings.max_inflation);
        let record = coder.decode_record(&mut reader)?;

        if self.settings.log_calls && loose && data.len() % WORD_SIZE != 0 {
            log_warn!(
                "abi::coder",
                "loose decode accepted unpadded data",
                types = coder.type_name(),
                length = data.len(),
            );
        }
        if self.settings.log_calls {
            log_debug!(
                "abi::coder",
                "decoded parameters",
                types = coder.type_name(),
                read = reader.total_read(),
                data = encode_hex(data),
            );
        }

        Ok(record)
    }

    /// [`AbiCoder::decode`] over a hex string, `0x` prefix optional
    pub fn decode_hex<T: ToParamType>(&self, types: &[T], data: &str, loose: bool) -> AbiResult<Record> {
        let bytes = decode_hex(data)?;
        self.decode(types, bytes, loose)
    }

    /// Structurally valid zero values for `types`
    pub fn default_value<T: ToParamType>(&self, types: &[T]) -> AbiResult<Record> {
        Ok(self.top_level(types)?.default_record())
    }
}

/// Map one type descriptor to its coder
///
/// Fixed-length arrays and tuples whose static layout exceeds
/// `max_static_words` are rejected.
fn build_coder(param: &ParamType, max_static_words: usize) -> AbiResult<Coder> {
    let name = param.name.clone();

    let coder = match &param.kind {
        ParamKind::Empty => return Ok(Coder::Null(NullCoder::new(name))),
        ParamKind::Elementary(type_name) => return elementary_coder(type_name, name),
        ParamKind::Array { child, length } => Coder::Array(ArrayCoder::new(
            build_coder(child, max_static_words)?,
            *length,
            name,
        )),
        ParamKind::Tuple(components) => {
            let coders = components
                .iter()
                .map(|c| build_coder(c, max_static_words))
                .collect::<AbiResult<Vec<_>>>()?;
            Coder::Tuple(TupleCoder::new(coders, name))
        }
    };

    match coder.static_words() {
        Some(words) if words <= max_static_words => Ok(coder),
        _ => Err(AbiError::invalid_type(
            param.type_string(),
            format!("static layout exceeds limit of {} words", max_static_words),
        )),
    }
}

fn elementary_coder(type_name: &str, name: Option<String>) -> AbiResult<Coder> {
    match type_name {
        "address" => return Ok(Coder::Address(AddressCoder::new(name))),
        "bool" => return Ok(Coder::Bool(BooleanCoder::new(name))),
        "string" => return Ok(Coder::String(StringCoder::new(name))),
        "bytes" => return Ok(Coder::Bytes(DynamicBytesCoder::new(name))),
        "" => return Ok(Coder::Null(NullCoder::new(name))),
        _ => {}
    }

    // (u)int<bits>
    if let Some((signed, digits)) = split_number(type_name) {
        let bits = if digits.is_empty() {
            256
        } else {
            digits.parse::<usize>().unwrap_or(0)
        };
        if bits == 0 || bits > 256 || bits % 8 != 0 {
            return Err(AbiError::invalid_type(type_name, "invalid bit length"));
        }
        return Ok(Coder::Number(NumberCoder::new(bits / 8, signed, name)));
    }

    // bytes<size>
    if let Some(digits) = all_digits(type_name.strip_prefix("bytes")) {
        let size = digits.parse::<usize>().unwrap_or(0);
        if size == 0 || size > 32 {
            return Err(AbiError::invalid_type(type_name, "invalid bytes length"));
        }
        return Ok(Coder::FixedBytes(FixedBytesCoder::new(size, name)));
    }

    Err(AbiError::invalid_type(type_name, "invalid type"))
}

fn split_number(type_name: &str) -> Option<(bool, &str)> {
    if let Some(digits) = type_name.strip_prefix("uint") {
        return matches_digits(digits).then_some((false, digits));
    }
    if let Some(digits) = type_name.strip_prefix("int") {
        return matches_digits(digits).then_some((true, digits));
    }
    None
}

fn matches_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn all_digits(s: Option<&str>) -> Option<&str> {
    s.filter(|d| !d.is_empty() && matches_digits(d))
}

/// Encode with default settings
pub fn encode<T: ToParamType>(types: &[T], values: &[AbiValue]) -> AbiResult<Vec<u8>> {
    AbiCoder::new().encode(types, values)
}

/// Decode with default settings
pub fn decode<T: ToParamType>(types: &[T], data: impl AsRef<[u8]>, loose: bool) -> AbiResult<Record> {
    AbiCoder::new().decode(types, data, loose)
}

/// Zero values with default settings
pub fn default_value<T: ToParamType>(types: &[T]) -> AbiResult<Record> {
    AbiCoder::new().default_value(types)
}
