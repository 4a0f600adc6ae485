//! Coder variants, one per ABI base type
//!
//! A coder tree is built fresh for every encode/decode call from the type
//! descriptors and holds no state between calls.

mod address;
mod array;
mod boolean;
mod bytes;
mod fixed_bytes;
mod null;
mod number;
mod tuple;

pub use address::AddressCoder;
pub use array::ArrayCoder;
pub use boolean::BooleanCoder;
pub use bytes::{DynamicBytesCoder, StringCoder};
pub use fixed_bytes::FixedBytesCoder;
pub use null::NullCoder;
pub use number::NumberCoder;
pub use tuple::TupleCoder;

use super::param::ArrayLength;
use super::reader::Reader;
use super::value::AbiValue;
use super::writer::Writer;
use crate::config::WORD_SIZE;
use crate::error::{AbiError, AbiResult};

/// Shared encode/decode contract of every coder variant
pub trait Codec {
    /// Coder name handed to the coerce hook: `uint8`, `bytes32`, `array`, ...
    fn name(&self) -> &str;

    /// Full type string: `uint8`, `(address,string)[2]`, ...
    fn type_name(&self) -> String;

    /// Parameter name from the type descriptor
    fn local_name(&self) -> Option<&str>;

    /// Whether the encoding lives in the tail region
    fn is_dynamic(&self) -> bool;

    /// Append the encoding of `value`, returning the number of bytes written
    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize>;

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue>;

    /// Structurally valid zero value
    fn default_value(&self) -> AbiValue;
}

/// Closed set of coders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Coder {
    Address(AddressCoder),
    Bool(BooleanCoder),
    FixedBytes(FixedBytesCoder),
    Bytes(DynamicBytesCoder),
    String(StringCoder),
    Number(NumberCoder),
    Null(NullCoder),
    Array(ArrayCoder),
    Tuple(TupleCoder),
}

impl Coder {
    fn inner(&self) -> &dyn Codec {
        match self {
            Coder::Address(c) => c,
            Coder::Bool(c) => c,
            Coder::FixedBytes(c) => c,
            Coder::Bytes(c) => c,
            Coder::String(c) => c,
            Coder::Number(c) => c,
            Coder::Null(c) => c,
            Coder::Array(c) => c,
            Coder::Tuple(c) => c,
        }
    }

    /// Bytes this coder occupies in the head of its enclosing block
    pub(crate) fn head_size(&self) -> usize {
        if self.is_dynamic() {
            return WORD_SIZE;
        }
        match self {
            Coder::Null(_) => 0,
            Coder::Array(c) => match c.length() {
                ArrayLength::Fixed(n) => c.element().head_size().saturating_mul(n),
                ArrayLength::Dynamic => WORD_SIZE,
            },
            Coder::Tuple(c) => c
                .coders()
                .iter()
                .map(Coder::head_size)
                .fold(0, usize::saturating_add),
            _ => WORD_SIZE,
        }
    }

    /// Words of static layout, counting zero-sized values as one word
    ///
    /// Bounds the work of a default value or a fixed array decode. `None`
    /// on overflow.
    pub(crate) fn static_words(&self) -> Option<usize> {
        match self {
            Coder::Array(c) => match c.length() {
                ArrayLength::Fixed(n) => c.element().static_words()?.checked_mul(n),
                ArrayLength::Dynamic => Some(1),
            },
            Coder::Tuple(c) => c
                .coders()
                .iter()
                .try_fold(0usize, |words, c| words.checked_add(c.static_words()?))
                .map(|words| words.max(1)),
            _ => Some(1),
        }
    }
}

impl Codec for Coder {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn type_name(&self) -> String {
        self.inner().type_name()
    }

    fn local_name(&self) -> Option<&str> {
        self.inner().local_name()
    }

    fn is_dynamic(&self) -> bool {
        self.inner().is_dynamic()
    }

    fn encode(&self, writer: &mut Writer, value: &AbiValue) -> AbiResult<usize> {
        self.inner().encode(writer, value)
    }

    fn decode(&self, reader: &mut Reader<'_>) -> AbiResult<AbiValue> {
        self.inner().decode(reader)
    }

    fn default_value(&self) -> AbiValue {
        self.inner().default_value()
    }
}

fn out_of_range(coder: &dyn Codec, value: &AbiValue, reason: &str) -> AbiError {
    AbiError::out_of_range(coder.local_name().unwrap_or(""), coder.type_name(), value, reason)
}

fn invalid_value(coder: &dyn Codec, value: &AbiValue, reason: &str) -> AbiError {
    AbiError::invalid_value(coder.local_name().unwrap_or(""), coder.type_name(), value, reason)
}
