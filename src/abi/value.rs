//! ABI values and decode results

use ethers_core::types::{Address, I256, U256};
use std::fmt;
use std::ops::Index;

use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::{encode_hex, strip_address_prefix, to_checksum_address};

/// Runtime representation of an ABI value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    /// 20-byte account address
    Address(Address),
    Bool(bool),
    /// Unsigned integer of any declared width
    Uint(U256),
    /// Signed integer of any declared width
    Int(I256),
    /// `bytesN`
    FixedBytes(Vec<u8>),
    /// Dynamic `bytes`
    Bytes(Vec<u8>),
    String(String),
    /// Fixed or dynamic array
    Array(Vec<AbiValue>),
    /// Tuple, positionally ordered with optional names
    Tuple(Record),
    /// Tuple given by component name; accepted on encode only
    Struct(Vec<(String, AbiValue)>),
    /// Value of the empty `""` slot
    Null,
}

impl AbiValue {
    /// Create a Uint value from a u64
    pub fn uint(value: u64) -> Self {
        AbiValue::Uint(U256::from(value))
    }

    /// Create an Int value from an i64
    pub fn int(value: i64) -> Self {
        AbiValue::Int(I256::from(value))
    }

    /// Create a Uint value from a string (decimal or `0x` hex)
    pub fn uint_from_str(s: &str) -> AbiResult<Self> {
        parse_u256(s)
            .map(AbiValue::Uint)
            .ok_or_else(|| AbiError::invalid_value("", "uint256", s, "invalid unsigned integer"))
    }

    /// Create an Int value from a decimal string, optionally negative
    pub fn int_from_str(s: &str) -> AbiResult<Self> {
        parse_i256(s)
            .map(AbiValue::Int)
            .ok_or_else(|| AbiError::invalid_value("", "int256", s, "invalid signed integer"))
    }

    /// Create an Address value from a `Z` or `0x` prefixed string
    pub fn address_from_str(s: &str) -> AbiResult<Self> {
        parse_address(s).map(AbiValue::Address)
    }

    /// Create a dynamic bytes value from a hex string
    pub fn bytes_from_hex(s: &str) -> AbiResult<Self> {
        Ok(AbiValue::Bytes(crate::utils::crypto::decode_hex(s)?))
    }

    /// Tuple from positional values
    pub fn tuple(values: Vec<AbiValue>) -> Self {
        AbiValue::Tuple(Record::new(values))
    }

    /// Short kind label used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            AbiValue::Address(_) => "address",
            AbiValue::Bool(_) => "bool",
            AbiValue::Uint(_) => "uint",
            AbiValue::Int(_) => "int",
            AbiValue::FixedBytes(_) => "fixed bytes",
            AbiValue::Bytes(_) => "bytes",
            AbiValue::String(_) => "string",
            AbiValue::Array(_) => "array",
            AbiValue::Tuple(_) => "tuple",
            AbiValue::Struct(_) => "struct",
            AbiValue::Null => "null",
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            AbiValue::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Unsigned view; signed values qualify when non-negative
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(u) => Some(*u),
            AbiValue::Int(i) if !i.is_negative() => Some(i.into_raw()),
            _ => None,
        }
    }

    /// Signed view; unsigned values qualify when they fit in an I256
    pub fn as_int(&self) -> Option<I256> {
        match self {
            AbiValue::Int(i) => Some(*i),
            AbiValue::Uint(u) if u.bit(255) => None,
            AbiValue::Uint(u) => Some(I256::from_raw(*u)),
            _ => None,
        }
    }

    /// Raw bytes of `bytes` or `bytesN` values
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AbiValue::Bytes(b) | AbiValue::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&Record> {
        match self {
            AbiValue::Tuple(record) => Some(record),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AbiValue::Null)
    }
}

impl fmt::Display for AbiValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiValue::Address(a) => write!(f, "{}", to_checksum_address(a.as_bytes())),
            AbiValue::Bool(b) => write!(f, "{}", b),
            AbiValue::Uint(u) => write!(f, "{}", u),
            AbiValue::Int(i) => write!(f, "{}", i),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => write!(f, "{}", encode_hex(b)),
            AbiValue::String(s) => write!(f, "{:?}", s),
            AbiValue::Array(values) => {
                write!(f, "[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            AbiValue::Tuple(record) => write!(f, "{}", record),
            AbiValue::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (name, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", name, v)?;
                }
                write!(f, "}}")
            }
            AbiValue::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for AbiValue {
    fn from(b: bool) -> Self {
        AbiValue::Bool(b)
    }
}

impl From<u64> for AbiValue {
    fn from(n: u64) -> Self {
        AbiValue::uint(n)
    }
}

impl From<i64> for AbiValue {
    fn from(n: i64) -> Self {
        AbiValue::int(n)
    }
}

impl From<U256> for AbiValue {
    fn from(n: U256) -> Self {
        AbiValue::Uint(n)
    }
}

impl From<I256> for AbiValue {
    fn from(n: I256) -> Self {
        AbiValue::Int(n)
    }
}

impl From<Address> for AbiValue {
    fn from(a: Address) -> Self {
        AbiValue::Address(a)
    }
}

impl From<String> for AbiValue {
    fn from(s: String) -> Self {
        AbiValue::String(s)
    }
}

impl From<&str> for AbiValue {
    fn from(s: &str) -> Self {
        AbiValue::String(s.to_string())
    }
}

impl From<Vec<AbiValue>> for AbiValue {
    fn from(values: Vec<AbiValue>) -> Self {
        AbiValue::Array(values)
    }
}

impl From<Record> for AbiValue {
    fn from(record: Record) -> Self {
        AbiValue::Tuple(record)
    }
}

/// Ordered decode result, addressable by position and by parameter name
///
/// Equality compares positional values only; names are a lookup convenience.
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: Vec<AbiValue>,
    names: Vec<Option<String>>,
}

impl Record {
    /// Record without names
    pub fn new(values: Vec<AbiValue>) -> Self {
        let names = vec![None; values.len()];
        Self { values, names }
    }

    /// Record with one optional name per value
    pub fn with_names(values: Vec<AbiValue>, names: Vec<Option<String>>) -> Self {
        debug_assert_eq!(values.len(), names.len());
        let mut names = names;
        names.resize(values.len(), None);
        Self { values, names }
    }

    /// Number of positional values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&AbiValue> {
        self.values.get(index)
    }

    /// Value of the first position carrying `name`
    pub fn get_by_name(&self, name: &str) -> Option<&AbiValue> {
        self.position(name).map(|i| &self.values[i])
    }

    /// Position of the first value carrying `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names
            .iter()
            .position(|n| n.as_deref() == Some(name))
    }

    pub fn name_of(&self, index: usize) -> Option<&str> {
        self.names.get(index).and_then(|n| n.as_deref())
    }

    pub fn names(&self) -> &[Option<String>] {
        &self.names
    }

    pub fn values(&self) -> &[AbiValue] {
        &self.values
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AbiValue> {
        self.values.iter()
    }

    /// (name, value) pairs in positional order
    pub fn entries(&self) -> impl Iterator<Item = (Option<&str>, &AbiValue)> {
        self.names.iter().map(|n| n.as_deref()).zip(self.values.iter())
    }

    pub fn into_values(self) -> Vec<AbiValue> {
        self.values
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for Record {}

impl From<Vec<AbiValue>> for Record {
    fn from(values: Vec<AbiValue>) -> Self {
        Record::new(values)
    }
}

impl Index<usize> for Record {
    type Output = AbiValue;

    fn index(&self, index: usize) -> &Self::Output {
        &self.values[index]
    }
}

impl Index<&str> for Record {
    type Output = AbiValue;

    fn index(&self, name: &str) -> &Self::Output {
        match self.get_by_name(name) {
            Some(value) => value,
            None => panic!("no value named {:?} in record", name),
        }
    }
}

impl IntoIterator for Record {
    type Item = AbiValue;
    type IntoIter = std::vec::IntoIter<AbiValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a AbiValue;
    type IntoIter = std::slice::Iter<'a, AbiValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (name, value)) in self.entries().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match name {
                Some(name) => write!(f, "{}: {}", name, value)?,
                None => write!(f, "{}", value)?,
            }
        }
        write!(f, ")")
    }
}

/// Parse a decimal or `0x` hex unsigned integer
pub fn parse_u256(s: &str) -> Option<U256> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if hex.is_empty() || hex.len() > 64 {
            return None;
        }
        U256::from_str_radix(hex, 16).ok()
    } else {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        U256::from_dec_str(s).ok()
    }
}

/// Parse a signed integer: `-` followed by a magnitude, or any unsigned form
pub fn parse_i256(s: &str) -> Option<I256> {
    let s = s.trim();
    if let Some(magnitude) = s.strip_prefix('-') {
        let magnitude = parse_u256(magnitude)?;
        // |I256::MIN| == 2^255
        if magnitude > (U256::one() << 255) {
            return None;
        }
        let raw = (!magnitude).overflowing_add(U256::one()).0;
        Some(I256::from_raw(raw))
    } else {
        let value = parse_u256(s)?;
        if value.bit(255) {
            return None;
        }
        Some(I256::from_raw(value))
    }
}

/// Parse a `Z` or `0x` prefixed address, enforcing the checksum on mixed case
pub fn parse_address(s: &str) -> AbiResult<Address> {
    let trimmed = s.trim();
    let body = strip_address_prefix(trimmed)
        .ok_or_else(|| AbiError::invalid_value("", "address", s, "missing address prefix"))?;

    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(AbiError::invalid_value("", "address", s, "invalid address"));
    }

    let bytes = hex::decode(body)?;
    let address = Address::from_slice(&bytes);

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && has_upper {
        let expected = to_checksum_address(&bytes);
        if expected[1..] != *body {
            return Err(AbiError::invalid_value("", "address", s, "bad address checksum"));
        }
    }

    Ok(address)
}
