//! ABI type descriptors
//!
//! A [`ParamType`] is the parsed form of a type string such as `uint256`,
//! `bytes32[3]` or `tuple(address to, uint8 n)[]`. It is pure metadata: the
//! coder factory turns it into a coder tree, and nothing mutates it during
//! encode or decode.
//!
//! Parsing checks the grammar only. Elementary names are not validated here
//! (`uint9` parses fine); the coder factory rejects invalid widths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{AbiError, AbiResult};

/// Deepest nesting the type-string parser accepts
pub const MAX_TYPE_DEPTH: usize = 64;

/// Length of an array type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayLength {
    /// `T[]`, prefixed by an element count on the wire
    Dynamic,
    /// `T[K]`, no count word
    Fixed(usize),
}

/// Structure of a parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// `address`, `bool`, `string`, `bytes`, `bytesN`, `uintN`, `intN`, ...
    Elementary(String),
    /// `T[]` or `T[K]`
    Array {
        child: Box<ParamType>,
        length: ArrayLength,
    },
    /// `tuple(...)` / `(...)`
    Tuple(Vec<ParamType>),
    /// The explicitly empty `""` slot
    Empty,
}

/// A parsed ABI parameter type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "JsonParam", into = "JsonParam")]
pub struct ParamType {
    /// Optional label; never affects the wire encoding
    pub name: Option<String>,
    /// Event parameter flag, `None` outside of events
    pub indexed: Option<bool>,
    pub kind: ParamKind,
}

/// Output style of [`ParamType::format`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Canonical form used for selectors: `(address,uint8)[]`
    Sighash,
    /// Human-readable form with names: `tuple(address to, uint8 n)[] items`
    Full,
}

impl ParamType {
    pub fn elementary(type_name: impl Into<String>) -> Self {
        Self::from_kind(ParamKind::Elementary(normalize_elementary(type_name.into())))
    }

    pub fn array(child: ParamType, length: ArrayLength) -> Self {
        Self::from_kind(ParamKind::Array {
            child: Box::new(child),
            length,
        })
    }

    pub fn tuple(components: Vec<ParamType>) -> Self {
        Self::from_kind(ParamKind::Tuple(components))
    }

    pub fn empty() -> Self {
        Self::from_kind(ParamKind::Empty)
    }

    fn from_kind(kind: ParamKind) -> Self {
        Self {
            name: None,
            indexed: None,
            kind,
        }
    }

    /// Attach a label
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    /// Mark as an indexed event parameter
    pub fn with_indexed(mut self, indexed: bool) -> Self {
        self.indexed = Some(indexed);
        self
    }

    /// Parse a type string, e.g. `uint256`, `(address,bool)[]`, `string name`
    pub fn parse(s: &str) -> AbiResult<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self::empty());
        }

        let mut parser = Parser::new(trimmed);
        let param = parser.parse_param(0)?;
        parser.skip_ws();
        if !parser.at_end() {
            return Err(parser.error("unexpected trailing characters"));
        }
        Ok(param)
    }

    /// `array`, `tuple`, `""` or the elementary type name
    pub fn base_type(&self) -> &str {
        match &self.kind {
            ParamKind::Elementary(name) => name,
            ParamKind::Array { .. } => "array",
            ParamKind::Tuple(_) => "tuple",
            ParamKind::Empty => "",
        }
    }

    /// Declared length for arrays: `-1` for dynamic arrays, `None` otherwise
    pub fn array_length(&self) -> Option<isize> {
        match &self.kind {
            ParamKind::Array {
                length: ArrayLength::Dynamic,
                ..
            } => Some(-1),
            ParamKind::Array {
                length: ArrayLength::Fixed(n),
                ..
            } => Some(*n as isize),
            _ => None,
        }
    }

    pub fn array_children(&self) -> Option<&ParamType> {
        match &self.kind {
            ParamKind::Array { child, .. } => Some(child),
            _ => None,
        }
    }

    pub fn components(&self) -> Option<&[ParamType]> {
        match &self.kind {
            ParamKind::Tuple(components) => Some(components),
            _ => None,
        }
    }

    /// Nesting depth: 0 for elementary types, +1 per array or tuple level
    pub fn depth(&self) -> usize {
        match &self.kind {
            ParamKind::Elementary(_) | ParamKind::Empty => 0,
            ParamKind::Array { child, .. } => 1 + child.depth(),
            ParamKind::Tuple(components) => {
                1 + components.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }

    /// Canonical type string, the form used in signatures
    pub fn type_string(&self) -> String {
        self.format(FormatType::Sighash)
    }

    pub fn format(&self, format: FormatType) -> String {
        let mut out = self.format_kind(format);
        if format == FormatType::Full {
            if self.indexed == Some(true) {
                out.push_str(" indexed");
            }
            if let Some(name) = &self.name {
                out.push(' ');
                out.push_str(name);
            }
        }
        out
    }

    fn format_kind(&self, format: FormatType) -> String {
        match &self.kind {
            ParamKind::Elementary(name) => name.clone(),
            ParamKind::Empty => String::new(),
            ParamKind::Array { child, length } => {
                let suffix = match length {
                    ArrayLength::Dynamic => "[]".to_string(),
                    ArrayLength::Fixed(n) => format!("[{}]", n),
                };
                format!("{}{}", child.format_kind(format), suffix)
            }
            ParamKind::Tuple(components) => match format {
                FormatType::Sighash => {
                    let inner = components
                        .iter()
                        .map(|c| c.format(format))
                        .collect::<Vec<_>>()
                        .join(",");
                    format!("({})", inner)
                }
                FormatType::Full => {
                    let inner = components
                        .iter()
                        .map(|c| c.format(format))
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("tuple({})", inner)
                }
            },
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_string())
    }
}

impl FromStr for ParamType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Anything that can stand in for a type descriptor: a type string or an
/// already built [`ParamType`]
pub trait ToParamType {
    fn to_param_type(&self) -> AbiResult<ParamType>;
}

impl ToParamType for ParamType {
    fn to_param_type(&self) -> AbiResult<ParamType> {
        Ok(self.clone())
    }
}

impl ToParamType for str {
    fn to_param_type(&self) -> AbiResult<ParamType> {
        ParamType::parse(self)
    }
}

impl ToParamType for String {
    fn to_param_type(&self) -> AbiResult<ParamType> {
        ParamType::parse(self)
    }
}

impl<T: ToParamType + ?Sized> ToParamType for &T {
    fn to_param_type(&self) -> AbiResult<ParamType> {
        (**self).to_param_type()
    }
}

/// Parse a comma separated parameter list, e.g. the inside of a signature
pub fn parse_param_list(s: &str) -> AbiResult<Vec<ParamType>> {
    let wrapped = format!("({})", s);
    let mut parser = Parser::new(&wrapped);
    let components = parser.parse_tuple_body(0)?;
    parser.skip_ws();
    if !parser.at_end() {
        return Err(parser.error("unexpected trailing characters"));
    }
    Ok(components)
}

fn normalize_elementary(name: String) -> String {
    match name.as_str() {
        "uint" => "uint256".to_string(),
        "int" => "int256".to_string(),
        _ => name,
    }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn error(&self, reason: &str) -> AbiError {
        AbiError::invalid_type(self.src, format!("{} at position {}", reason, self.pos))
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, b: u8) -> AbiResult<()> {
        if self.peek() == Some(b) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", b as char)))
        }
    }

    fn read_ident(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if is_ident_char(b)) {
            self.pos += 1;
        }
        let src = self.src;
        &src[start..self.pos]
    }

    /// `type ["indexed"] [name]`
    fn parse_param(&mut self, depth: usize) -> AbiResult<ParamType> {
        self.skip_ws();
        let kind = self.parse_type(depth)?;
        let mut param = ParamType::from_kind(kind);

        loop {
            self.skip_ws();
            match self.peek() {
                Some(b) if is_ident_char(b) => {}
                _ => break,
            }
            let word = self.read_ident();
            if word == "indexed" && param.indexed.is_none() && param.name.is_none() {
                param.indexed = Some(true);
            } else if param.name.is_none() {
                if word.as_bytes()[0].is_ascii_digit() {
                    return Err(self.error("invalid parameter name"));
                }
                param.name = Some(word.to_string());
            } else {
                return Err(self.error("unexpected token"));
            }
        }

        Ok(param)
    }

    fn parse_type(&mut self, depth: usize) -> AbiResult<ParamKind> {
        if depth > MAX_TYPE_DEPTH {
            return Err(self.error("type nesting too deep"));
        }

        let mut kind = if self.peek() == Some(b'(') {
            ParamKind::Tuple(self.parse_tuple_body(depth)?)
        } else {
            let ident = self.read_ident();
            if ident.is_empty() {
                return Err(self.error("expected type"));
            }
            if ident == "tuple" {
                self.skip_ws();
                ParamKind::Tuple(self.parse_tuple_body(depth)?)
            } else {
                if !ident.as_bytes()[0].is_ascii_alphabetic() {
                    return Err(self.error("invalid type name"));
                }
                ParamKind::Elementary(normalize_elementary(ident.to_string()))
            }
        };

        let mut levels = 0;
        while self.peek() == Some(b'[') {
            self.pos += 1;
            let start = self.pos;
            while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
                self.pos += 1;
            }
            let src = self.src;
            let digits = &src[start..self.pos];
            self.expect(b']')?;

            let length = if digits.is_empty() {
                ArrayLength::Dynamic
            } else {
                let n = digits
                    .parse::<usize>()
                    .map_err(|_| self.error("invalid array length"))?;
                ArrayLength::Fixed(n)
            };

            levels += 1;
            if depth + levels > MAX_TYPE_DEPTH {
                return Err(self.error("type nesting too deep"));
            }
            kind = ParamKind::Array {
                child: Box::new(ParamType::from_kind(kind)),
                length,
            };
        }

        Ok(kind)
    }

    /// `"(" [param ("," param)*] ")"`
    fn parse_tuple_body(&mut self, depth: usize) -> AbiResult<Vec<ParamType>> {
        self.expect(b'(')?;
        let mut components = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b')') {
            self.pos += 1;
            return Ok(components);
        }

        loop {
            components.push(self.parse_param(depth + 1)?);
            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                _ => return Err(self.error("expected ',' or ')'")),
            }
        }

        Ok(components)
    }
}

/// JSON ABI parameter object: `{"name", "type", "components", "indexed"}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonParam {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<JsonParam>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
}

impl TryFrom<JsonParam> for ParamType {
    type Error = AbiError;

    fn try_from(p: JsonParam) -> Result<Self, Self::Error> {
        let mut param = if let Some(suffix) = p.type_name.strip_prefix("tuple") {
            let components = p
                .components
                .ok_or_else(|| AbiError::invalid_type(&p.type_name, "tuple without components"))?
                .into_iter()
                .map(ParamType::try_from)
                .collect::<Result<Vec<_>, _>>()?;
            apply_array_suffix(ParamType::tuple(components), suffix, &p.type_name)?
        } else {
            if p.components.is_some() {
                return Err(AbiError::invalid_type(&p.type_name, "components on a non-tuple type"));
            }
            let parsed = ParamType::parse(&p.type_name)?;
            if parsed.name.is_some() || parsed.indexed.is_some() {
                return Err(AbiError::invalid_type(&p.type_name, "unexpected name in type"));
            }
            parsed
        };

        param = param.with_name(p.name);
        param.indexed = p.indexed;
        Ok(param)
    }
}

fn apply_array_suffix(mut param: ParamType, suffix: &str, type_name: &str) -> AbiResult<ParamType> {
    let mut rest = suffix;
    while !rest.is_empty() {
        let inner = rest
            .strip_prefix('[')
            .and_then(|r| r.find(']').map(|end| (&r[..end], &r[end + 1..])));
        let (digits, tail) = inner.ok_or_else(|| AbiError::invalid_type(type_name, "invalid array suffix"))?;

        let length = if digits.is_empty() {
            ArrayLength::Dynamic
        } else {
            let n = digits
                .parse::<usize>()
                .map_err(|_| AbiError::invalid_type(type_name, "invalid array length"))?;
            ArrayLength::Fixed(n)
        };
        param = ParamType::array(param, length);
        rest = tail;
    }
    Ok(param)
}

impl From<ParamType> for JsonParam {
    fn from(p: ParamType) -> Self {
        let name = p.name.clone().unwrap_or_default();
        let indexed = p.indexed;

        // Peel array levels down to the innermost element type
        let mut suffixes = Vec::new();
        let mut inner = p;
        loop {
            match inner.kind {
                ParamKind::Array { child, length } => {
                    suffixes.push(match length {
                        ArrayLength::Dynamic => "[]".to_string(),
                        ArrayLength::Fixed(n) => format!("[{}]", n),
                    });
                    inner = *child;
                }
                _ => break,
            }
        }
        let suffix: String = suffixes.into_iter().rev().collect();

        let (base, components) = match inner.kind {
            ParamKind::Tuple(components) => (
                "tuple".to_string(),
                Some(components.into_iter().map(JsonParam::from).collect()),
            ),
            ParamKind::Elementary(name) => (name, None),
            ParamKind::Empty => (String::new(), None),
            ParamKind::Array { .. } => unreachable!("array levels are peeled above"),
        };

        JsonParam {
            name,
            type_name: format!("{}{}", base, suffix),
            components,
            indexed,
        }
    }
}
