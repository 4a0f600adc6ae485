//! JSON value coercion
//!
//! Lets callers hand over parameters as `serde_json::Value`s, the way values
//! arrive from a JSON-RPC layer or a contract UI, and get decoded results
//! back in the same form.

use serde_json::{Map, Value};

use super::coder::AbiCoder;
use super::param::{ParamKind, ParamType, ToParamType};
use super::value::{parse_address, parse_i256, parse_u256, AbiValue, Record};
use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::{decode_hex, encode_hex, to_checksum_address};

fn mismatch(param: &ParamType, json: &Value, reason: &str) -> AbiError {
    AbiError::invalid_value(
        param.name.clone().unwrap_or_default(),
        param.type_string(),
        json,
        reason,
    )
}

fn number_from_json(param: &ParamType, json: &Value) -> AbiResult<AbiValue> {
    let parsed = match json {
        Value::Number(n) => match (n.as_u64(), n.as_i64()) {
            (Some(u), _) => Some(AbiValue::uint(u)),
            (None, Some(i)) => Some(AbiValue::int(i)),
            // floats are never valid integers
            _ => None,
        },
        Value::String(s) if s.trim_start().starts_with('-') => parse_i256(s).map(AbiValue::Int),
        Value::String(s) => parse_u256(s).map(AbiValue::Uint),
        _ => None,
    };
    parsed.ok_or_else(|| mismatch(param, json, "invalid number"))
}

fn bytes_from_json(param: &ParamType, json: &Value) -> AbiResult<Vec<u8>> {
    match json {
        Value::String(s) if s.starts_with("0x") || s.starts_with("0X") => {
            decode_hex(s).map_err(|e| mismatch(param, json, &e.to_string()))
        }
        _ => Err(mismatch(param, json, "expected 0x hex string")),
    }
}

impl AbiValue {
    /// Coerce a JSON value into the value shape of `param`
    ///
    /// Numbers accept JSON integers, decimal strings (optionally negative)
    /// and `0x` hex strings. Tuples accept positional arrays or objects keyed
    /// by component name.
    pub fn from_json(param: &ParamType, json: &Value) -> AbiResult<AbiValue> {
        match &param.kind {
            ParamKind::Empty => match json {
                Value::Null => Ok(AbiValue::Null),
                _ => Err(mismatch(param, json, "expected null")),
            },
            ParamKind::Array { child, .. } => match json {
                Value::Array(items) => items
                    .iter()
                    .map(|item| AbiValue::from_json(child, item))
                    .collect::<AbiResult<Vec<_>>>()
                    .map(AbiValue::Array),
                _ => Err(mismatch(param, json, "expected array")),
            },
            ParamKind::Tuple(components) => match json {
                Value::Array(items) => {
                    if items.len() != components.len() {
                        return Err(AbiError::ArgumentMismatch {
                            types: components.len(),
                            values: items.len(),
                            value: json.to_string(),
                        });
                    }
                    let values = components
                        .iter()
                        .zip(items)
                        .map(|(c, item)| AbiValue::from_json(c, item))
                        .collect::<AbiResult<Vec<_>>>()?;
                    let names = components.iter().map(|c| c.name.clone()).collect();
                    Ok(AbiValue::Tuple(Record::with_names(values, names)))
                }
                Value::Object(fields) => tuple_from_object(param, components, fields, json),
                _ => Err(mismatch(param, json, "expected array or object")),
            },
            ParamKind::Elementary(type_name) => elementary_from_json(param, type_name, json),
        }
    }

    /// JSON form of the value: numbers as decimal strings, checksummed
    /// addresses, `0x` hex bytes and positional arrays for tuples
    pub fn to_json(&self) -> Value {
        match self {
            AbiValue::Address(a) => Value::String(to_checksum_address(a.as_bytes())),
            AbiValue::Bool(b) => Value::Bool(*b),
            AbiValue::Uint(u) => Value::String(u.to_string()),
            AbiValue::Int(i) => Value::String(i.to_string()),
            AbiValue::FixedBytes(b) | AbiValue::Bytes(b) => Value::String(encode_hex(b)),
            AbiValue::String(s) => Value::String(s.clone()),
            AbiValue::Array(items) => Value::Array(items.iter().map(AbiValue::to_json).collect()),
            AbiValue::Tuple(record) => Value::Array(record.iter().map(AbiValue::to_json).collect()),
            AbiValue::Struct(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(name, v)| (name.clone(), v.to_json()))
                    .collect(),
            ),
            AbiValue::Null => Value::Null,
        }
    }
}

fn tuple_from_object(
    param: &ParamType,
    components: &[ParamType],
    fields: &Map<String, Value>,
    json: &Value,
) -> AbiResult<AbiValue> {
    let mut keyed = Vec::with_capacity(components.len());
    for component in components {
        let name = component
            .name
            .as_deref()
            .ok_or_else(|| mismatch(param, json, "cannot use object for tuple with unnamed components"))?;
        let value = fields
            .get(name)
            .ok_or_else(|| mismatch(param, json, &format!("missing value for component {}", name)))?;
        keyed.push((name.to_string(), AbiValue::from_json(component, value)?));
    }
    Ok(AbiValue::Struct(keyed))
}

fn elementary_from_json(param: &ParamType, type_name: &str, json: &Value) -> AbiResult<AbiValue> {
    match type_name {
        "address" => match json {
            Value::String(s) => parse_address(s)
                .map(AbiValue::Address)
                .map_err(|e| mismatch(param, json, &e.to_string())),
            _ => Err(mismatch(param, json, "expected address string")),
        },
        "bool" => json
            .as_bool()
            .map(AbiValue::Bool)
            .ok_or_else(|| mismatch(param, json, "expected bool")),
        "string" => json
            .as_str()
            .map(AbiValue::from)
            .ok_or_else(|| mismatch(param, json, "expected string")),
        "bytes" => bytes_from_json(param, json).map(AbiValue::Bytes),
        t if t.starts_with("bytes") => bytes_from_json(param, json).map(AbiValue::FixedBytes),
        t if t.starts_with("uint") || t.starts_with("int") => number_from_json(param, json),
        _ => Err(AbiError::invalid_type(type_name, "invalid type")),
    }
}

impl AbiCoder {
    /// [`AbiCoder::encode`] over JSON values
    pub fn encode_json<T: ToParamType>(&self, types: &[T], values: &[Value]) -> AbiResult<Vec<u8>> {
        if types.len() != values.len() {
            return Err(AbiError::ArgumentMismatch {
                types: types.len(),
                values: values.len(),
                value: Value::Array(values.to_vec()).to_string(),
            });
        }

        let params = types
            .iter()
            .map(|t| t.to_param_type())
            .collect::<AbiResult<Vec<_>>>()?;
        let converted = params
            .iter()
            .zip(values)
            .map(|(p, v)| AbiValue::from_json(p, v))
            .collect::<AbiResult<Vec<_>>>()?;

        self.encode(&params, &converted)
    }

    /// [`AbiCoder::decode`] returning a JSON array of the decoded values
    pub fn decode_json<T: ToParamType>(
        &self,
        types: &[T],
        data: impl AsRef<[u8]>,
        loose: bool,
    ) -> AbiResult<Value> {
        let record = self.decode(types, data, loose)?;
        Ok(Value::Array(record.iter().map(AbiValue::to_json).collect()))
    }
}
