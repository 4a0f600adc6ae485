//! Unified error types for the ABI codec
//!
//! Every failure carries the parameter name and declared type it was raised
//! for, and for encode errors the offending value, so callers can report a
//! precise diagnostic without re-deriving it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error kinds for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unrecognized type string or invalid width/size
    InvalidType,
    /// Top-level (or tuple) type and value counts differ
    ArgumentMismatch,
    /// Value does not fit the declared width or length
    ValueOutOfRange,
    /// Value has the wrong shape for its type
    InvalidValue,
    /// Decode buffer is too short, misaligned or otherwise corrupt
    MalformedData,
    /// A coder was asked to do something it structurally cannot
    UnsupportedOperation,
}

/// Main error type for all codec operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AbiError {
    #[error("invalid type {type_name:?}: {reason}")]
    InvalidType { type_name: String, reason: String },

    #[error("types/values length mismatch (types={types}, values={values}, value={value})")]
    ArgumentMismatch {
        types: usize,
        values: usize,
        value: String,
    },

    #[error("{reason} (param={param:?}, type={type_name}, value={value})")]
    ValueOutOfRange {
        param: String,
        type_name: String,
        value: String,
        reason: String,
    },

    #[error("{reason} (param={param:?}, type={type_name}, value={value})")]
    InvalidValue {
        param: String,
        type_name: String,
        value: String,
        reason: String,
    },

    #[error("{reason} (type={type_name}, length={length}, offset={offset})")]
    MalformedData {
        type_name: String,
        reason: String,
        length: usize,
        offset: usize,
    },

    #[error("unsupported operation {operation} on {coder} coder")]
    UnsupportedOperation { coder: String, operation: String },
}

impl AbiError {
    pub fn invalid_type(type_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub fn out_of_range(
        param: impl Into<String>,
        type_name: impl Into<String>,
        value: impl std::fmt::Debug,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueOutOfRange {
            param: param.into(),
            type_name: type_name.into(),
            value: format!("{:?}", value),
            reason: reason.into(),
        }
    }

    pub fn invalid_value(
        param: impl Into<String>,
        type_name: impl Into<String>,
        value: impl std::fmt::Debug,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            param: param.into(),
            type_name: type_name.into(),
            value: format!("{:?}", value),
            reason: reason.into(),
        }
    }

    pub fn malformed(
        type_name: impl Into<String>,
        reason: impl Into<String>,
        length: usize,
        offset: usize,
    ) -> Self {
        Self::MalformedData {
            type_name: type_name.into(),
            reason: reason.into(),
            length,
            offset,
        }
    }

    pub fn unsupported(coder: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::UnsupportedOperation {
            coder: coder.into(),
            operation: operation.into(),
        }
    }

    /// The category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AbiError::InvalidType { .. } => ErrorKind::InvalidType,
            AbiError::ArgumentMismatch { .. } => ErrorKind::ArgumentMismatch,
            AbiError::ValueOutOfRange { .. } => ErrorKind::ValueOutOfRange,
            AbiError::InvalidValue { .. } => ErrorKind::InvalidValue,
            AbiError::MalformedData { .. } => ErrorKind::MalformedData,
            AbiError::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
        }
    }
}

/// Result type alias for codec operations
pub type AbiResult<T> = Result<T, AbiError>;

// Conversions from common error types

impl From<hex::FromHexError> for AbiError {
    fn from(e: hex::FromHexError) -> Self {
        AbiError::invalid_value("", "hex", e.to_string(), "invalid hex data")
    }
}

impl From<serde_json::Error> for AbiError {
    fn from(e: serde_json::Error) -> Self {
        AbiError::invalid_type("json", e.to_string())
    }
}
