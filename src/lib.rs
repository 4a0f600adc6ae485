//! Zond ABI Codec
//!
//! Encodes typed parameter lists into the 32-byte-word Application Binary
//! Interface used by Zond contract calls, and decodes call data, return
//! data and event logs back into typed values.
//!
//! # Architecture
//!
//! - **abi**: type descriptors, coders, the encode/decode facade, fragments
//! - **config**: codec settings (depth limit, call logging)
//! - **error**: the error taxonomy shared by every operation
//! - **utils**: keccak hashing, Zond address checksums, structured logging
//!
//! # Example
//!
//! ```rust
//! use zond_abi::{decode, encode, AbiValue};
//!
//! let data = encode(&["uint256", "string"], &[AbiValue::uint(1), "hi".into()]).unwrap();
//! assert_eq!(data.len(), 128);
//!
//! let result = decode(&["uint256 n", "string s"], &data, false).unwrap();
//! assert_eq!(result["n"], AbiValue::uint(1));
//! assert_eq!(result["s"], AbiValue::from("hi"));
//! ```

pub mod abi;
pub mod config;
pub mod error;
pub mod utils;

pub use abi::{
    decode, default_value, encode, AbiCoder, AbiValue, ContractAbi, Event, Function, ParamType,
    Record,
};
pub use config::CoderSettings;
pub use error::{AbiError, AbiResult, ErrorKind};
