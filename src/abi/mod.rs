//! ABI (Application Binary Interface) codec for Zond contracts
//!
//! This module provides:
//! - Type descriptors parsed from type strings or JSON ABI parameters
//! - A word-aligned reader and head/tail writer
//! - One coder per base type, built into a tree per call
//! - The `encode` / `decode` / `default_value` facade
//! - Function and event fragments, selectors and JSON ABI parsing

pub mod coder;
pub mod coders;
pub mod fragment;
pub mod json;
pub mod param;
pub mod reader;
pub mod selector;
pub mod value;
pub mod writer;


pub use coder::{decode, default_value, encode, AbiCoder};
pub use coders::{Codec, Coder};
pub use fragment::{Constructor, ContractAbi, Event, Function, StateMutability};
pub use param::{parse_param_list, ArrayLength, FormatType, ParamKind, ParamType, ToParamType};
pub use reader::{CoerceFn, Reader};
pub use selector::{event_topic, function_selector};
pub use value::{AbiValue, Record};
pub use writer::Writer;
