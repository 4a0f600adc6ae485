//! Codec Configuration
//!
//! Settings that bound how much work a single encode/decode call may do:
//! - Maximum nesting depth of a type tree (type trees come from contract
//!   ABIs and are attacker-controllable)
//! - Size of the static layout a fixed-length array may expand to
//! - How many bytes a decode may read relative to its input, since dynamic
//!   offsets can alias one tail region many times over
//! - Whether completed calls are reported through the debug log
//!
//! The word size is not configurable: every coder assumes 32-byte words.

use serde::{Deserialize, Serialize};

use crate::abi::param::MAX_TYPE_DEPTH;
use crate::error::AbiResult;

/// Size of one ABI word in bytes
pub const WORD_SIZE: usize = 32;

/// Default cap on bytes read per input byte during a decode
pub const DEFAULT_MAX_INFLATION: usize = 1024;

/// Environment variable overriding `max_depth`
pub const ENV_MAX_DEPTH: &str = "ZOND_ABI_MAX_DEPTH";
/// Environment variable enabling call logging (`1`/`true`)
pub const ENV_LOG_CALLS: &str = "ZOND_ABI_LOG";

/// Codec settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoderSettings {
    /// Deepest array/tuple nesting accepted by the coder factory
    pub max_depth: usize,
    /// Largest static head, in words, of any fixed-length array or tuple
    pub max_static_words: usize,
    /// Bytes a decode may read per input byte; 0 disables the check
    pub max_inflation: usize,
    /// Emit a debug log entry for each completed encode/decode
    pub log_calls: bool,
}

impl Default for CoderSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl CoderSettings {
    /// Standard preset - suitable for any real contract ABI
    pub fn standard() -> Self {
        Self {
            max_depth: 32,
            max_static_words: 1 << 20,
            max_inflation: DEFAULT_MAX_INFLATION,
            log_calls: false,
        }
    }

    /// Strict preset - for decoding ABIs from untrusted sources
    pub fn strict() -> Self {
        Self {
            max_depth: 8,
            max_static_words: 1 << 14,
            max_inflation: 64,
            log_calls: false,
        }
    }

    /// Validate settings, returning the list of problems found
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.max_depth == 0 {
            issues.push("max_depth must be at least 1".to_string());
        }
        if self.max_depth > MAX_TYPE_DEPTH {
            issues.push(format!(
                "max_depth {} exceeds the parser limit of {}",
                self.max_depth, MAX_TYPE_DEPTH
            ));
        }

        if self.max_static_words == 0 {
            issues.push("max_static_words must be at least 1".to_string());
        }

        issues
    }

    /// Parse settings from a JSON document; missing keys keep their defaults
    pub fn from_json(json: &str) -> AbiResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Standard settings overridden by the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::standard();

        if let Some(depth) = lookup(ENV_MAX_DEPTH).and_then(|v| v.trim().parse().ok()) {
            settings.max_depth = depth;
        }
        if let Some(flag) = lookup(ENV_LOG_CALLS) {
            settings.log_calls = matches!(flag.trim(), "1" | "true" | "yes");
        }

        settings
    }
}
