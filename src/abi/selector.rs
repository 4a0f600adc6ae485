//! Function selector and event topic calculation

use crate::error::{AbiError, AbiResult};
use crate::utils::crypto::{encode_hex, keccak256};

/// Length of a function selector in bytes
pub const SELECTOR_LEN: usize = 4;

/// First 4 bytes of keccak256 over a canonical signature
pub fn function_selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// keccak256 over a canonical event signature (topic0)
pub fn event_topic(signature: &str) -> [u8; 32] {
    keccak256(signature.as_bytes())
}

/// Selector as `0x` prefixed hex
pub fn selector_hex(signature: &str) -> String {
    encode_hex(&function_selector(signature))
}

/// Prefix encoded arguments with a selector
pub fn with_selector(selector: [u8; SELECTOR_LEN], args: &[u8]) -> Vec<u8> {
    let mut calldata = Vec::with_capacity(SELECTOR_LEN + args.len());
    calldata.extend_from_slice(&selector);
    calldata.extend_from_slice(args);
    calldata
}

/// Split call data into its selector and argument bytes
pub fn split_selector(calldata: &[u8]) -> AbiResult<([u8; SELECTOR_LEN], &[u8])> {
    if calldata.len() < SELECTOR_LEN {
        return Err(AbiError::malformed("selector", "call data shorter than selector", calldata.len(), 0));
    }
    let mut selector = [0u8; SELECTOR_LEN];
    selector.copy_from_slice(&calldata[..SELECTOR_LEN]);
    Ok((selector, &calldata[SELECTOR_LEN..]))
}
