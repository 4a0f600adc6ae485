//! Hashing and address helpers
//!
//! Zond addresses are 20 bytes rendered as `Z` followed by 40 hex characters
//! whose letter case encodes a keccak256 checksum (the EIP-55 rule applied
//! to the Zond prefix).

use tiny_keccak::{Hasher, Keccak};

/// Prefix of the canonical Zond address text form
pub const ADDRESS_PREFIX: char = 'Z';

/// Keccak256 hash (used for selectors, topics and address checksums)
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut out = [0u8; 32];
    hasher.finalize(&mut out);
    out
}

/// Convert raw address bytes to a checksummed Zond address
pub fn to_checksum_address(address: &[u8]) -> String {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut result = String::with_capacity(lower.len() + 1);
    result.push(ADDRESS_PREFIX);
    for (i, ch) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };

        if ch.is_ascii_digit() {
            result.push(ch);
        } else if nibble >= 8 {
            result.push(ch.to_ascii_uppercase());
        } else {
            result.push(ch);
        }
    }

    result
}

/// Strip a `0x`/`0X` prefix if present
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Strip a Zond (`Z`/`z`) or hex (`0x`) address prefix
pub fn strip_address_prefix(s: &str) -> Option<&str> {
    s.strip_prefix('Z')
        .or_else(|| s.strip_prefix('z'))
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
}

/// Decode a hex string with or without `0x` prefix
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    hex::decode(strip_hex_prefix(s.trim()))
}

/// Encode bytes as a `0x` prefixed hex string
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256() {
        let hash = keccak256(b"");
        assert_eq!(
            hex::encode(hash),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn test_checksum_address() {
        let addr_bytes = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        let checksummed = to_checksum_address(&addr_bytes);
        assert_eq!(checksummed, "Z5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");

        let addr_bytes = hex::decode("fb6916095ca1df60bb79ce92ce3ea74c37c5d359").unwrap();
        assert_eq!(
            to_checksum_address(&addr_bytes),
            "ZfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359"
        );
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(strip_hex_prefix("0xdead"), "dead");
        assert_eq!(strip_hex_prefix("dead"), "dead");
        assert_eq!(strip_address_prefix("Zabc"), Some("abc"));
        assert_eq!(strip_address_prefix("0xabc"), Some("abc"));
        assert_eq!(strip_address_prefix("abc"), None);
        assert_eq!(decode_hex("0x0102").unwrap(), vec![1, 2]);
        assert_eq!(encode_hex(&[0xde, 0xad]), "0xdead");
    }
}
