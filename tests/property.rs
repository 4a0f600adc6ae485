use ethers_core::types::{Address, I256, U256};
use proptest::prelude::*;
use zond_abi::utils::crypto::{keccak256, to_checksum_address};
use zond_abi::{decode, encode, AbiValue};

/// A type string paired with a value strategy for it
fn typed_value() -> impl Strategy<Value = (String, AbiValue)> {
    let leaf = prop_oneof![
        any::<u64>().prop_map(|n| ("uint64".to_string(), AbiValue::uint(n))),
        prop::array::uniform32(any::<u8>())
            .prop_map(|b| ("uint256".to_string(), AbiValue::Uint(U256::from_big_endian(&b)))),
        any::<i64>().prop_map(|n| ("int64".to_string(), AbiValue::int(n))),
        prop::array::uniform32(any::<u8>())
            .prop_map(|b| ("int256".to_string(), AbiValue::Int(I256::from_raw(U256::from_big_endian(&b))))),
        any::<bool>().prop_map(|b| ("bool".to_string(), AbiValue::Bool(b))),
        prop::array::uniform20(any::<u8>())
            .prop_map(|b| ("address".to_string(), AbiValue::Address(Address::from(b)))),
        prop::collection::vec(any::<u8>(), 0..80)
            .prop_map(|b| ("bytes".to_string(), AbiValue::Bytes(b))),
        (1usize..=32)
            .prop_flat_map(|n| prop::collection::vec(any::<u8>(), n))
            .prop_map(|b| (format!("bytes{}", b.len()), AbiValue::FixedBytes(b))),
        ".{0,40}".prop_map(|s| ("string".to_string(), AbiValue::String(s))),
    ];

    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            // Dynamic arrays need a single element type: repeat one value
            (inner.clone(), 0usize..4).prop_map(|((t, v), n)| (format!("{}[]", t), AbiValue::Array(vec![v; n]))),
            (inner.clone(), 1usize..4).prop_map(|((t, v), n)| (format!("{}[{}]", t, n), AbiValue::Array(vec![v; n]))),
            prop::collection::vec(inner, 1..4).prop_map(|items| {
                let (types, values): (Vec<String>, Vec<AbiValue>) = items.into_iter().unzip();
                (format!("({})", types.join(",")), AbiValue::tuple(values))
            }),
        ]
    })
}

proptest! {
    #[test]
    fn encode_then_decode_roundtrips(items in prop::collection::vec(typed_value(), 0..5)) {
        let (types, values): (Vec<String>, Vec<AbiValue>) = items.into_iter().unzip();

        let encoded = encode(&types, &values).unwrap();
        let decoded = decode(&types, &encoded, false).unwrap();
        prop_assert_eq!(decoded.values(), values.as_slice());
    }

    #[test]
    fn encodings_are_word_aligned(items in prop::collection::vec(typed_value(), 0..5)) {
        let (types, values): (Vec<String>, Vec<AbiValue>) = items.into_iter().unzip();
        let encoded = encode(&types, &values).unwrap();
        prop_assert_eq!(encoded.len() % 32, 0);
    }

    #[test]
    fn unsigned_width_is_enforced(bits in (1usize..=32).prop_map(|n| n * 8), raw in prop::array::uniform32(any::<u8>())) {
        let value = U256::from_big_endian(&raw);
        let type_name = format!("uint{}", bits);
        let result = encode(&[type_name.as_str()], &[AbiValue::Uint(value)]);
        prop_assert_eq!(result.is_ok(), value.bits() <= bits);
    }

    #[test]
    fn signed_width_is_enforced(bytes in 1usize..=8, n in any::<i64>()) {
        let bits = bytes * 8;
        let type_name = format!("int{}", bits);
        let fits = bits == 64 || (n >= -(1i64 << (bits - 1)) && n < (1i64 << (bits - 1)));

        let result = encode(&[type_name.as_str()], &[AbiValue::int(n)]);
        prop_assert_eq!(result.is_ok(), fits);
    }

    #[test]
    fn checksum_addresses_roundtrip(bytes in prop::array::uniform20(any::<u8>())) {
        let checksummed = to_checksum_address(&bytes);
        prop_assert!(checksummed.starts_with('Z'));

        let tail = &checksummed[1..];
        let lower_expected = hex::encode(bytes);
        prop_assert_eq!(tail.to_ascii_lowercase(), lower_expected.clone());

        let hash = keccak256(lower_expected.as_bytes());
        let mut expected = String::from("Z");
        for (i, ch) in lower_expected.chars().enumerate() {
            let byte = hash[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if ch.is_ascii_digit() || nibble < 8 {
                expected.push(ch);
            } else {
                expected.push(ch.to_ascii_uppercase());
            }
        }
        prop_assert_eq!(&checksummed, &expected);

        let parsed = AbiValue::address_from_str(&checksummed).unwrap();
        prop_assert_eq!(parsed, AbiValue::Address(Address::from(bytes)));
    }
}
