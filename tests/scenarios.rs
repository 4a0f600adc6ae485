use zond_abi::abi::coders::Codec;
use zond_abi::abi::param::ParamType;
use zond_abi::{decode, encode, AbiCoder, AbiError, AbiValue, ErrorKind};

fn word(n: u8) -> Vec<u8> {
    let mut w = vec![0u8; 32];
    w[31] = n;
    w
}

#[test]
fn simple_static_tuple() {
    let encoded = encode(&["uint256", "bool"], &[AbiValue::uint(1), AbiValue::Bool(true)]).unwrap();

    let mut expected = word(1);
    expected.extend(word(1));
    assert_eq!(encoded, expected);
}

#[test]
fn dynamic_string() {
    let encoded = encode(&["string"], &[AbiValue::from("hi")]).unwrap();
    assert_eq!(encoded.len(), 96);

    assert_eq!(&encoded[..32], word(0x20).as_slice());
    assert_eq!(&encoded[32..64], word(2).as_slice());
    assert_eq!(&encoded[64..66], b"hi");
    assert!(encoded[66..].iter().all(|b| *b == 0));
}

#[test]
fn nested_dynamic_array_of_strings() {
    let value = AbiValue::Array(vec![AbiValue::from("a"), AbiValue::from("b")]);
    let encoded = encode(&["string[]"], std::slice::from_ref(&value)).unwrap();

    // outer offset, count, two element offsets, two (length, payload) pairs
    assert_eq!(encoded.len(), 32 * 8);
    assert_eq!(encoded[31], 0x20);
    assert_eq!(encoded[63], 2);
    assert_eq!(encoded[95], 0x40);
    assert_eq!(encoded[127], 0x80);

    let decoded = decode(&["string[]"], &encoded, false).unwrap();
    assert_eq!(decoded[0], value);
}

#[test]
fn address_roundtrip() {
    let checksummed = "Z5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
    let value = AbiValue::address_from_str(checksummed).unwrap();

    let encoded = encode(&["address"], std::slice::from_ref(&value)).unwrap();
    assert_eq!(encoded.len(), 32);

    let decoded = decode(&["address"], &encoded, false).unwrap();
    assert_eq!(decoded[0], value);
    assert_eq!(decoded[0].to_string(), checksummed);
}

#[test]
fn loose_decode_tolerates_missing_padding() {
    let encoded = encode(&["uint8", "bytes"], &[AbiValue::uint(1), AbiValue::Bytes(vec![0xcc; 3])]).unwrap();
    assert_eq!(encoded.len(), 128);

    // Drop the trailing padding of the final payload
    let truncated = &encoded[..99];

    let err = decode(&["uint8", "bytes"], truncated, false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedData);

    let decoded = decode(&["uint8", "bytes"], truncated, true).unwrap();
    assert_eq!(decoded[1], AbiValue::Bytes(vec![0xcc; 3]));
}

#[test]
fn bit_width_validation() {
    let coder = AbiCoder::new();
    for bad in ["uint0", "uint257", "uint9"] {
        let err = coder.get_coder(&ParamType::parse(bad).unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType, "{}", bad);
    }
    for ok in ["uint256", "uint8", "int128"] {
        assert!(coder.get_coder(&ParamType::parse(ok).unwrap()).is_ok(), "{}", ok);
    }
}

#[test]
fn fixed_bytes_validation() {
    let coder = AbiCoder::new();
    for bad in ["bytes0", "bytes33"] {
        let err = coder.get_coder(&ParamType::parse(bad).unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidType, "{}", bad);
    }
    for n in 1..=32 {
        let type_name = format!("bytes{}", n);
        assert!(coder.get_coder(&ParamType::parse(&type_name).unwrap()).is_ok());
    }

    for len in [31, 33] {
        let err = encode(&["bytes32"], &[AbiValue::FixedBytes(vec![0; len])]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueOutOfRange);
    }
}

#[test]
fn mismatch_detection() {
    let err = encode(&["uint256", "bool"], &[AbiValue::uint(1)]).unwrap_err();
    assert!(matches!(err, AbiError::ArgumentMismatch { types: 2, values: 1, .. }));
    assert!(err.to_string().contains('2'));
}

#[test]
fn dynamic_static_boundary() {
    let coder = AbiCoder::new();
    let dynamic = coder.get_coder(&ParamType::parse("(string,uint256)").unwrap()).unwrap();
    let fixed = coder.get_coder(&ParamType::parse("(uint256,bool)").unwrap()).unwrap();

    assert!(dynamic.is_dynamic());
    assert!(!fixed.is_dynamic());
}

#[test]
fn signed_decode_uses_full_word() {
    // A correctly sign-extended int8(-1) and a word with only the low byte set
    let negative = vec![0xffu8; 32];
    let decoded = decode(&["int8"], &negative, false).unwrap();
    assert_eq!(decoded[0], AbiValue::int(-1));

    let decoded = decode(&["int8"], word(0xff), false).unwrap();
    assert_eq!(decoded[0], AbiValue::int(255));
}
