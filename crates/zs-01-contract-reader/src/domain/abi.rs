//! # Contract ABI Codec
//!
//! Encodes call data and decodes return data for the subset of the Solidity
//! ABI used by the Zarya contract.
//!
//! ## Layout
//!
//! ```text
//! call data   = selector(4) ++ tuple(args)
//! tuple       = head(32 * n) ++ tail
//! static arg  → one 32-byte word in the head
//! dynamic arg → offset word in the head, payload in the tail
//! T[]         = length word ++ tuple(elements)
//! string      = length word ++ utf8 bytes (right-padded to 32)
//! ```
//!
//! Offsets inside a tuple are relative to the start of that tuple.

use std::fmt;

use primitive_types::{H160, H256, U256};
use sha3::{Digest, Keccak256};

use super::errors::AbiError;

/// Size of one ABI word.
pub const WORD: usize = 32;

/// Length of a function selector.
pub const SELECTOR_LEN: usize = 4;

/// ABI parameter type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AbiType {
    Bool,
    /// Unsigned integer of the given bit width (8..=256, multiple of 8).
    Uint(usize),
    Address,
    Bytes32,
    String,
    /// Dynamic array `T[]`.
    Array(Box<AbiType>),
}

impl AbiType {
    /// `T[]` shorthand.
    pub fn array_of(inner: AbiType) -> Self {
        AbiType::Array(Box::new(inner))
    }

    /// Whether values of this type live in the tail of a tuple.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, AbiType::String | AbiType::Array(_))
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiType::Bool => write!(f, "bool"),
            AbiType::Uint(bits) => write!(f, "uint{}", bits),
            AbiType::Address => write!(f, "address"),
            AbiType::Bytes32 => write!(f, "bytes32"),
            AbiType::String => write!(f, "string"),
            AbiType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

/// A typed ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AbiValue {
    Bool(bool),
    /// Value and declared bit width.
    Uint(U256, usize),
    Address(H160),
    Bytes32(H256),
    String(String),
    /// Element type and elements. The element type is kept so empty arrays
    /// still produce a canonical signature.
    Array(AbiType, Vec<AbiValue>),
}

impl AbiValue {
    pub fn uint256(value: impl Into<U256>) -> Self {
        AbiValue::Uint(value.into(), 256)
    }

    pub fn uint64(value: u64) -> Self {
        AbiValue::Uint(U256::from(value), 64)
    }

    /// The ABI type this value encodes as.
    pub fn abi_type(&self) -> AbiType {
        match self {
            AbiValue::Bool(_) => AbiType::Bool,
            AbiValue::Uint(_, bits) => AbiType::Uint(*bits),
            AbiValue::Address(_) => AbiType::Address,
            AbiValue::Bytes32(_) => AbiType::Bytes32,
            AbiValue::String(_) => AbiType::String,
            AbiValue::Array(inner, _) => AbiType::array_of(inner.clone()),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AbiValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u256(&self) -> Option<U256> {
        match self {
            AbiValue::Uint(v, _) => Some(*v),
            _ => None,
        }
    }

    /// Narrow a uint to `u64`; `None` when the value is wider.
    pub fn as_u64(&self) -> Option<u64> {
        self.as_u256()
            .filter(|v| *v <= U256::from(u64::MAX))
            .map(|v| v.low_u64())
    }

    pub fn as_address(&self) -> Option<H160> {
        match self {
            AbiValue::Address(a) => Some(*a),
            _ => None,
        }
    }

    pub fn as_bytes32(&self) -> Option<H256> {
        match self {
            AbiValue::Bytes32(h) => Some(*h),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AbiValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AbiValue]> {
        match self {
            AbiValue::Array(_, items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in decode errors.
    pub fn kind(&self) -> String {
        self.abi_type().to_string()
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// Canonical signature, e.g. `getTheme(bool,uint256)`.
pub fn signature(function: &str, inputs: &[AbiValue]) -> String {
    let types: Vec<String> = inputs.iter().map(|v| v.abi_type().to_string()).collect();
    format!("{}({})", function, types.join(","))
}

/// First four bytes of keccak-256 over the canonical signature.
pub fn selector(signature: &str) -> [u8; SELECTOR_LEN] {
    let digest = Keccak256::digest(signature.as_bytes());
    let mut out = [0u8; SELECTOR_LEN];
    out.copy_from_slice(&digest[..SELECTOR_LEN]);
    out
}

// =============================================================================
// ENCODING
// =============================================================================

/// Build full call data: selector followed by the encoded arguments.
pub fn encode_call(function: &str, inputs: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let sig = signature(function, inputs);
    let mut data = selector(&sig).to_vec();
    data.extend(encode_tuple(inputs)?);
    Ok(data)
}

/// Encode a sequence of values as an ABI tuple.
pub fn encode_tuple(values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    let head_len = WORD * values.len();
    let mut head = Vec::with_capacity(head_len);
    let mut tail = Vec::new();

    for value in values {
        if value.abi_type().is_dynamic() {
            head.extend_from_slice(&usize_word(head_len + tail.len()));
            tail.extend(encode_dynamic(value)?);
        } else {
            head.extend_from_slice(&encode_static(value)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_static(value: &AbiValue) -> Result<[u8; WORD], AbiError> {
    let mut word = [0u8; WORD];
    match value {
        AbiValue::Bool(b) => word[WORD - 1] = u8::from(*b),
        AbiValue::Uint(v, bits) => {
            check_uint_width(*v, *bits)?;
            v.to_big_endian(&mut word);
        }
        AbiValue::Address(a) => word[12..].copy_from_slice(a.as_bytes()),
        AbiValue::Bytes32(h) => word.copy_from_slice(h.as_bytes()),
        other => return Err(AbiError::TypeMismatch(other.kind())),
    }
    Ok(word)
}

fn encode_dynamic(value: &AbiValue) -> Result<Vec<u8>, AbiError> {
    match value {
        AbiValue::String(s) => {
            let bytes = s.as_bytes();
            let mut out = usize_word(bytes.len()).to_vec();
            out.extend_from_slice(bytes);
            out.resize(WORD + padded_len(bytes.len()), 0);
            Ok(out)
        }
        AbiValue::Array(inner, items) => {
            if let Some(bad) = items.iter().find(|item| item.abi_type() != *inner) {
                return Err(AbiError::TypeMismatch(format!(
                    "{} element in {}[]",
                    bad.kind(),
                    inner
                )));
            }
            let mut out = usize_word(items.len()).to_vec();
            out.extend(encode_tuple(items)?);
            Ok(out)
        }
        other => Err(AbiError::TypeMismatch(other.kind())),
    }
}

fn check_uint_width(value: U256, bits: usize) -> Result<(), AbiError> {
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::TypeMismatch(format!("uint{}", bits)));
    }
    if bits < 256 && value.bits() > bits {
        return Err(AbiError::UintOverflow { bits });
    }
    Ok(())
}

fn usize_word(n: usize) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    U256::from(n).to_big_endian(&mut word);
    word
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(WORD) * WORD
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode return data against the expected output types.
pub fn decode_outputs(data: &[u8], outputs: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
    if outputs.is_empty() {
        return Ok(Vec::new());
    }
    if data.is_empty() {
        return Err(AbiError::EmptyReturnData {
            expected: outputs.len(),
        });
    }
    decode_tuple(data, 0, outputs)
}

fn decode_tuple(data: &[u8], base: usize, types: &[AbiType]) -> Result<Vec<AbiValue>, AbiError> {
    let mut values = Vec::with_capacity(types.len());
    for (i, ty) in types.iter().enumerate() {
        let head_pos = base + i * WORD;
        if ty.is_dynamic() {
            let offset = read_usize(data, head_pos)?;
            let start = base.checked_add(offset).ok_or(AbiError::OffsetOverflow)?;
            values.push(decode_dynamic(data, start, ty)?);
        } else {
            values.push(decode_static(read_word(data, head_pos)?, ty)?);
        }
    }
    Ok(values)
}

fn decode_static(word: &[u8], ty: &AbiType) -> Result<AbiValue, AbiError> {
    match ty {
        AbiType::Bool => {
            let value = U256::from_big_endian(word);
            if value > U256::one() {
                return Err(AbiError::InvalidBool);
            }
            Ok(AbiValue::Bool(!value.is_zero()))
        }
        AbiType::Uint(bits) => {
            let value = U256::from_big_endian(word);
            check_uint_width(value, *bits)?;
            Ok(AbiValue::Uint(value, *bits))
        }
        AbiType::Address => {
            if word[..12].iter().any(|b| *b != 0) {
                return Err(AbiError::InvalidAddress);
            }
            Ok(AbiValue::Address(H160::from_slice(&word[12..])))
        }
        AbiType::Bytes32 => Ok(AbiValue::Bytes32(H256::from_slice(word))),
        other => Err(AbiError::TypeMismatch(other.to_string())),
    }
}

fn decode_dynamic(data: &[u8], start: usize, ty: &AbiType) -> Result<AbiValue, AbiError> {
    let len = read_usize(data, start)?;
    let payload = start.checked_add(WORD).ok_or(AbiError::OffsetOverflow)?;

    match ty {
        AbiType::String => {
            let bytes = slice(data, payload, len)?;
            let text = std::str::from_utf8(bytes).map_err(|_| AbiError::InvalidUtf8)?;
            Ok(AbiValue::String(text.to_owned()))
        }
        AbiType::Array(inner) => {
            // Every element occupies at least one head word; reject lengths the
            // payload cannot hold before allocating.
            let min_bytes = len.checked_mul(WORD).ok_or(AbiError::OffsetOverflow)?;
            slice(data, payload, min_bytes)?;
            let types = vec![(**inner).clone(); len];
            let items = decode_tuple(data, payload, &types)?;
            Ok(AbiValue::Array((**inner).clone(), items))
        }
        other => Err(AbiError::TypeMismatch(other.to_string())),
    }
}

fn slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8], AbiError> {
    let end = offset.checked_add(len).ok_or(AbiError::OffsetOverflow)?;
    data.get(offset..end).ok_or(AbiError::OutOfBounds {
        offset,
        needed: len,
        available: data.len(),
    })
}

fn read_word(data: &[u8], offset: usize) -> Result<&[u8], AbiError> {
    slice(data, offset, WORD)
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize, AbiError> {
    let value = U256::from_big_endian(read_word(data, offset)?);
    if value > U256::from(usize::MAX) {
        return Err(AbiError::OffsetOverflow);
    }
    Ok(value.as_usize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_hex(data: &[u8], index: usize) -> String {
        hex::encode(&data[index * WORD..(index + 1) * WORD])
    }

    #[test]
    fn test_canonical_signature() {
        let sig = signature(
            "getCategoryName",
            &[
                AbiValue::uint256(1u64),
                AbiValue::uint256(2u64),
                AbiValue::uint64(3),
            ],
        );
        assert_eq!(sig, "getCategoryName(uint256,uint256,uint64)");
    }

    #[test]
    fn test_known_selectors() {
        assert_eq!(hex::encode(selector("transfer(address,uint256)")), "a9059cbb");
        assert_eq!(hex::encode(selector("balanceOf(address)")), "70a08231");
    }

    #[test]
    fn test_encode_static_arguments() {
        let data = encode_call(
            "getTheme",
            &[AbiValue::Bool(true), AbiValue::uint256(7u64)],
        )
        .unwrap();

        assert_eq!(data.len(), SELECTOR_LEN + 2 * WORD);
        assert_eq!(&data[..4], &selector("getTheme(bool,uint256)"));
        let body = &data[4..];
        assert_eq!(word_hex(body, 0), format!("{:064x}", 1));
        assert_eq!(word_hex(body, 1), format!("{:064x}", 7));
    }

    #[test]
    fn test_encode_string_uses_offset_and_padding() {
        let encoded = encode_tuple(&[AbiValue::uint256(1u64), AbiValue::String("abc".into())]).unwrap();

        // head: uint, offset(64); tail: len(3), "abc" padded
        assert_eq!(encoded.len(), 4 * WORD);
        assert_eq!(word_hex(&encoded, 1), format!("{:064x}", 64));
        assert_eq!(word_hex(&encoded, 2), format!("{:064x}", 3));
        assert_eq!(&encoded[3 * WORD..3 * WORD + 3], b"abc");
        assert!(encoded[3 * WORD + 3..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_rejects_overflowing_uint() {
        let result = encode_tuple(&[AbiValue::Uint(U256::from(256u64), 8)]);
        assert_eq!(result, Err(AbiError::UintOverflow { bits: 8 }));
    }

    #[test]
    fn test_encode_rejects_mixed_array() {
        let array = AbiValue::Array(
            AbiType::Uint(64),
            vec![AbiValue::uint64(1), AbiValue::Bool(false)],
        );
        assert!(matches!(
            encode_tuple(&[array]),
            Err(AbiError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_decode_cell_info_shape() {
        let organ = H256::repeat_byte(0xab);
        let encoded = encode_tuple(&[
            AbiValue::Bytes32(organ),
            AbiValue::Array(AbiType::Uint(64), vec![AbiValue::uint64(4), AbiValue::uint64(9)]),
            AbiValue::uint256(12u64),
        ])
        .unwrap();

        let decoded = decode_outputs(
            &encoded,
            &[
                AbiType::Bytes32,
                AbiType::array_of(AbiType::Uint(64)),
                AbiType::Uint(256),
            ],
        )
        .unwrap();

        assert_eq!(decoded[0].as_bytes32(), Some(organ));
        let ids: Vec<u64> = decoded[1]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(AbiValue::as_u64)
            .collect();
        assert_eq!(ids, vec![4, 9]);
        assert_eq!(decoded[2].as_u64(), Some(12));
    }

    #[test]
    fn test_decode_history_with_three_arrays() {
        let submitter = H160::repeat_byte(0x11);
        let encoded = encode_tuple(&[
            AbiValue::Array(AbiType::Uint(32), vec![AbiValue::Uint(U256::from(1_700_000_000u64), 32)]),
            AbiValue::Array(AbiType::Address, vec![AbiValue::Address(submitter)]),
            AbiValue::Array(AbiType::Uint(64), vec![AbiValue::uint64(7500)]),
        ])
        .unwrap();

        let decoded = decode_outputs(
            &encoded,
            &[
                AbiType::array_of(AbiType::Uint(32)),
                AbiType::array_of(AbiType::Address),
                AbiType::array_of(AbiType::Uint(64)),
            ],
        )
        .unwrap();

        assert_eq!(decoded[1].as_array().unwrap()[0].as_address(), Some(submitter));
        assert_eq!(decoded[2].as_array().unwrap()[0].as_u64(), Some(7500));
    }

    #[test]
    fn test_decode_utf8_string() {
        let encoded = encode_tuple(&[AbiValue::String("Экономика".into())]).unwrap();
        let decoded = decode_outputs(&encoded, &[AbiType::String]).unwrap();
        assert_eq!(decoded[0].as_str(), Some("Экономика"));
    }

    #[test]
    fn test_decode_empty_return_data_is_error() {
        let result = decode_outputs(&[], &[AbiType::String]);
        assert_eq!(result, Err(AbiError::EmptyReturnData { expected: 1 }));
    }

    #[test]
    fn test_decode_truncated_data_is_error() {
        let mut encoded = encode_tuple(&[AbiValue::String("hello".into())]).unwrap();
        encoded.truncate(WORD + 10);
        assert!(matches!(
            decode_outputs(&encoded, &[AbiType::String]),
            Err(AbiError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_decode_huge_array_length_is_rejected() {
        let mut encoded = usize_word(WORD).to_vec();
        encoded.extend_from_slice(&[0xff; WORD]);
        assert!(decode_outputs(&encoded, &[AbiType::array_of(AbiType::Uint(64))]).is_err());
    }

    #[test]
    fn test_decode_rejects_dirty_bool_and_address() {
        let word = [0x02u8; WORD];
        assert_eq!(decode_outputs(&word, &[AbiType::Bool]), Err(AbiError::InvalidBool));
        assert_eq!(
            decode_outputs(&word, &[AbiType::Address]),
            Err(AbiError::InvalidAddress)
        );
    }

    #[test]
    fn test_decode_checks_uint_width() {
        let encoded = encode_tuple(&[AbiValue::uint256(300u64)]).unwrap();
        assert_eq!(
            decode_outputs(&encoded, &[AbiType::Uint(8)]),
            Err(AbiError::UintOverflow { bits: 8 })
        );
    }
}
