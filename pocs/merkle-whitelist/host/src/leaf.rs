//! Leaf encoding for whitelist entries.
//!
//! A leaf is `keccak256(abi.encode(address, uint256))`: two 32-byte words,
//! the address right-aligned in the first, the amount big-endian in the
//! second. Fixed positions and widths make the encoding injective without
//! separators or length prefixes.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::WhitelistError;
use crate::hash::hash;

/// Width of the identifier field (an EVM address).
pub const ADDRESS_BYTES: usize = 20;

/// Width of one ABI word, and of the amount field.
pub const WORD_BYTES: usize = 32;

/// Length of an encoded leaf: two ABI words.
pub const ENCODED_LEAF_BYTES: usize = 2 * WORD_BYTES;

/// The 64-byte preimage of a leaf hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncodedLeaf([u8; ENCODED_LEAF_BYTES]);

impl EncodedLeaf {
    pub fn as_bytes(&self) -> &[u8; ENCODED_LEAF_BYTES] {
        &self.0
    }

    /// The leaf hash the tree is built over.
    pub fn hash(&self) -> B256 {
        hash(&self.0)
    }
}

impl AsRef<[u8]> for EncodedLeaf {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode raw big-endian identifier and amount bytes.
///
/// Inputs narrower than their field are left-padded with zeros, as an ABI
/// encoder would pad a `uint160` / `uint256`. Wider inputs are rejected before
/// anything is hashed.
pub fn encode(identifier: &[u8], amount: &[u8]) -> Result<EncodedLeaf, WhitelistError> {
    if identifier.len() > ADDRESS_BYTES {
        return Err(WhitelistError::EncodingOverflow {
            field: "identifier",
            bits: ADDRESS_BYTES * 8,
        });
    }
    if amount.len() > WORD_BYTES {
        return Err(WhitelistError::EncodingOverflow {
            field: "amount",
            bits: WORD_BYTES * 8,
        });
    }

    let mut out = [0u8; ENCODED_LEAF_BYTES];
    out[WORD_BYTES - identifier.len()..WORD_BYTES].copy_from_slice(identifier);
    out[ENCODED_LEAF_BYTES - amount.len()..].copy_from_slice(amount);
    Ok(EncodedLeaf(out))
}

/// Encode a typed entry. Cannot overflow: the types carry the widths.
pub fn encode_leaf(address: &Address, amount: &U256) -> EncodedLeaf {
    let mut out = [0u8; ENCODED_LEAF_BYTES];
    out[WORD_BYTES - ADDRESS_BYTES..WORD_BYTES].copy_from_slice(address.as_slice());
    out[WORD_BYTES..].copy_from_slice(&amount.to_be_bytes::<WORD_BYTES>());
    EncodedLeaf(out)
}

/// One (identifier, amount) pair of the committed whitelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub address: Address,
    pub amount: U256,
}

impl WhitelistEntry {
    pub fn new(address: Address, amount: U256) -> Self {
        Self { address, amount }
    }

    /// Build from raw big-endian bytes, with the same width rules as [`encode`].
    pub fn from_bytes(identifier: &[u8], amount: &[u8]) -> Result<Self, WhitelistError> {
        let encoded = encode(identifier, amount)?;
        let bytes = encoded.as_bytes();
        Ok(Self {
            address: Address::from_slice(&bytes[WORD_BYTES - ADDRESS_BYTES..WORD_BYTES]),
            amount: U256::from_be_slice(&bytes[WORD_BYTES..]),
        })
    }

    /// Parse a hex address and an amount in wei (decimal, or hex with `0x`).
    pub fn parse(address: &str, amount: &str) -> Result<Self, WhitelistError> {
        Ok(Self {
            address: parse_address(address)?,
            amount: parse_amount(amount)?,
        })
    }

    pub fn encode(&self) -> EncodedLeaf {
        encode_leaf(&self.address, &self.amount)
    }

    pub fn leaf_hash(&self) -> B256 {
        self.encode().hash()
    }
}

fn strip_hex_prefix(s: &str) -> Option<&str> {
    s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))
}

/// Parse a 20-byte hex address. More than 20 bytes is an overflow, fewer is
/// a malformed address.
pub fn parse_address(s: &str) -> Result<Address, WhitelistError> {
    let s = s.trim();
    let digits = strip_hex_prefix(s).unwrap_or(s);
    let bytes = hex::decode(digits)
        .map_err(|e| WhitelistError::InvalidIdentifier(format!("{s}: {e}")))?;

    if bytes.len() > ADDRESS_BYTES {
        return Err(WhitelistError::EncodingOverflow {
            field: "identifier",
            bits: ADDRESS_BYTES * 8,
        });
    }
    if bytes.len() < ADDRESS_BYTES {
        return Err(WhitelistError::InvalidIdentifier(format!(
            "{s}: expected {ADDRESS_BYTES} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(Address::from_slice(&bytes))
}

/// Parse an amount in wei. Only digits of the radix are accepted, so a parse
/// failure on well-formed digits can only mean the value exceeds 256 bits.
pub fn parse_amount(s: &str) -> Result<U256, WhitelistError> {
    let s = s.trim();
    let (digits, radix) = match strip_hex_prefix(s) {
        Some(hex) => (hex, 16u32),
        None => (s, 10u32),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(WhitelistError::InvalidAmount(s.to_string()));
    }

    U256::from_str_radix(digits, u64::from(radix)).map_err(|_| WhitelistError::EncodingOverflow {
        field: "amount",
        bits: WORD_BYTES * 8,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, b256};

    const FIVE_ETHER: &str = "5000000000000000000";

    #[test]
    fn test_encoded_leaf_layout() {
        let who = address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        let entry = WhitelistEntry::parse(&who.to_string(), FIVE_ETHER).unwrap();
        let bytes = entry.encode();

        assert_eq!(
            hex::encode(bytes.as_bytes()),
            "000000000000000000000000f39fd6e51aad88f6f4ce6ab8827279cfffb92266\
             0000000000000000000000000000000000000000000000004563918244f40000"
        );
        assert_eq!(
            entry.leaf_hash(),
            b256!("cfe765c6c6d04fbfc5be17feecb6b091cac7f0d026d780ceba35ca3f054c04a6")
        );
    }

    #[test]
    fn test_raw_encode_matches_typed_encode() {
        let who = Address::repeat_byte(0xAB);
        let amount = U256::from(1000u64);
        let raw = encode(who.as_slice(), &1000u64.to_be_bytes()).unwrap();
        assert_eq!(raw, encode_leaf(&who, &amount));
    }

    #[test]
    fn test_raw_encode_left_pads() {
        let raw = encode(&[0x01], &[0x02]).unwrap();
        let bytes = raw.as_bytes();
        assert_eq!(bytes[31], 0x01);
        assert_eq!(bytes[63], 0x02);
        assert!(bytes[..31].iter().all(|b| *b == 0));
        assert!(bytes[32..63].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_raw_encode_rejects_wide_identifier() {
        let err = encode(&[0u8; 21], &[1]).unwrap_err();
        assert_eq!(
            err,
            WhitelistError::EncodingOverflow {
                field: "identifier",
                bits: 160
            }
        );
    }

    #[test]
    fn test_raw_encode_rejects_wide_amount() {
        let err = encode(&[0u8; 20], &[1u8; 33]).unwrap_err();
        assert_eq!(
            err,
            WhitelistError::EncodingOverflow {
                field: "amount",
                bits: 256
            }
        );
    }

    #[test]
    fn test_identifier_is_right_aligned_in_its_word() {
        // Leading zero bytes are padding; a trailing zero byte is not.
        let a = encode(&[0x01, 0x00], &[0x00]).unwrap();
        let b = encode(&[0x01], &[0x00, 0x00]).unwrap();
        let c = encode(&[0x00, 0x01], &[0x00]).unwrap();
        assert_ne!(a, c);
        assert_eq!(b, c);
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn test_from_bytes_round_trips_entry() {
        let entry = WhitelistEntry::from_bytes(&[0xAA; 20], &[0x01, 0x00]).unwrap();
        assert_eq!(entry.address, Address::repeat_byte(0xAA));
        assert_eq!(entry.amount, U256::from(256u64));
    }

    #[test]
    fn test_parse_amount_decimal_and_hex() {
        assert_eq!(parse_amount("1000").unwrap(), U256::from(1000u64));
        assert_eq!(parse_amount("0x3e8").unwrap(), U256::from(1000u64));
        assert_eq!(
            parse_amount(FIVE_ETHER).unwrap(),
            U256::from(5_000_000_000_000_000_000u64)
        );
    }

    #[test]
    fn test_parse_amount_max_fits() {
        let max = U256::MAX.to_string();
        assert_eq!(parse_amount(&max).unwrap(), U256::MAX);
    }

    #[test]
    fn test_parse_amount_overflow() {
        // 2^256
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert_eq!(
            parse_amount(too_big).unwrap_err(),
            WhitelistError::EncodingOverflow {
                field: "amount",
                bits: 256
            }
        );
    }

    #[test]
    fn test_parse_amount_rejects_garbage() {
        assert!(matches!(
            parse_amount("5 ether"),
            Err(WhitelistError::InvalidAmount(_))
        ));
        assert!(matches!(parse_amount(""), Err(WhitelistError::InvalidAmount(_))));
        assert!(matches!(parse_amount("-1"), Err(WhitelistError::InvalidAmount(_))));
    }

    #[test]
    fn test_parse_address_widths() {
        assert!(parse_address("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").is_ok());
        assert!(parse_address("70997970C51812dc3A010C7d01b50e0d17dc79C8").is_ok());
        assert_eq!(
            parse_address("0x0070997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap_err(),
            WhitelistError::EncodingOverflow {
                field: "identifier",
                bits: 160
            }
        );
        assert!(matches!(
            parse_address("0x7099"),
            Err(WhitelistError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            parse_address("0xnothex"),
            Err(WhitelistError::InvalidIdentifier(_))
        ));
    }
}
