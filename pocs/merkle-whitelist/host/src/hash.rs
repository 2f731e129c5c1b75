//! The one hash function of the scheme: keccak-256.
//!
//! Leaves and internal nodes both go through [`hash`].

use alloy_primitives::{keccak256, B256};

/// keccak-256 of arbitrary bytes.
pub fn hash(data: &[u8]) -> B256 {
    keccak256(data)
}

/// Internal node: `keccak256(min(a, b) || max(a, b))`.
///
/// `B256` orders bytewise, which is the unsigned big-endian order of the two
/// hashes, so a sibling's side never needs to be recorded in a proof.
pub fn hash_sorted_pair(a: &B256, b: &B256) -> B256 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(lo.as_slice());
    buf[32..].copy_from_slice(hi.as_slice());
    hash(&buf)
}
