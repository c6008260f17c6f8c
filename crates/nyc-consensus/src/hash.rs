//! Hash type and SHA256 double-hashing helpers.

use sha2::{Digest, Sha256};

/// A 32-byte hash in internal (little-endian) byte order.
pub type Hash256 = [u8; 32];

/// Double SHA256: SHA256(SHA256(data)).
///
/// This is the block identity hash committed to by merge-mining proofs.
#[inline]
pub fn double_sha256(data: &[u8]) -> Hash256 {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Reverse the byte order of a 32-byte array.
///
/// Hashes are displayed in reverse byte order.
#[inline]
pub fn reverse_bytes(bytes: &Hash256) -> Hash256 {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Convert a hash to its display format (reversed, lowercase hex).
pub fn hash_to_display_hex(hash: &Hash256) -> String {
    hex::encode(reverse_bytes(hash))
}

/// Parse a display-format hex string into internal byte order.
pub fn hash_from_display_hex(display: &str) -> Result<Hash256, hex::FromHexError> {
    let mut bytes = [0u8; 32];
    hex::decode_to_slice(display, &mut bytes)?;
    Ok(reverse_bytes(&bytes))
}
