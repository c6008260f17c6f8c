//! Hex seed extraction for the legacy subsidy generator.

use crate::error::{ConsensusError, ConsensusResult};

/// Result of parsing text that contains a non-hex character.
pub const INVALID_SEED: i64 = -1;

const fn build_hex_table() -> [i8; 256] {
    let mut table = [-1i8; 256];
    let mut i = 0;
    while i < 10 {
        table[b'0' as usize + i] = i as i8;
        i += 1;
    }
    let mut i = 0;
    while i < 6 {
        table[b'a' as usize + i] = 10 + i as i8;
        table[b'A' as usize + i] = 10 + i as i8;
        i += 1;
    }
    table
}

static HEX_TABLE: [i8; 256] = build_hex_table();

/// Parse hex text into a signed 64-bit value.
///
/// Digits are shifted in four bits at a time. The first invalid character
/// turns the result into [`INVALID_SEED`] and parsing stops; so does a
/// value that has wrapped negative. Empty input gives 0.
pub fn parse_hex_seed(text: &str) -> i64 {
    let mut ret: i64 = 0;
    for byte in text.bytes() {
        if ret < 0 {
            break;
        }
        ret = match HEX_TABLE[byte as usize] {
            -1 => INVALID_SEED,
            digit => (ret << 4) | digit as i64,
        };
    }
    ret
}

/// Strict variant of [`parse_hex_seed`] for callers that must reject bad
/// input. Returns the value truncated to 32 bits, as fed to the generator.
pub fn try_parse_hex_seed(text: &str) -> ConsensusResult<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ConsensusError::ParseError {
            input: text.to_string(),
        });
    }
    Ok(parse_hex_seed(text) as u32)
}

/// Seed for the generator: hex of `len` characters at `offset` in
/// `display_hex`, truncated to 32 bits.
///
/// A window running past the end of the text is cut short.
pub fn seed_from_display_hex(display_hex: &str, offset: usize, len: usize) -> u32 {
    let start = offset.min(display_hex.len());
    let end = offset.saturating_add(len).min(display_hex.len());
    let window = display_hex.get(start..end).unwrap_or("");
    parse_hex_seed(window) as u32
}
