//! Base-32 geohash alphabet.
//!
//! The order of [`ALPHABET`] is the byte order of the characters, so comparing
//! geohash strings as plain strings orders them by their bit prefixes. Every
//! key-range computation in this crate relies on that.

use crate::error::{GeoScanError, Result};

/// Number of bits carried by one geohash character.
pub const BITS_PER_CHAR: u32 = 5;

/// The standard geohash alphabet, in ascending order.
pub const ALPHABET: &[u8; 32] = b"0123456789bcdefghjkmnpqrstuvwxyz";

/// Marks "every string with this prefix" as the end of a half-open range.
///
/// `~` sorts after every alphabet character and is never a valid symbol.
pub const SENTINEL: char = '~';

const NOT_PRESENT: u8 = u8::MAX;

const DECODE_TABLE: [u8; 128] = {
    let mut table = [NOT_PRESENT; 128];
    let mut i = 0;
    while i < ALPHABET.len() {
        table[ALPHABET[i] as usize] = i as u8;
        i += 1;
    }
    table
};

/// Encode a 5-bit value as its geohash character.
///
/// # Examples
///
/// ```rust
/// use geoscan::base32::encode_symbol;
///
/// assert_eq!(encode_symbol(0)?, '0');
/// assert_eq!(encode_symbol(16)?, 'h');
/// assert!(encode_symbol(32).is_err());
/// # Ok::<(), geoscan::GeoScanError>(())
/// ```
pub fn encode_symbol(value: u8) -> Result<char> {
    ALPHABET
        .get(value as usize)
        .map(|&b| b as char)
        .ok_or(GeoScanError::InvalidSymbolValue(value))
}

/// Decode a geohash character to its 5-bit value.
///
/// Returns `None` for anything outside the alphabet, including [`SENTINEL`].
pub fn decode_symbol(symbol: char) -> Option<u8> {
    if !symbol.is_ascii() {
        return None;
    }
    match DECODE_TABLE[symbol as usize] {
        NOT_PRESENT => None,
        value => Some(value),
    }
}

/// Like [`decode_symbol`], but reports the geohash the symbol came from.
pub fn decode_symbol_checked(geohash: &str, symbol: char) -> Result<u8> {
    decode_symbol(symbol).ok_or_else(|| GeoScanError::InvalidGeohash {
        geohash: geohash.to_string(),
        symbol,
    })
}
