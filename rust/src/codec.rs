//! Bit-level encoding and decoding for UUID v7 and ULID.
//!
//! Layouts:
//!
//! ```text
//! UUID v7 ::= ts48 | ver4(=7) | rand12 | var2(=10) | rand62   (36-char hex form)
//! ULID    ::= ts48 | rand80                                   (26-char Crockford base32)
//! ```
//!
//! Encoding here is purely structural. Version/variant nibbles are checked
//! only by [`detect`]; the timestamp decoders are deliberately permissive so
//! that classification and decoding stay separate concerns.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Crockford's base32 alphabet. Excludes I, L, O and U.
pub const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Largest value representable in the 48-bit timestamp field.
pub const MAX_TIMESTAMP_48: u64 = (1 << 48) - 1;

/// Errors from the timestamp decoders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    #[error("identifier too short: need at least {expected} characters, got {got}")]
    TooShort { expected: usize, got: usize },
    #[error("'{0}' is not a hexadecimal digit")]
    InvalidHexDigit(char),
    #[error("'{0}' is not a Crockford base32 character")]
    InvalidBase32Char(char),
}

/// Identifier classification produced by [`detect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    UuidV4,
    UuidV7,
    Ulid,
    Invalid,
}

static ULID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-HJKMNP-TV-Za-hjkmnp-tv-z]{26}$").unwrap());

static UUID_HYPHENATED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

static UUID_BARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9a-fA-F]{32}$").unwrap());

/// Encode a UUID v7 from a millisecond timestamp and 10 random bytes.
///
/// The timestamp occupies bytes 0..6 big-endian; values above 2^48 - 1 are
/// truncated (overflow in the year ~10889). The version nibble of byte 6 and
/// the variant bits of byte 8 are forced; all other random bits pass through.
pub fn encode_uuid_v7(timestamp_ms: u64, random: &[u8; 10]) -> String {
    let ts = timestamp_ms & MAX_TIMESTAMP_48;
    let mut bytes = [0u8; 16];
    bytes[..6].copy_from_slice(&ts.to_be_bytes()[2..]);
    bytes[6..].copy_from_slice(random);
    bytes[6] = 0x70 | (bytes[6] & 0x0F);
    bytes[8] = 0x80 | (bytes[8] & 0x3F);

    let hex = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..]
    )
}

/// Encode a ULID from a millisecond timestamp and 10 random bytes.
///
/// Produces exactly 26 uppercase Crockford characters: 10 for the 48-bit
/// timestamp (most-significant digit first), 16 for the 80 random bits.
pub fn encode_ulid(timestamp_ms: u64, random: &[u8; 10]) -> String {
    let ts = (timestamp_ms & MAX_TIMESTAMP_48) as u128;
    let mut rand_bits: u128 = 0;
    for &b in random {
        rand_bits = (rand_bits << 8) | u128::from(b);
    }
    let value = (ts << 80) | rand_bits;

    let mut out = String::with_capacity(26);
    for i in (0..26).rev() {
        let digit = ((value >> (5 * i)) & 0x1F) as usize;
        out.push(CROCKFORD_ALPHABET[digit] as char);
    }
    out
}

/// Decode the embedded millisecond timestamp of a UUID v7 string.
///
/// Strips hyphens and reads the first 12 hex digits as a big-endian unsigned
/// 48-bit integer. Version and variant bits are not checked here.
pub fn decode_uuid_v7_timestamp(text: &str) -> Result<u64, IdError> {
    let digits: Vec<char> = text.chars().filter(|&c| c != '-').collect();
    if digits.len() < 12 {
        return Err(IdError::TooShort {
            expected: 12,
            got: digits.len(),
        });
    }

    let mut ts: u64 = 0;
    for &c in &digits[..12] {
        let digit = c.to_digit(16).ok_or(IdError::InvalidHexDigit(c))?;
        ts = (ts << 4) | u64::from(digit);
    }
    Ok(ts)
}

/// Decode the embedded millisecond timestamp of a ULID string.
///
/// Reads the first 10 characters against the Crockford alphabet,
/// case-insensitively, 5 bits per character, most-significant first.
/// Any out-of-alphabet character is a hard error.
pub fn decode_ulid_timestamp(text: &str) -> Result<u64, IdError> {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() < 10 {
        return Err(IdError::TooShort {
            expected: 10,
            got: chars.len(),
        });
    }

    let mut ts: u64 = 0;
    for &c in &chars[..10] {
        let digit = crockford_value(c).ok_or(IdError::InvalidBase32Char(c))?;
        ts = (ts << 5) | u64::from(digit);
    }
    Ok(ts)
}

fn crockford_value(c: char) -> Option<u8> {
    let upper = c.to_ascii_uppercase();
    CROCKFORD_ALPHABET
        .iter()
        .position(|&a| a == upper as u8)
        .map(|p| p as u8)
}

/// Classify identifier text by surface syntax.
///
/// Order matters: 26 Crockford characters win over everything else, then
/// 32 hex digits (bare or standard-hyphenated) are inspected for their
/// version nibble. Versions other than 4 and 7 classify as invalid since
/// no other version embeds a recoverable timestamp.
pub fn detect(text: &str) -> IdKind {
    if ULID_PATTERN.is_match(text) {
        return IdKind::Ulid;
    }

    if UUID_HYPHENATED.is_match(text) || UUID_BARE.is_match(text) {
        let bare: String = text.chars().filter(|&c| c != '-').collect();
        return match bare.as_bytes()[12] {
            b'7' => IdKind::UuidV7,
            b'4' => IdKind::UuidV4,
            _ => IdKind::Invalid,
        };
    }

    IdKind::Invalid
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANDOM: [u8; 10] = [0xab, 0xcd, 0xef, 0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd];

    #[test]
    fn test_uuid_v7_shape() {
        let s = encode_uuid_v7(0x018f_6b1a_7c3d, &RANDOM);
        assert_eq!(s.len(), 36);
        for pos in [8, 13, 18, 23] {
            assert_eq!(s.as_bytes()[pos], b'-');
        }
        assert_eq!(s.as_bytes()[14], b'7');
        let variant = s.chars().nth(19).unwrap().to_digit(16).unwrap();
        assert_eq!(variant & 0b1100, 0b1000);
        assert!(s.chars().all(|c| c == '-' || c.is_ascii_hexdigit()));
        assert_eq!(s, s.to_lowercase());
    }

    #[test]
    fn test_uuid_v7_timestamp_round_trip() {
        for ts in [0, 1, 0x018f_6b1a_7c3d, MAX_TIMESTAMP_48] {
            let s = encode_uuid_v7(ts, &RANDOM);
            assert_eq!(decode_uuid_v7_timestamp(&s).unwrap(), ts);
        }
    }

    #[test]
    fn test_uuid_v7_timestamp_truncates_past_48_bits() {
        let s = encode_uuid_v7(u64::MAX, &RANDOM);
        assert_eq!(decode_uuid_v7_timestamp(&s).unwrap(), MAX_TIMESTAMP_48);
    }

    #[test]
    fn test_ulid_shape() {
        let s = encode_ulid(0x018f_6b1a_7c3d, &RANDOM);
        assert_eq!(s.len(), 26);
        assert!(
            s.bytes()
                .all(|b| CROCKFORD_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_ulid_timestamp_round_trip() {
        for ts in [0, 1, 0x018f_6b1a_7c3d, MAX_TIMESTAMP_48] {
            let s = encode_ulid(ts, &RANDOM);
            assert_eq!(decode_ulid_timestamp(&s).unwrap(), ts);
        }
    }

    #[test]
    fn test_ulid_matches_reference_implementation() {
        let ts = 1_715_000_000_123u64;
        let mut rand_bits: u128 = 0;
        for &b in &RANDOM {
            rand_bits = (rand_bits << 8) | u128::from(b);
        }
        let reference = ulid::Ulid::from_parts(ts, rand_bits).to_string();
        assert_eq!(encode_ulid(ts, &RANDOM), reference);
    }

    #[test]
    fn test_ulid_decode_matches_reference_implementation() {
        let reference = ulid::Ulid::from_parts(1_715_000_000_123, 42);
        let decoded = decode_ulid_timestamp(&reference.to_string()).unwrap();
        assert_eq!(decoded, reference.timestamp_ms());
    }

    #[test]
    fn test_ulid_decode_case_insensitive() {
        let s = encode_ulid(0x018f_6b1a_7c3d, &RANDOM);
        assert_eq!(
            decode_ulid_timestamp(&s.to_lowercase()).unwrap(),
            0x018f_6b1a_7c3d
        );
    }

    #[test]
    fn test_decode_rejects_bad_characters() {
        assert!(matches!(
            decode_ulid_timestamp("0IARZ3NDEKTSV4RRFFQ69G5FAV"),
            Err(IdError::InvalidBase32Char('I'))
        ));
        assert!(matches!(
            decode_uuid_v7_timestamp("018f6b1a-7c3g-7000-8000-123456789abc"),
            Err(IdError::InvalidHexDigit('g'))
        ));
        assert!(matches!(
            decode_ulid_timestamp("01ARZ"),
            Err(IdError::TooShort { expected: 10, .. })
        ));
        assert!(matches!(
            decode_uuid_v7_timestamp("018f6b1a"),
            Err(IdError::TooShort { expected: 12, .. })
        ));
    }

    #[test]
    fn test_detect_all_kinds() {
        assert_eq!(detect("550e8400-e29b-41d4-a716-446655440000"), IdKind::UuidV4);
        assert_eq!(detect("018f6b1a-7c3d-7000-8000-123456789abc"), IdKind::UuidV7);
        assert_eq!(detect("01ARZ3NDEKTSV4RRFFQ69G5FAV"), IdKind::Ulid);
        assert_eq!(detect("not-a-valid-id"), IdKind::Invalid);
    }

    #[test]
    fn test_detect_bare_hex_and_case() {
        assert_eq!(detect("018f6b1a7c3d70008000123456789abc"), IdKind::UuidV7);
        assert_eq!(detect("550E8400E29B41D4A716446655440000"), IdKind::UuidV4);
        assert_eq!(detect("01arz3ndektsv4rrffq69g5fav"), IdKind::Ulid);
    }

    #[test]
    fn test_detect_rejects_other_uuid_versions() {
        // Version 1 UUIDs carry a timestamp, but not as a plain prefix.
        assert_eq!(detect("c232ab00-9414-11ec-b3c8-9f68deced846"), IdKind::Invalid);
    }

    #[test]
    fn test_detect_rejects_nonstandard_hyphens() {
        assert_eq!(detect("018f6b1a7c3d-7000-8000-1234-56789abc"), IdKind::Invalid);
    }
}
