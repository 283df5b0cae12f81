//! Identifier generation: UUID v4, UUID v7 and ULID.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::codec;

/// Most identifiers produced by a single request.
pub const MAX_COUNT: usize = 100;

/// The generatable identifier kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    UuidV4,
    UuidV7,
    Ulid,
}

/// Output formatting for generated identifiers.
///
/// `hyphens` controls the 8-4-4-4-12 grouping of UUIDs and is ignored for
/// ULIDs, which never carry hyphens. `uppercase` is a final whole-string
/// transform; when unset the canonical case is kept (lowercase UUID,
/// uppercase ULID).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    pub uppercase: bool,
    pub hyphens: bool,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            uppercase: false,
            hyphens: true,
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn format_uuid(canonical: String, options: &FormatOptions) -> String {
    let mut out = if options.hyphens {
        canonical
    } else {
        canonical.chars().filter(|&c| c != '-').collect()
    };
    if options.uppercase {
        out = out.to_uppercase();
    }
    out
}

/// Generate `count` identifiers of the requested type.
///
/// `count` is clamped to `[1, 100]` rather than rejected. UUID v4 delegates
/// to the `uuid` crate's CSPRNG-backed constructor; UUID v7 and ULID sample
/// the wall clock once per identifier and draw fresh random bytes.
pub fn generate(ty: IdType, count: usize, options: &FormatOptions) -> Vec<String> {
    let count = count.clamp(1, MAX_COUNT);

    (0..count)
        .map(|_| match ty {
            IdType::UuidV4 => format_uuid(Uuid::new_v4().to_string(), options),
            IdType::UuidV7 => {
                let random: [u8; 10] = rand::random();
                format_uuid(codec::encode_uuid_v7(now_ms(), &random), options)
            }
            IdType::Ulid => {
                let random: [u8; 10] = rand::random();
                let ulid = codec::encode_ulid(now_ms(), &random);
                // Canonical ULID is already uppercase; the hyphen flag is
                // ignored entirely.
                ulid
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CROCKFORD_ALPHABET, IdKind, decode_uuid_v7_timestamp, detect};

    #[test]
    fn test_count_clamping() {
        let opts = FormatOptions::default();
        assert_eq!(generate(IdType::UuidV4, 0, &opts).len(), 1);
        assert_eq!(generate(IdType::UuidV4, 500, &opts).len(), 100);
        assert_eq!(generate(IdType::Ulid, 7, &opts).len(), 7);
    }

    #[test]
    fn test_uuid_shape_with_hyphens() {
        let opts = FormatOptions::default();
        for id in generate(IdType::UuidV7, 5, &opts) {
            assert_eq!(id.len(), 36);
            for pos in [8, 13, 18, 23] {
                assert_eq!(id.as_bytes()[pos], b'-');
            }
            assert_eq!(detect(&id), IdKind::UuidV7);
        }
    }

    #[test]
    fn test_uuid_shape_without_hyphens() {
        let opts = FormatOptions {
            uppercase: false,
            hyphens: false,
        };
        for id in generate(IdType::UuidV4, 3, &opts) {
            assert_eq!(id.len(), 32);
            assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_uppercase_option() {
        let opts = FormatOptions {
            uppercase: true,
            hyphens: true,
        };
        let id = &generate(IdType::UuidV4, 1, &opts)[0];
        assert_eq!(*id, id.to_uppercase());
    }

    #[test]
    fn test_ulid_shape_ignores_hyphen_option() {
        let opts = FormatOptions {
            uppercase: false,
            hyphens: false,
        };
        for id in generate(IdType::Ulid, 5, &opts) {
            assert_eq!(id.len(), 26);
            assert!(id.bytes().all(|b| CROCKFORD_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_uuid_v4_version_nibble() {
        let id = &generate(IdType::UuidV4, 1, &FormatOptions::default())[0];
        assert_eq!(id.as_bytes()[14], b'4');
    }

    #[test]
    fn test_generated_v7_timestamp_is_recent() {
        let before = now_ms();
        let id = &generate(IdType::UuidV7, 1, &FormatOptions::default())[0];
        let after = now_ms();
        let embedded = decode_uuid_v7_timestamp(id).unwrap();
        assert!(embedded >= before && embedded <= after);
    }
}
