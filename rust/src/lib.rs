//! chronoid: cron expression engine and timestamp-embedded identifier engine.
//!
//! Two subsystems share this crate:
//!
//! - **Cron**: parse and validate 5/6-field cron expressions and the `@`
//!   special strings, describe them in plain English, compute upcoming fire
//!   times, and build expression text back from a field-value model.
//! - **Identifiers**: generate UUID v4, UUID v7 and ULID values, and recover
//!   the millisecond timestamp embedded in the first 48 bits of a UUID v7
//!   or ULID.
//!
//! Every public entry point is a pure, synchronous function that always
//! returns an answer; invalid input comes back as a result value with a
//! message, never a panic.
//!
//! # Example
//!
//! ```
//! use chronoid::{ParseOptions, parse};
//!
//! let result = parse("0 9 * * 1-5", &ParseOptions::default());
//! assert!(result.valid);
//! assert_eq!(result.description.as_deref(), Some("At 09:00 on Monday through Friday"));
//! assert_eq!(result.next_runs.len(), 5);
//! ```

mod builder;
mod codec;
mod cron;
mod extract;
mod field;
mod generator;

pub use builder::{build, default_field_values};
pub use codec::{
    CROCKFORD_ALPHABET, IdError, IdKind, MAX_TIMESTAMP_48, decode_ulid_timestamp,
    decode_uuid_v7_timestamp, detect, encode_ulid, encode_uuid_v7,
};
pub use cron::{
    CronFormat, CronParseResult, ParseOptions, SPECIAL_STRINGS, expand_special, parse, parse_at,
};
pub use extract::{
    MAX_TIMESTAMP_MS, TimestampExtraction, extract_timestamp, extract_timestamp_at,
};
pub use field::{
    DAY_OF_MONTH, DAY_OF_WEEK, FIELDS_5, FIELDS_6, FieldError, FieldSpec, FieldValue, HOUR,
    MINUTE, MONTH, SECOND, parse_field,
};
pub use generator::{FormatOptions, IdType, MAX_COUNT, generate};
