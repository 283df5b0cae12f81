//! Embedded-timestamp extraction from UUID v7 and ULID text.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::Serialize;

use crate::codec::{self, IdKind};

/// Upper bound for an accepted embedded timestamp: 9999-12-31T23:59:59.999Z.
pub const MAX_TIMESTAMP_MS: u64 = 253_402_300_799_999;

/// Result of [`extract_timestamp`].
///
/// When `valid` is false only `error` is populated. All timestamp
/// representations are present together on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimestampExtraction {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<IdKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iso8601: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TimestampExtraction {
    fn invalid(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            kind: None,
            timestamp_ms: None,
            timestamp_sec: None,
            iso8601: None,
            local: None,
            relative: None,
            error: Some(message.into()),
        }
    }
}

/// Extract the embedded timestamp of a UUID v7 or ULID, relative to now.
pub fn extract_timestamp(text: &str) -> TimestampExtraction {
    extract_timestamp_at(text, Utc::now())
}

/// Extract the embedded timestamp with an explicit reference instant for
/// the relative-time phrase.
pub fn extract_timestamp_at(text: &str, now: DateTime<Utc>) -> TimestampExtraction {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return TimestampExtraction::invalid("please enter a UUID v7 or ULID");
    }

    let kind = codec::detect(trimmed);
    let decoded = match kind {
        IdKind::UuidV7 => codec::decode_uuid_v7_timestamp(trimmed),
        IdKind::Ulid => codec::decode_ulid_timestamp(trimmed),
        IdKind::UuidV4 => {
            return TimestampExtraction::invalid(
                "this is a UUID v4: it is fully random and carries no embedded timestamp",
            );
        }
        IdKind::Invalid => {
            return TimestampExtraction::invalid("not a recognizable UUID v7 or ULID");
        }
    };

    let ms = match decoded {
        Ok(ms) => ms,
        Err(e) => return TimestampExtraction::invalid(e.to_string()),
    };
    if ms > MAX_TIMESTAMP_MS {
        return TimestampExtraction::invalid("timestamp out of valid range");
    }

    let secs = (ms / 1000) as i64;
    let nanos = ((ms % 1000) * 1_000_000) as u32;
    let Some(utc) = Utc.timestamp_opt(secs, nanos).single() else {
        return TimestampExtraction::invalid("timestamp out of valid range");
    };

    TimestampExtraction {
        valid: true,
        kind: Some(kind),
        timestamp_ms: Some(ms),
        timestamp_sec: Some(ms / 1000),
        iso8601: Some(utc.to_rfc3339_opts(SecondsFormat::Millis, true)),
        local: Some(
            utc.with_timezone(&Local)
                .format("%A, %B %-d, %Y, %H:%M:%S")
                .to_string(),
        ),
        relative: Some(relative_phrase(ms, now)),
        error: None,
    }
}

/// Relative-time phrase for an instant: "3 days ago", "in 2 hours",
/// "just now" within 5 seconds. Each coarser unit is the integer quotient
/// of the previous one (weeks = days/7, months = weeks/4, years = months/12).
fn relative_phrase(ms: u64, now: DateTime<Utc>) -> String {
    let diff = ms as i64 - now.timestamp_millis();
    let future = diff > 0;
    let secs = diff.abs() / 1000;

    if secs < 5 {
        return "just now".to_string();
    }

    let minutes = secs / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    let weeks = days / 7;
    let months = weeks / 4;

    let (n, unit) = if secs < 60 {
        (secs, "second")
    } else if minutes < 60 {
        (minutes, "minute")
    } else if hours < 24 {
        (hours, "hour")
    } else if days < 7 {
        (days, "day")
    } else if weeks < 5 {
        (weeks, "week")
    } else if months < 12 {
        (months, "month")
    } else {
        (months / 12, "year")
    };

    let suffix = if n == 1 { "" } else { "s" };
    if future {
        format!("in {} {}{}", n, unit, suffix)
    } else {
        format!("{} {}{} ago", n, unit, suffix)
    }
}
