//! Single-field cron grammar: parse, serialize and expand one field token.
//!
//! Token shapes: `*`, `5`, `1-5`, `1,3,5`, `*/5`, `1-10/2`. Month and
//! weekday fields additionally accept their 3-letter names (JAN..DEC,
//! SUN..SAT) anywhere an integer may appear, case-insensitively.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bounds and alias table for one cron field position.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub min: u32,
    pub max: u32,
    /// 3-letter aliases in order; index + `alias_base` is the numeric value.
    pub aliases: &'static [&'static str],
    pub alias_base: u32,
}

const MONTH_ALIASES: &[&str] = &[
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];
const WEEKDAY_ALIASES: &[&str] = &["SUN", "MON", "TUE", "WED", "THU", "FRI", "SAT"];

pub const SECOND: FieldSpec = FieldSpec {
    name: "second",
    min: 0,
    max: 59,
    aliases: &[],
    alias_base: 0,
};
pub const MINUTE: FieldSpec = FieldSpec {
    name: "minute",
    min: 0,
    max: 59,
    aliases: &[],
    alias_base: 0,
};
pub const HOUR: FieldSpec = FieldSpec {
    name: "hour",
    min: 0,
    max: 23,
    aliases: &[],
    alias_base: 0,
};
pub const DAY_OF_MONTH: FieldSpec = FieldSpec {
    name: "day-of-month",
    min: 1,
    max: 31,
    aliases: &[],
    alias_base: 0,
};
pub const MONTH: FieldSpec = FieldSpec {
    name: "month",
    min: 1,
    max: 12,
    aliases: MONTH_ALIASES,
    alias_base: 1,
};
pub const DAY_OF_WEEK: FieldSpec = FieldSpec {
    name: "day-of-week",
    min: 0,
    max: 6,
    aliases: WEEKDAY_ALIASES,
    alias_base: 0,
};

/// Field table for the 5-field format.
pub static FIELDS_5: [FieldSpec; 5] = [MINUTE, HOUR, DAY_OF_MONTH, MONTH, DAY_OF_WEEK];
/// Field table for the 6-field format.
pub static FIELDS_6: [FieldSpec; 6] = [SECOND, MINUTE, HOUR, DAY_OF_MONTH, MONTH, DAY_OF_WEEK];

/// Validation failures for a single field token.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} field is empty")]
    Empty { field: &'static str },
    #[error("{field} value {value} is out of range ({min}-{max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("{field} range '{token}' is malformed")]
    MalformedRange { field: &'static str, token: String },
    #[error("{field} range '{token}' is reversed: start must not exceed end")]
    ReversedRange { field: &'static str, token: String },
    #[error("{field} step must be at least 1, got '{token}'")]
    InvalidStep { field: &'static str, token: String },
    #[error("'{token}' is not a valid {field} value")]
    Unrecognized { field: &'static str, token: String },
}

/// One parsed cron field.
///
/// Serializes back to exactly one of the five token shapes, always with
/// numeric literals (aliases are resolved at parse time and never re-emitted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FieldValue {
    Wildcard,
    Specific { value: u32 },
    Range { start: u32, end: u32 },
    List { values: Vec<u32> },
    Step { step: u32 },
    RangeStep { start: u32, end: u32, step: u32 },
}

impl FieldValue {
    /// Serialize to canonical token text (the exact inverse of `parse_field`).
    pub fn to_token(&self) -> String {
        match self {
            Self::Wildcard => "*".to_string(),
            Self::Specific { value } => value.to_string(),
            Self::Range { start, end } => format!("{}-{}", start, end),
            Self::List { values } => values
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(","),
            Self::Step { step } => format!("*/{}", step),
            Self::RangeStep { start, end, step } => format!("{}-{}/{}", start, end, step),
        }
    }

    /// Enumerate the concrete values this field matches, sorted and deduplicated.
    pub fn expand(&self, spec: &FieldSpec) -> Vec<u32> {
        let mut values: Vec<u32> = match self {
            Self::Wildcard => (spec.min..=spec.max).collect(),
            Self::Specific { value } => vec![*value],
            Self::Range { start, end } => (*start..=*end).collect(),
            Self::List { values } => values.clone(),
            Self::Step { step } => (spec.min..=spec.max)
                .step_by((*step).max(1) as usize)
                .collect(),
            Self::RangeStep { start, end, step } => (*start..=*end)
                .step_by((*step).max(1) as usize)
                .collect(),
        };
        values.sort_unstable();
        values.dedup();
        values
    }

    /// True for the unrestricted field (`*`), which cron's day-matching
    /// rules treat differently from an exhaustive list or range.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }
}

/// Parse one field token against its spec.
pub fn parse_field(token: &str, spec: &FieldSpec) -> Result<FieldValue, FieldError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(FieldError::Empty { field: spec.name });
    }
    if token == "*" {
        return Ok(FieldValue::Wildcard);
    }

    // Step forms: */n and a-b/n.
    if let Some((base, step_str)) = token.split_once('/') {
        let step = parse_step(step_str, spec)?;
        if base == "*" {
            return Ok(FieldValue::Step { step });
        }
        let (start, end) = parse_range(base, spec)?;
        return Ok(FieldValue::RangeStep { start, end, step });
    }

    if token.contains(',') {
        let values = token
            .split(',')
            .map(|part| parse_value(part.trim(), spec))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(FieldValue::List { values });
    }

    if token.contains('-') {
        let (start, end) = parse_range(token, spec)?;
        return Ok(FieldValue::Range { start, end });
    }

    Ok(FieldValue::Specific {
        value: parse_value(token, spec)?,
    })
}

fn parse_step(step_str: &str, spec: &FieldSpec) -> Result<u32, FieldError> {
    // Negative and oversized steps both fail the u32 parse.
    let step: u32 = step_str.parse().map_err(|_| FieldError::InvalidStep {
        field: spec.name,
        token: step_str.to_string(),
    })?;
    if step == 0 {
        return Err(FieldError::InvalidStep {
            field: spec.name,
            token: step_str.to_string(),
        });
    }
    Ok(step)
}

fn parse_range(token: &str, spec: &FieldSpec) -> Result<(u32, u32), FieldError> {
    let Some((start_str, end_str)) = token.split_once('-') else {
        return Err(FieldError::MalformedRange {
            field: spec.name,
            token: token.to_string(),
        });
    };
    let malformed = |_| FieldError::MalformedRange {
        field: spec.name,
        token: token.to_string(),
    };
    let start = parse_value(start_str.trim(), spec).map_err(|e| match e {
        FieldError::OutOfRange { .. } => e,
        _ => malformed(e),
    })?;
    let end = parse_value(end_str.trim(), spec).map_err(|e| match e {
        FieldError::OutOfRange { .. } => e,
        _ => malformed(e),
    })?;
    if start > end {
        return Err(FieldError::ReversedRange {
            field: spec.name,
            token: token.to_string(),
        });
    }
    Ok((start, end))
}

fn parse_value(token: &str, spec: &FieldSpec) -> Result<u32, FieldError> {
    if !spec.aliases.is_empty() {
        let upper = token.to_ascii_uppercase();
        if let Some(idx) = spec.aliases.iter().position(|&a| a == upper) {
            return Ok(spec.alias_base + idx as u32);
        }
    }

    let value: u32 = token.parse().map_err(|_| FieldError::Unrecognized {
        field: spec.name,
        token: token.to_string(),
    })?;
    if value < spec.min || value > spec.max {
        return Err(FieldError::OutOfRange {
            field: spec.name,
            value,
            min: spec.min,
            max: spec.max,
        });
    }
    Ok(value)
}
