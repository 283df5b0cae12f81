//! Cron expression engine: format detection, validation, human-readable
//! description and next-run computation.
//!
//! Accepts the 5-field format (`minute hour day-of-month month day-of-week`),
//! the 6-field format with a leading seconds field, and the `@` special
//! strings. `@reboot` is valid but deliberately non-schedulable.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::field::{self, FIELDS_5, FIELDS_6, FieldSpec, FieldValue};

/// Special-string alias table. `None` marks `@reboot`, which has no
/// periodic expansion.
pub const SPECIAL_STRINGS: &[(&str, Option<&str>)] = &[
    ("@yearly", Some("0 0 1 1 *")),
    ("@annually", Some("0 0 1 1 *")),
    ("@monthly", Some("0 0 1 * *")),
    ("@weekly", Some("0 0 * * 0")),
    ("@daily", Some("0 0 * * *")),
    ("@midnight", Some("0 0 * * *")),
    ("@hourly", Some("0 * * * *")),
    ("@reboot", None),
];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Detected expression format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CronFormat {
    #[serde(rename = "5-field")]
    FiveField,
    #[serde(rename = "6-field")]
    SixField,
}

impl CronFormat {
    pub fn field_count(self) -> usize {
        match self {
            Self::FiveField => 5,
            Self::SixField => 6,
        }
    }

    pub fn specs(self) -> &'static [FieldSpec] {
        match self {
            Self::FiveField => &FIELDS_5,
            Self::SixField => &FIELDS_6,
        }
    }
}

/// Options for [`parse`].
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// How many future fire times to compute. The UI offers 1/3/5/10/15/20.
    pub next_run_count: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { next_run_count: 5 }
    }
}

/// Outcome of parsing a cron expression.
#[derive(Debug, Clone, Serialize)]
pub struct CronParseResult {
    pub valid: bool,
    pub format: CronFormat,
    pub is_special_string: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub next_runs: Vec<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub normalized_expression: Option<String>,
}

impl CronParseResult {
    fn invalid(format: CronFormat, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            format,
            is_special_string: false,
            description: None,
            error: Some(message.into()),
            next_runs: Vec::new(),
            normalized_expression: None,
        }
    }
}

/// Parse and evaluate a cron expression against the current instant.
pub fn parse(expr: &str, options: &ParseOptions) -> CronParseResult {
    parse_at(expr, options, Utc::now())
}

/// Parse and evaluate a cron expression against an explicit reference
/// instant. All computed fire times are strictly after `reference`.
pub fn parse_at(expr: &str, options: &ParseOptions, reference: DateTime<Utc>) -> CronParseResult {
    let trimmed = expr.trim();
    if trimmed.is_empty() {
        return CronParseResult::invalid(CronFormat::FiveField, "cron expression is empty");
    }

    if trimmed.starts_with('@') {
        let lower = trimmed.to_ascii_lowercase();
        let Some(&(canonical, expansion)) =
            SPECIAL_STRINGS.iter().find(|(name, _)| *name == lower)
        else {
            return CronParseResult::invalid(
                CronFormat::FiveField,
                format!("unrecognized special string '{}'", trimmed),
            );
        };

        let Some(expanded) = expansion else {
            // @reboot runs at startup only; there is nothing to schedule.
            return CronParseResult {
                valid: true,
                format: CronFormat::FiveField,
                is_special_string: true,
                description: Some(describe_special(canonical)),
                error: None,
                next_runs: Vec::new(),
                normalized_expression: None,
            };
        };

        let mut result = parse_standard(expanded, options, reference);
        result.is_special_string = true;
        result.description = Some(describe_special(canonical));
        return result;
    }

    parse_standard(trimmed, options, reference)
}

/// Expand a special string to its canonical 5-field form. `@reboot` has none.
pub fn expand_special(name: &str) -> Option<&'static str> {
    let lower = name.trim().to_ascii_lowercase();
    SPECIAL_STRINGS
        .iter()
        .find(|(alias, _)| *alias == lower)
        .and_then(|(_, expansion)| *expansion)
}

fn parse_standard(expr: &str, options: &ParseOptions, reference: DateTime<Utc>) -> CronParseResult {
    let tokens: Vec<&str> = expr.split_whitespace().collect();
    let format = if tokens.len() >= 6 {
        CronFormat::SixField
    } else {
        CronFormat::FiveField
    };
    let specs = format.specs();

    if tokens.len() != specs.len() {
        return CronParseResult::invalid(
            format,
            format!("expected {} fields, got {}", specs.len(), tokens.len()),
        );
    }

    let mut values = Vec::with_capacity(specs.len());
    for (token, spec) in tokens.iter().copied().zip(specs) {
        match field::parse_field(token, spec) {
            Ok(value) => values.push(value),
            Err(e) => return CronParseResult::invalid(format, e.to_string()),
        }
    }

    let normalized = match format {
        CronFormat::FiveField => format!("0 {}", tokens.join(" ")),
        CronFormat::SixField => tokens.join(" "),
    };

    let schedule = Schedule::new(&values, format);
    let next_runs = schedule.next_runs(reference, options.next_run_count);

    CronParseResult {
        valid: true,
        format,
        is_special_string: false,
        description: Some(describe(&values, format)),
        error: None,
        next_runs,
        normalized_expression: Some(normalized),
    }
}

// ---------------------------------------------------------------------------
// Schedule iteration

/// Expanded value sets for one schedule, always in 6-field form
/// (5-field expressions get a fixed `0` seconds set).
struct Schedule {
    seconds: Vec<u32>,
    minutes: Vec<u32>,
    hours: Vec<u32>,
    days: Vec<u32>,
    months: Vec<u32>,
    weekdays: Vec<u32>,
    dom_restricted: bool,
    dow_restricted: bool,
}

/// First value >= `current`, or the first value with a wrap marker.
fn next_value(values: &[u32], current: u32) -> (u32, bool) {
    for &v in values {
        if v >= current {
            return (v, false);
        }
    }
    (values[0], true)
}

impl Schedule {
    fn new(values: &[FieldValue], format: CronFormat) -> Self {
        let (seconds, rest) = match format {
            CronFormat::FiveField => (vec![0], values),
            CronFormat::SixField => (values[0].expand(&field::SECOND), &values[1..]),
        };

        Self {
            seconds,
            minutes: rest[0].expand(&field::MINUTE),
            hours: rest[1].expand(&field::HOUR),
            days: rest[2].expand(&field::DAY_OF_MONTH),
            months: rest[3].expand(&field::MONTH),
            weekdays: rest[4].expand(&field::DAY_OF_WEEK),
            dom_restricted: !rest[2].is_wildcard(),
            dow_restricted: !rest[4].is_wildcard(),
        }
    }

    /// Classic cron day matching: when both day-of-month and day-of-week are
    /// restricted, a day fires if it satisfies either one (OR semantics).
    fn matches_day(&self, t: DateTime<Utc>) -> bool {
        let dom = self.days.contains(&t.day());
        let dow = self.weekdays.contains(&t.weekday().num_days_from_sunday());
        match (self.dom_restricted, self.dow_restricted) {
            (false, false) => true,
            (true, false) => dom,
            (false, true) => dow,
            (true, true) => dom || dow,
        }
    }

    fn next_runs(&self, reference: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
        let mut runs = Vec::with_capacity(count);
        let mut cursor = reference;
        while runs.len() < count {
            match self.next_after(cursor) {
                Some(t) => {
                    cursor = t;
                    runs.push(t);
                }
                None => break,
            }
        }
        runs
    }

    /// Next instant strictly after `after` matching every field, searching a
    /// bounded window (a schedule that cannot fire within ~5 years, like
    /// February 30th, yields nothing).
    fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut current = (after + Duration::seconds(1)).with_nanosecond(0)?;
        let deadline = after + Duration::days(366 * 5);

        while current <= deadline {
            if !self.months.contains(&current.month()) {
                let (next_month, wrapped) = next_value(&self.months, current.month());
                let year = current.year() + i32::from(wrapped);
                current = Utc.with_ymd_and_hms(year, next_month, 1, 0, 0, 0).single()?;
                continue;
            }

            if !self.matches_day(current) {
                current = (current + Duration::days(1))
                    .with_hour(0)?
                    .with_minute(0)?
                    .with_second(0)?;
                continue;
            }

            if !self.hours.contains(&current.hour()) {
                let (next_hour, wrapped) = next_value(&self.hours, current.hour());
                if wrapped {
                    current = (current + Duration::days(1))
                        .with_hour(0)?
                        .with_minute(0)?
                        .with_second(0)?;
                } else {
                    current = current
                        .with_hour(next_hour)?
                        .with_minute(0)?
                        .with_second(0)?;
                }
                continue;
            }

            if !self.minutes.contains(&current.minute()) {
                let (next_minute, wrapped) = next_value(&self.minutes, current.minute());
                if wrapped {
                    current = (current + Duration::hours(1))
                        .with_minute(0)?
                        .with_second(0)?;
                } else {
                    current = current.with_minute(next_minute)?.with_second(0)?;
                }
                continue;
            }

            if !self.seconds.contains(&current.second()) {
                let (next_second, wrapped) = next_value(&self.seconds, current.second());
                if wrapped {
                    current = (current + Duration::minutes(1)).with_second(0)?;
                } else {
                    current = current.with_second(next_second)?;
                }
                continue;
            }

            return Some(current);
        }

        None
    }
}

// ---------------------------------------------------------------------------
// Description

fn describe_special(canonical: &str) -> String {
    match canonical {
        "@yearly" | "@annually" => "At 00:00 on January 1st".to_string(),
        "@monthly" => "At 00:00 on day 1 of every month".to_string(),
        "@weekly" => "At 00:00 on Sunday".to_string(),
        "@daily" | "@midnight" => "At 00:00 every day".to_string(),
        "@hourly" => "At minute 0 of every hour".to_string(),
        _ => "At system startup only (no periodic schedule)".to_string(),
    }
}

/// Natural-language sentence for a validated expression. Verbose phrasing
/// that names seconds is used only when a 6-field expression actually
/// constrains them to something other than a fixed `0`.
fn describe(values: &[FieldValue], format: CronFormat) -> String {
    let (seconds, rest) = match format {
        CronFormat::FiveField => (None, values),
        CronFormat::SixField => (Some(&values[0]), &values[1..]),
    };

    let base = describe_base(rest);
    match seconds {
        None | Some(FieldValue::Specific { value: 0 }) => base,
        // "Every minute" adds nothing once seconds drive the cadence.
        Some(sec) if base == "Every minute" => describe_seconds(sec),
        Some(sec) => format!("{}, {}", describe_seconds(sec), decapitalize(&base)),
    }
}

fn describe_seconds(value: &FieldValue) -> String {
    match value {
        FieldValue::Wildcard => "Every second".to_string(),
        FieldValue::Specific { value } => format!("At second {}", value),
        FieldValue::Step { step } => {
            format!("Every {} second{}", step, plural(*step))
        }
        other => format!("At seconds {}", join_values(&other.expand(&field::SECOND))),
    }
}

/// Sentence for the 5-field tail (minute, hour, day-of-month, month,
/// day-of-week), following the common-pattern-first approach.
fn describe_base(v: &[FieldValue]) -> String {
    use FieldValue::{Specific, Step, Wildcard};

    match (&v[0], &v[1], &v[2], &v[3], &v[4]) {
        (Wildcard, Wildcard, Wildcard, Wildcard, Wildcard) => "Every minute".to_string(),
        (Step { step }, Wildcard, Wildcard, Wildcard, Wildcard) => {
            format!("Every {} minute{}", step, plural(*step))
        }
        (Specific { value }, Wildcard, Wildcard, Wildcard, Wildcard) => {
            format!("At minute {} of every hour", value)
        }
        (Specific { value: 0 }, Step { step }, Wildcard, Wildcard, Wildcard) => {
            format!("Every {} hour{}", step, plural(*step))
        }
        (Specific { value: m }, Specific { value: h }, Wildcard, Wildcard, Wildcard) => {
            format!("At {:02}:{:02} every day", h, m)
        }
        (Specific { value: m }, Specific { value: h }, Wildcard, Wildcard, dow) => {
            format!("At {:02}:{:02} on {}", h, m, describe_weekdays(dow))
        }
        (Specific { value: m }, Specific { value: h }, Specific { value: d }, Wildcard, Wildcard) => {
            format!("At {:02}:{:02} on day {} of every month", h, m, d)
        }
        _ => describe_complex(v),
    }
}

fn describe_complex(v: &[FieldValue]) -> String {
    let mut parts: Vec<String> = Vec::new();

    match &v[0] {
        FieldValue::Wildcard => {}
        FieldValue::Specific { value } => parts.push(format!("at minute {}", value)),
        FieldValue::Step { step } => parts.push(format!("every {} minute{}", step, plural(*step))),
        other => parts.push(format!(
            "at minutes {}",
            join_values(&other.expand(&field::MINUTE))
        )),
    }

    match &v[1] {
        FieldValue::Wildcard => {}
        FieldValue::Specific { value } => parts.push(format!("at hour {}", value)),
        FieldValue::Step { step } => parts.push(format!("every {} hour{}", step, plural(*step))),
        other => parts.push(format!(
            "at hours {}",
            join_values(&other.expand(&field::HOUR))
        )),
    }

    if !v[2].is_wildcard() {
        let days = v[2].expand(&field::DAY_OF_MONTH);
        let label = if days.len() == 1 { "day" } else { "days" };
        parts.push(format!("on {} {} of the month", label, join_values(&days)));
    }

    if !v[3].is_wildcard() {
        let months: Vec<&str> = v[3]
            .expand(&field::MONTH)
            .iter()
            .filter_map(|&m| MONTH_NAMES.get(m as usize - 1).copied())
            .collect();
        parts.push(format!("in {}", join_names(&months)));
    }

    if !v[4].is_wildcard() {
        parts.push(format!("on {}", describe_weekdays(&v[4])));
    }

    if parts.is_empty() {
        "Every minute".to_string()
    } else {
        capitalize(&parts.join(", "))
    }
}

fn describe_weekdays(value: &FieldValue) -> String {
    if let FieldValue::Range { start, end } = value
        && let (Some(&a), Some(&b)) = (
            DAY_NAMES.get(*start as usize),
            DAY_NAMES.get(*end as usize),
        )
    {
        return format!("{} through {}", a, b);
    }

    let names: Vec<&str> = value
        .expand(&field::DAY_OF_WEEK)
        .iter()
        .filter_map(|&d| DAY_NAMES.get(d as usize).copied())
        .collect();
    if names.is_empty() {
        "every day".to_string()
    } else {
        join_names(&names)
    }
}

fn join_values(values: &[u32]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_names(names: &[&str]) -> String {
    match names {
        [] => String::new(),
        [only] => (*only).to_string(),
        [rest @ .., last] => format!(
            "{} and {}",
            rest.iter().copied().collect::<Vec<_>>().join(", "),
            last
        ),
    }
}

fn plural(n: u32) -> &'static str {
    if n == 1 { "" } else { "s" }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
