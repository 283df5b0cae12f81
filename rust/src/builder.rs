//! Assembling a field-value model back into cron expression text.
//!
//! The exact inverse of the field grammar. No validation happens here: a
//! caller building an expression interactively re-feeds the result through
//! [`crate::cron::parse`] for a live validity and description preview.

use crate::cron::CronFormat;
use crate::field::FieldValue;

/// Serialize field values into an expression, padded with wildcards or
/// truncated to the format's field count, joined with single spaces.
pub fn build(values: &[FieldValue], format: CronFormat) -> String {
    (0..format.field_count())
        .map(|i| {
            values
                .get(i)
                .cloned()
                .unwrap_or(FieldValue::Wildcard)
                .to_token()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The all-wildcard starting model for a builder UI.
pub fn default_field_values(format: CronFormat) -> Vec<FieldValue> {
    vec![FieldValue::Wildcard; format.field_count()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cron::{ParseOptions, parse};

    #[test]
    fn test_default_values_build_wildcard_expressions() {
        assert_eq!(
            build(&default_field_values(CronFormat::FiveField), CronFormat::FiveField),
            "* * * * *"
        );
        assert_eq!(
            build(&default_field_values(CronFormat::SixField), CronFormat::SixField),
            "* * * * * *"
        );
    }

    #[test]
    fn test_build_serializes_each_field() {
        let values = vec![
            FieldValue::Specific { value: 30 },
            FieldValue::Range { start: 9, end: 17 },
            FieldValue::Wildcard,
            FieldValue::List { values: vec![1, 6] },
            FieldValue::Step { step: 2 },
        ];
        assert_eq!(build(&values, CronFormat::FiveField), "30 9-17 * 1,6 */2");
    }

    #[test]
    fn test_build_pads_and_truncates() {
        let short = vec![FieldValue::Specific { value: 5 }];
        assert_eq!(build(&short, CronFormat::FiveField), "5 * * * *");

        let long = vec![FieldValue::Wildcard; 9];
        assert_eq!(build(&long, CronFormat::FiveField), "* * * * *");
    }

    #[test]
    fn test_built_expressions_re_parse_valid() {
        let models: Vec<Vec<FieldValue>> = vec![
            default_field_values(CronFormat::FiveField),
            vec![
                FieldValue::Step { step: 15 },
                FieldValue::Range { start: 8, end: 18 },
                FieldValue::Wildcard,
                FieldValue::Wildcard,
                FieldValue::RangeStep {
                    start: 1,
                    end: 5,
                    step: 2,
                },
            ],
            vec![
                FieldValue::Specific { value: 0 },
                FieldValue::List {
                    values: vec![0, 15, 30, 45],
                },
                FieldValue::Specific { value: 12 },
                FieldValue::Specific { value: 1 },
                FieldValue::Specific { value: 6 },
            ],
        ];

        for model in models {
            let expr = build(&model, CronFormat::FiveField);
            let result = parse(&expr, &ParseOptions::default());
            assert!(result.valid, "built expression '{}' did not re-parse", expr);
        }
    }

    #[test]
    fn test_six_field_round_trip() {
        let mut model = default_field_values(CronFormat::SixField);
        model[0] = FieldValue::Step { step: 30 };
        let expr = build(&model, CronFormat::SixField);
        assert_eq!(expr, "*/30 * * * * *");
        assert!(parse(&expr, &ParseOptions::default()).valid);
    }
}
