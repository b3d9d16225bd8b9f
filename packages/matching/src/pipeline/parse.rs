//! Splitting selected labels into process, location and unit.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::ParseFailure;
use crate::types::flow::{ParsedFlow, ParsedLabel, ResolvedFlow};
use crate::types::report::{BatchReport, RowOutcome};

lazy_static! {
    // Anything that cannot appear in a dataset label
    static ref STRAY_CHARS: Regex = Regex::new(r"[^\w\s,/%\-]").unwrap();
}

fn strip_bullet(s: &str) -> &str {
    s.trim_start_matches(['-', ' ']).trim()
}

/// Remove stray punctuation and any leading bullet from a label.
pub fn clean_label(label: &str) -> String {
    let cleaned = STRAY_CHARS.replace_all(label, "");
    strip_bullet(&cleaned).to_string()
}

/// Split `"name, location, unit"` into its three fields.
///
/// The two rightmost commas separate the fields, so process names may
/// themselves contain commas.
pub fn parse_label(row: usize, label: &str) -> Result<ParsedLabel, ParseFailure> {
    let fail = |reason: &str| ParseFailure {
        row,
        label: label.to_string(),
        reason: reason.to_string(),
    };

    let cleaned = clean_label(label);
    let (prefix, unit) = cleaned
        .rsplit_once(',')
        .ok_or_else(|| fail("expected two commas, found none"))?;
    let (process_name, location) = strip_bullet(prefix)
        .rsplit_once(',')
        .ok_or_else(|| fail("expected two commas, found one"))?;

    let parsed = ParsedLabel {
        process_name: process_name.trim().to_string(),
        location: location.trim().to_string(),
        unit: unit.trim().to_string(),
    };

    if parsed.process_name.is_empty() {
        return Err(fail("empty process name"));
    }
    if parsed.location.is_empty() {
        return Err(fail("empty location"));
    }
    if parsed.unit.is_empty() {
        return Err(fail("empty unit"));
    }
    Ok(parsed)
}

/// Parse every resolved row, recording failures and keeping the rest.
pub fn parse_resolved(resolved: Vec<ResolvedFlow>, report: &mut BatchReport) -> Vec<ParsedFlow> {
    let mut parsed = Vec::with_capacity(resolved.len());

    for item in resolved {
        match parse_label(item.flow.row, item.label.as_str()) {
            Ok(process) => {
                debug!(
                    row = item.flow.row,
                    process = %process.process_name,
                    location = %process.location,
                    unit = %process.unit,
                    "Parsed label"
                );
                parsed.push(ParsedFlow {
                    flow: item.flow,
                    process,
                });
            }
            Err(e) => {
                warn!(error = %e, "Dropping row with unparseable label");
                report.record(
                    item.flow.row,
                    &item.flow.activity,
                    RowOutcome::ParseFailed {
                        label: e.label,
                        reason: e.reason,
                    },
                );
            }
        }
    }

    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::flow::{CandidateSource, FlowRecord, SelectedLabel};

    #[test]
    fn test_parse_bulleted_label() {
        let parsed = parse_label(0, "- some process, GLO, kg").unwrap();
        assert_eq!(parsed.process_name, "some process");
        assert_eq!(parsed.location, "GLO");
        assert_eq!(parsed.unit, "kg");
    }

    #[test]
    fn test_commas_in_process_name_are_kept() {
        let parsed =
            parse_label(3, "market group for electricity, medium voltage, RER, kilowatt hour").unwrap();
        assert_eq!(parsed.process_name, "market group for electricity, medium voltage");
        assert_eq!(parsed.location, "RER");
        assert_eq!(parsed.unit, "kilowatt hour");
    }

    #[test]
    fn test_stray_characters_removed() {
        assert_eq!(clean_label("'treatment of waste graphite, GLO, kg'."), "treatment of waste graphite, GLO, kg");

        let parsed = parse_label(0, "\"steel (low-alloyed), RoW, kg\"").unwrap();
        assert_eq!(parsed.process_name, "steel low-alloyed");
        assert_eq!(parsed.location, "RoW");
    }

    #[test]
    fn test_percent_and_slash_survive() {
        let parsed = parse_label(0, "ethanol, 95% in H2O/denatured, GLO, kg").unwrap();
        assert_eq!(parsed.process_name, "ethanol, 95% in H2O/denatured");
    }

    #[test]
    fn test_fewer_than_two_commas_fails() {
        let err = parse_label(7, "my process location RER p").unwrap_err();
        assert_eq!(err.row, 7);
        assert_eq!(err.label, "my process location RER p");

        assert!(parse_label(7, "my process, RER").is_err());
        assert!(parse_label(7, "").is_err());
    }

    #[test]
    fn test_empty_field_fails() {
        assert!(parse_label(0, ", GLO, kg").is_err());
        assert!(parse_label(0, "process, , kg").is_err());
        assert!(parse_label(0, "process, GLO,").is_err());
    }

    #[test]
    fn test_parse_resolved_records_failures() {
        let resolved = |row: usize, label: &str| ResolvedFlow {
            flow: FlowRecord::new(row, format!("flow {}", row), 1.0),
            label: SelectedLabel::new(label),
            source: CandidateSource::Direct,
            candidate_count: 1,
        };
        let mut report = BatchReport::new();

        let parsed = parse_resolved(
            vec![resolved(0, "my process location, RER, p"), resolved(1, "I cannot decide")],
            &mut report,
        );

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].process.process_name, "my process location");
        assert_eq!(parsed[0].process.location, "RER");
        assert_eq!(parsed[0].process.unit, "p");
        assert!(matches!(report.outcome(1), Some(RowOutcome::ParseFailed { .. })));
    }
}
