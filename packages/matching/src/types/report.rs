//! Per-row outcome report for a run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::flow::CandidateSource;
use crate::types::method::ImpactMethod;

/// A method that produced no value for a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedMethod {
    pub method: ImpactMethod,
    pub reason: String,
}

/// Latest known state of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RowOutcome {
    /// Selection produced a label (possibly empty).
    Resolved {
        label: String,
        source: CandidateSource,
        candidate_count: usize,
    },
    /// The selection backend failed.
    SelectionFailed { error: String },
    /// The label could not be split into three fields.
    ParseFailed { label: String, reason: String },
    /// No process matched name and location exactly.
    NoMatch { process_name: String, location: String },
    /// At least one impact column was filled.
    Evaluated {
        columns: usize,
        skipped: Vec<SkippedMethod>,
    },
    /// A process matched but every method was skipped.
    NoImpacts { skipped: Vec<SkippedMethod> },
}

impl RowOutcome {
    /// True for outcomes that remove the row from the output table.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::SelectionFailed { .. }
                | Self::ParseFailed { .. }
                | Self::NoMatch { .. }
                | Self::NoImpacts { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowReport {
    pub row: usize,
    pub activity: String,
    pub outcome: RowOutcome,
}

/// Outcomes of every row in one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub rows: Vec<RowReport>,
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

impl BatchReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            rows: Vec::new(),
        }
    }

    /// Record the outcome of a row, replacing what an earlier stage recorded.
    ///
    /// `rows` stays sorted by row index; rows arriving in order are appended.
    pub fn record(&mut self, row: usize, activity: &str, outcome: RowOutcome) {
        match self.rows.binary_search_by_key(&row, |r| r.row) {
            Ok(i) => self.rows[i].outcome = outcome,
            Err(i) => self.rows.insert(
                i,
                RowReport {
                    row,
                    activity: activity.to_string(),
                    outcome,
                },
            ),
        }
    }

    pub fn outcome(&self, row: usize) -> Option<&RowOutcome> {
        self.rows
            .binary_search_by_key(&row, |r| r.row)
            .ok()
            .map(|i| &self.rows[i].outcome)
    }

    /// Rows whose latest outcome is a failure.
    pub fn failures(&self) -> impl Iterator<Item = &RowReport> {
        self.rows.iter().filter(|r| r.outcome.is_failure())
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }

    /// Rows that got a non-empty label from the selection step.
    pub fn labelled_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|r| match &r.outcome {
                RowOutcome::Resolved { label, .. } => !label.is_empty(),
                RowOutcome::SelectionFailed { .. } => false,
                RowOutcome::ParseFailed { label, .. } => !label.is_empty(),
                _ => true,
            })
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(label: &str) -> RowOutcome {
        RowOutcome::Resolved {
            label: label.to_string(),
            source: CandidateSource::Direct,
            candidate_count: 1,
        }
    }

    #[test]
    fn test_record_replaces_earlier_stage() {
        let mut report = BatchReport::new();
        report.record(0, "graphite", resolved("graphite production, GLO, kg"));
        report.record(
            0,
            "graphite",
            RowOutcome::NoMatch {
                process_name: "graphite production".to_string(),
                location: "GLO".to_string(),
            },
        );

        assert_eq!(report.rows.len(), 1);
        assert!(matches!(report.outcome(0), Some(RowOutcome::NoMatch { .. })));
        assert_eq!(report.failure_count(), 1);
    }

    #[test]
    fn test_rows_stay_sorted() {
        let mut report = BatchReport::new();
        report.record(2, "c", resolved("x, GLO, kg"));
        report.record(0, "a", resolved("y, GLO, kg"));
        report.record(1, "b", RowOutcome::SelectionFailed { error: "timeout".into() });

        let rows: Vec<_> = report.rows.iter().map(|r| r.row).collect();
        assert_eq!(rows, vec![0, 1, 2]);
        assert_eq!(report.labelled_count(), 2);
    }

    #[test]
    fn test_large_batch_records_and_updates_by_row() {
        let mut report = BatchReport::new();
        for row in 0..5_000 {
            report.record(row, "flow", resolved("x, GLO, kg"));
        }
        for row in (0..5_000).step_by(2) {
            report.record(row, "flow", RowOutcome::SelectionFailed { error: "timeout".into() });
        }

        assert_eq!(report.rows.len(), 5_000);
        assert_eq!(report.failure_count(), 2_500);
        assert!(matches!(report.outcome(4_998), Some(RowOutcome::SelectionFailed { .. })));
        assert!(matches!(report.outcome(4_999), Some(RowOutcome::Resolved { .. })));
        assert!(report.outcome(5_000).is_none());
    }

    #[test]
    fn test_empty_label_is_not_counted() {
        let mut report = BatchReport::new();
        report.record(0, "a", resolved(""));
        assert_eq!(report.labelled_count(), 0);
        assert_eq!(report.failure_count(), 0);
    }
}
