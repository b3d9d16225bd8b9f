//! Flow records and the values each pipeline stage produces from them.

use serde::{Deserialize, Serialize};

use crate::types::method::ImpactValues;

/// One material or energy line item from the input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Zero-based position in the loaded table.
    pub row: usize,

    /// Activity text as it appeared in the table.
    pub activity: String,

    /// Signed amount of the flow (0 when missing or non-numeric).
    pub quantity: f64,

    /// Free-text hint from the optional notes column.
    #[serde(default)]
    pub notes: Option<String>,
}

impl FlowRecord {
    /// Create a new flow record.
    pub fn new(row: usize, activity: impl Into<String>, quantity: f64) -> Self {
        Self {
            row,
            activity: activity.into(),
            quantity,
            notes: None,
        }
    }

    /// Attach a notes hint. Blank notes are treated as absent.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes.trim().to_string())
        };
        self
    }

    /// Trimmed, lower-cased activity name used for searching and prompting.
    pub fn normalized_activity(&self) -> String {
        self.activity.trim().to_lowercase()
    }

    /// Lenient quantity parsing: anything that is not a finite number is 0.
    pub fn parse_quantity(raw: &str) -> f64 {
        raw.trim()
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite())
            .unwrap_or(0.0)
    }
}

/// Raw text chosen by the selection step, accepted verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectedLabel(String);

impl SelectedLabel {
    /// Wrap a reply, trimming surrounding whitespace.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SelectedLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the candidate list for a row came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "term", rename_all = "snake_case")]
pub enum CandidateSource {
    /// The activity name itself matched.
    Direct,
    /// The row's notes matched.
    Notes,
    /// A suggested alternative term matched.
    Alternative(String),
    /// Nothing matched; selection ran with an empty list.
    Exhausted,
}

/// A flow after the search-and-select step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedFlow {
    pub flow: FlowRecord,
    pub label: SelectedLabel,
    pub source: CandidateSource,
    pub candidate_count: usize,
}

/// Process, location and unit recovered from a resolved label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedLabel {
    pub process_name: String,
    pub location: String,
    pub unit: String,
}

/// A flow whose label was parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedFlow {
    pub flow: FlowRecord,
    pub process: ParsedLabel,
}

/// A flow with at least one impact value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedFlow {
    pub flow: FlowRecord,
    pub process: ParsedLabel,
    pub impacts: ImpactValues,
}
