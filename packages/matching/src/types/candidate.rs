//! Search results and process records from the process database.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One search hit proposed as a possible match for a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub unit: String,
}

impl Candidate {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            unit: unit.into(),
        }
    }

    /// `name, location, unit`: the literal label the selector must echo back.
    pub fn label(&self) -> String {
        format!("{}, {}, {}", self.name, self.location, self.unit)
    }
}

impl From<&ProcessRecord> for Candidate {
    fn from(record: &ProcessRecord) -> Self {
        Self::new(&record.name, &record.location, &record.unit)
    }
}

/// An activity stored in the process database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
    /// Stable identifier used to build functional units.
    pub key: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub unit: String,

    /// Characterized score per unit of this process, keyed by
    /// [`ImpactMethod::key`](crate::types::method::ImpactMethod::key).
    #[serde(default)]
    pub scores: HashMap<String, f64>,
}

impl ProcessRecord {
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        location: impl Into<String>,
        unit: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            location: location.into(),
            unit: unit.into(),
            scores: HashMap::new(),
        }
    }

    /// Add a score for a method key.
    pub fn with_score(mut self, method_key: impl Into<String>, score: f64) -> Self {
        self.scores.insert(method_key.into(), score);
        self
    }
}

/// "How much of which process" to score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionalUnit {
    pub process_key: String,
    pub amount: f64,
}

impl FunctionalUnit {
    /// One unit of the given process.
    pub fn unit_of(record: &ProcessRecord) -> Self {
        Self {
            process_key: record.key.clone(),
            amount: 1.0,
        }
    }
}
