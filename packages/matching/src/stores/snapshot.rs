//! JSON snapshots of a process database.
//!
//! A snapshot holds the process records with their characterized scores, so
//! the same file backs both [`MemoryDatabase`](super::MemoryDatabase) and
//! [`FactorEngine`](super::FactorEngine).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::Result;
use crate::types::candidate::ProcessRecord;

/// Serialized form of a process database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    /// Database name, e.g. "ecoinvent-3.9.1-cutoff".
    #[serde(default)]
    pub name: String,
    pub processes: Vec<ProcessRecord>,
}

impl DatabaseSnapshot {
    pub fn new(name: impl Into<String>, processes: Vec<ProcessRecord>) -> Self {
        Self {
            name: name.into(),
            processes,
        }
    }

    /// Read a snapshot from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let snapshot: Self = serde_json::from_str(&content)?;
        info!(
            path = %path.display(),
            name = %snapshot.name,
            processes = snapshot.processes.len(),
            "Loaded database snapshot"
        );
        Ok(snapshot)
    }

    /// Write the snapshot as pretty-printed JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
