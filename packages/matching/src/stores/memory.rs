//! In-memory process database.

use async_trait::async_trait;
use std::sync::RwLock;

use crate::error::Result;
use crate::pipeline::query::WildcardQuery;
use crate::stores::snapshot::DatabaseSnapshot;
use crate::traits::database::ProcessDatabase;
use crate::types::candidate::{Candidate, ProcessRecord};

/// Process database held in memory, usually loaded from a snapshot.
///
/// Search matches the wildcard query against process names and keeps
/// insertion order.
pub struct MemoryDatabase {
    name: String,
    records: RwLock<Vec<ProcessRecord>>,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDatabase {
    /// Create a new empty database.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn from_records(records: Vec<ProcessRecord>) -> Self {
        Self {
            name: String::new(),
            records: RwLock::new(records),
        }
    }

    pub fn from_snapshot(snapshot: DatabaseSnapshot) -> Self {
        Self {
            name: snapshot.name,
            records: RwLock::new(snapshot.processes),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a record.
    pub fn insert(&self, record: ProcessRecord) {
        self.records.write().unwrap().push(record);
    }

    /// Get the number of stored records.
    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProcessDatabase for MemoryDatabase {
    async fn search(
        &self,
        query: &WildcardQuery,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.location == location && query.matches(&r.name))
            .take(limit)
            .map(Candidate::from)
            .collect())
    }

    async fn processes(&self) -> Result<Vec<ProcessRecord>> {
        Ok(self.records.read().unwrap().clone())
    }

    async fn find_exact(&self, name: &str, location: &str) -> Result<Vec<ProcessRecord>> {
        let records = self.records.read().unwrap();
        Ok(records
            .iter()
            .filter(|r| r.name == name && r.location == location)
            .cloned()
            .collect())
    }
}
