//! Process database trait.
//!
//! Abstracts the LCA process database: a wildcard search filtered by location
//! for finding candidates, and full iteration for exact lookups during impact
//! evaluation.

use async_trait::async_trait;

use crate::error::Result;
use crate::pipeline::query::WildcardQuery;
use crate::types::candidate::{Candidate, ProcessRecord};

#[async_trait]
pub trait ProcessDatabase: Send + Sync {
    /// Search for processes matching `query` in one location.
    ///
    /// Returns at most `limit` candidates.
    async fn search(
        &self,
        query: &WildcardQuery,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>>;

    /// Every process record, in the database's iteration order.
    async fn processes(&self) -> Result<Vec<ProcessRecord>>;

    /// Records whose name and location are exactly equal to the arguments.
    ///
    /// Case-sensitive, no wildcards. Order follows [`processes`](Self::processes).
    async fn find_exact(&self, name: &str, location: &str) -> Result<Vec<ProcessRecord>> {
        // Default implementation scans every record
        Ok(self
            .processes()
            .await?
            .into_iter()
            .filter(|p| p.name == name && p.location == location)
            .collect())
    }
}
