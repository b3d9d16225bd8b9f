//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the matching library
//! without calling an LLM, a process database or an LCA engine.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::{ChatError, MatchError, Result};
use crate::pipeline::query::WildcardQuery;
use crate::traits::{
    chat::{ChatModel, ChatPrompt},
    database::ProcessDatabase,
    engine::LcaEngine,
};
use crate::types::{
    candidate::{Candidate, FunctionalUnit, ProcessRecord},
    method::ImpactMethod,
};

/// A mock chat backend.
///
/// Replies are chosen by substring match on the user prompt, first
/// registered wins. Without a match the default reply is returned, or an
/// empty string when none is set.
#[derive(Default)]
pub struct MockChat {
    /// (needle, reply) pairs
    replies: Arc<RwLock<Vec<(String, String)>>>,

    /// Prompts containing one of these fail
    failures: Arc<RwLock<Vec<String>>>,

    default_reply: Option<String>,

    /// Every call fails
    fail_all: bool,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<ChatPrompt>>>,
}

impl MockChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `reply` when the user prompt contains `needle`.
    pub fn with_reply(self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.replies
            .write()
            .unwrap()
            .push((needle.into(), reply.into()));
        self
    }

    /// Reply used when no needle matches.
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = Some(reply.into());
        self
    }

    /// Fail every call with a backend error.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Fail calls whose user prompt contains `needle`.
    pub fn failing_when(self, needle: impl Into<String>) -> Self {
        self.failures.write().unwrap().push(needle.into());
        self
    }

    /// Get all prompts sent to this mock.
    pub fn calls(&self) -> Vec<ChatPrompt> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, prompt: &ChatPrompt) -> std::result::Result<String, ChatError> {
        self.calls.write().unwrap().push(prompt.clone());

        let fails = self.fail_all
            || self
                .failures
                .read()
                .unwrap()
                .iter()
                .any(|needle| prompt.user.contains(needle.as_str()));
        if fails {
            return Err(ChatError::Backend("mock chat failure".into()));
        }

        let reply = self
            .replies
            .read()
            .unwrap()
            .iter()
            .find(|(needle, _)| prompt.user.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone());

        Ok(reply
            .or_else(|| self.default_reply.clone())
            .unwrap_or_default())
    }
}

/// A mock process database.
///
/// Search results are registered per (needle, location): a search returns
/// the candidates of every entry whose needle appears in the query's text
/// form (e.g. `*waste* *graphite*`) and whose location is equal.
#[derive(Default)]
pub struct MockDatabase {
    candidates: Arc<RwLock<Vec<(String, String, Vec<Candidate>)>>>,
    processes: Arc<RwLock<Vec<ProcessRecord>>>,
    fail_all: bool,

    /// (query, location) of every search
    searches: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `candidates` for searches in `location` whose query contains `needle`.
    pub fn with_candidates_when(
        self,
        needle: impl Into<String>,
        location: impl Into<String>,
        candidates: Vec<Candidate>,
    ) -> Self {
        self.candidates
            .write()
            .unwrap()
            .push((needle.into(), location.into(), candidates));
        self
    }

    /// Add a process record for exact lookups.
    pub fn with_process(self, record: ProcessRecord) -> Self {
        self.processes.write().unwrap().push(record);
        self
    }

    /// Fail every call with a database error.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Get every (query, location) searched so far.
    pub fn searches(&self) -> Vec<(String, String)> {
        self.searches.read().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.fail_all {
            Err(MatchError::Database("mock database failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProcessDatabase for MockDatabase {
    async fn search(
        &self,
        query: &WildcardQuery,
        location: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>> {
        let text = query.to_string();
        self.searches
            .write()
            .unwrap()
            .push((text.clone(), location.to_string()));
        self.check()?;

        let mut hits: Vec<Candidate> = self
            .candidates
            .read()
            .unwrap()
            .iter()
            .filter(|(needle, loc, _)| text.contains(needle.as_str()) && loc == location)
            .flat_map(|(_, _, candidates)| candidates.iter().cloned())
            .collect();
        hits.truncate(limit);
        Ok(hits)
    }

    async fn processes(&self) -> Result<Vec<ProcessRecord>> {
        self.check()?;
        Ok(self.processes.read().unwrap().clone())
    }
}

/// A mock LCA engine.
///
/// Scores come from per-method overrides, then the default score (0 unless
/// set).
#[derive(Default)]
pub struct MockEngine {
    default_score: f64,
    scores: Arc<RwLock<HashMap<ImpactMethod, f64>>>,
    fail_all: bool,
    calls: Arc<RwLock<Vec<(FunctionalUnit, ImpactMethod)>>>,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_score(mut self, score: f64) -> Self {
        self.default_score = score;
        self
    }

    /// Return `score` for `method`.
    pub fn with_score(self, method: &ImpactMethod, score: f64) -> Self {
        self.scores.write().unwrap().insert(method.clone(), score);
        self
    }

    /// Fail every call with an engine error.
    pub fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    /// Get every (functional unit, method) scored so far.
    pub fn calls(&self) -> Vec<(FunctionalUnit, ImpactMethod)> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl LcaEngine for MockEngine {
    async fn score(&self, unit: &FunctionalUnit, method: &ImpactMethod) -> Result<f64> {
        self.calls
            .write()
            .unwrap()
            .push((unit.clone(), method.clone()));

        if self.fail_all {
            return Err(MatchError::Engine("mock engine failure".into()));
        }

        Ok(self
            .scores
            .read()
            .unwrap()
            .get(method)
            .copied()
            .unwrap_or(self.default_score))
    }
}
