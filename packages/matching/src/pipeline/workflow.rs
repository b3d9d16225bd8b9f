//! Search-and-select workflow.
//!
//! For each row, in order:
//! 1. search every configured location for the activity name
//! 2. if nothing matched and notes refinement is on, search for the row's notes
//! 3. if still nothing, ask for alternative terms and search each in turn,
//!    stopping at the first one with results
//! 4. hand whatever was gathered (possibly nothing) to the selector
//!
//! Rows are processed one after another. A selector failure is recorded on
//! its row and the batch moves on; database failures abort the run.

use tracing::{debug, info, warn};

use crate::error::{Result, SelectionError};
use crate::pipeline::query::{build_query, WildcardQuery};
use crate::pipeline::select::LabelSelector;
use crate::pipeline::suggest::suggest_alternatives;
use crate::traits::{chat::ChatModel, database::ProcessDatabase};
use crate::types::{
    candidate::Candidate,
    config::MatchConfig,
    flow::{CandidateSource, FlowRecord, ResolvedFlow, SelectedLabel},
    report::{BatchReport, RowOutcome},
};

/// Candidates gathered for one row and how they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSet {
    pub source: CandidateSource,
    pub candidates: Vec<Candidate>,
}

/// Output of a search-and-select pass.
#[derive(Debug, Clone)]
pub struct MatchRun {
    /// Rows that received a label, in input order.
    pub resolved: Vec<ResolvedFlow>,
    pub report: BatchReport,
}

/// Per-row search and selection over injected collaborators.
pub struct SearchWorkflow<'a, D: ?Sized, C: ?Sized, S: ?Sized> {
    database: &'a D,
    chat: &'a C,
    selector: &'a S,
    config: &'a MatchConfig,
}

impl<'a, D, C, S> SearchWorkflow<'a, D, C, S>
where
    D: ProcessDatabase + ?Sized,
    C: ChatModel + ?Sized,
    S: LabelSelector + ?Sized,
{
    pub fn new(database: &'a D, chat: &'a C, selector: &'a S, config: &'a MatchConfig) -> Self {
        Self {
            database,
            chat,
            selector,
            config,
        }
    }

    /// Run one search per configured location and concatenate the hits.
    pub async fn search_locations(&self, query: &WildcardQuery) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();
        if query.is_empty() {
            return Ok(candidates);
        }
        for location in &self.config.locations {
            let hits = self
                .database
                .search(query, location, self.config.search_limit)
                .await?;
            debug!(%query, location = %location, hits = hits.len(), "Database search");
            candidates.extend(hits);
        }
        Ok(candidates)
    }

    /// Steps 1 to 3: find something to choose from.
    pub async fn gather_candidates(&self, flow: &FlowRecord) -> Result<CandidateSet> {
        let activity = flow.normalized_activity();

        let direct = self.search_locations(&build_query(&activity)).await?;
        if !direct.is_empty() {
            info!(row = flow.row, activity = %activity, count = direct.len(), "Found matching activities");
            return Ok(CandidateSet {
                source: CandidateSource::Direct,
                candidates: direct,
            });
        }
        info!(row = flow.row, activity = %activity, "No matching activities found");

        let notes = flow
            .notes
            .as_deref()
            .filter(|_| self.config.refine_with_notes);

        if let Some(notes) = notes {
            let refined = self.search_locations(&build_query(notes)).await?;
            if !refined.is_empty() {
                info!(row = flow.row, notes, count = refined.len(), "Found matching activities from notes");
                return Ok(CandidateSet {
                    source: CandidateSource::Notes,
                    candidates: refined,
                });
            }
        }

        let alternatives =
            suggest_alternatives(self.chat, &self.config.suggestion, &activity, notes).await;
        if alternatives.is_empty() {
            info!(row = flow.row, "No alternative search terms received");
        }

        for term in alternatives {
            if term.is_empty() {
                debug!(row = flow.row, "Skipping empty alternative term");
                continue;
            }
            let found = self.search_locations(&build_query(&term)).await?;
            if !found.is_empty() {
                info!(row = flow.row, term = %term, count = found.len(), "Found matching activities for alternative term");
                return Ok(CandidateSet {
                    source: CandidateSource::Alternative(term),
                    candidates: found,
                });
            }
        }

        info!(row = flow.row, activity = %activity, "No matching datasets found after trying alternatives");
        Ok(CandidateSet {
            source: CandidateSource::Exhausted,
            candidates: Vec::new(),
        })
    }

    /// Step 4: let the selector choose a label.
    pub async fn select(
        &self,
        flow: &FlowRecord,
        candidates: &[Candidate],
    ) -> std::result::Result<SelectedLabel, SelectionError> {
        self.selector
            .select(&flow.normalized_activity(), candidates)
            .await
            .map_err(|source| SelectionError::Backend {
                row: flow.row,
                source,
            })
    }

    /// Search and select every row.
    pub async fn run(&self, flows: &[FlowRecord]) -> Result<MatchRun> {
        let mut report = BatchReport::new();
        self.run_with_report(flows, &mut report)
            .await
            .map(|resolved| MatchRun { resolved, report })
    }

    /// Search and select every row, recording outcomes into `report`.
    pub async fn run_with_report(
        &self,
        flows: &[FlowRecord],
        report: &mut BatchReport,
    ) -> Result<Vec<ResolvedFlow>> {
        let mut resolved = Vec::with_capacity(flows.len());

        for flow in flows {
            info!(row = flow.row, activity = %flow.activity, "Processing row");
            let set = self.gather_candidates(flow).await?;

            match self.select(flow, &set.candidates).await {
                Ok(label) => {
                    info!(row = flow.row, label = %label, "Selected dataset");
                    report.record(
                        flow.row,
                        &flow.activity,
                        RowOutcome::Resolved {
                            label: label.to_string(),
                            source: set.source.clone(),
                            candidate_count: set.candidates.len(),
                        },
                    );
                    resolved.push(ResolvedFlow {
                        flow: flow.clone(),
                        label,
                        source: set.source,
                        candidate_count: set.candidates.len(),
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Selection failed, continuing with next row");
                    report.record(
                        flow.row,
                        &flow.activity,
                        RowOutcome::SelectionFailed {
                            error: e.to_string(),
                        },
                    );
                }
            }
        }

        let labelled = resolved.iter().filter(|r| !r.label.is_empty()).count();
        info!(
            rows = flows.len(),
            labelled,
            failed = flows.len() - resolved.len(),
            "Search and selection complete"
        );
        Ok(resolved)
    }
}
