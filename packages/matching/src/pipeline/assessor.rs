//! The Assessor - main entry point for the matching library.
//!
//! Owns the collaborators and runs the stages in order:
//! search-and-select, label parsing, then impact evaluation.

use tracing::info;

use crate::error::Result;
use crate::pipeline::evaluate::ImpactEvaluator;
use crate::pipeline::parse::parse_resolved;
use crate::pipeline::select::LabelSelector;
use crate::pipeline::workflow::SearchWorkflow;
use crate::traits::{chat::ChatModel, database::ProcessDatabase, engine::LcaEngine};
use crate::types::{
    config::MatchConfig,
    flow::{AssessedFlow, FlowRecord, ParsedFlow, ResolvedFlow},
    report::BatchReport,
};

/// Result of search, selection and parsing.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Every row that got a label, including empty and unparseable ones.
    pub resolved: Vec<ResolvedFlow>,
    /// Rows whose label split into process, location and unit.
    pub parsed: Vec<ParsedFlow>,
    pub report: BatchReport,
}

/// Result of the full pipeline.
#[derive(Debug, Clone)]
pub struct Assessment {
    /// Rows with at least one impact value, in input order.
    pub assessed: Vec<AssessedFlow>,
    pub report: BatchReport,
}

/// Matches flows to processes and scores their impacts.
///
/// # Example
///
/// ```rust,ignore
/// let assessor = Assessor::new(database, engine, chat, selector, MatchConfig::default());
///
/// let flows = read_flows("inventory.csv", &assessor.config().columns, None)?;
/// let assessment = assessor.assess(&flows).await?;
/// println!("{} rows assessed", assessment.assessed.len());
/// ```
pub struct Assessor<D, E, C, S> {
    database: D,
    engine: E,
    chat: C,
    selector: S,
    config: MatchConfig,
}

impl<D, E, C, S> Assessor<D, E, C, S>
where
    D: ProcessDatabase,
    E: LcaEngine,
    C: ChatModel,
    S: LabelSelector,
{
    pub fn new(database: D, engine: E, chat: C, selector: S, config: MatchConfig) -> Self {
        Self {
            database,
            engine,
            chat,
            selector,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    fn workflow(&self) -> SearchWorkflow<'_, D, C, S> {
        SearchWorkflow::new(&self.database, &self.chat, &self.selector, &self.config)
    }

    /// Search, select and parse every row.
    pub async fn match_flows(&self, flows: &[FlowRecord]) -> Result<MatchOutcome> {
        let mut report = BatchReport::new();
        info!(run_id = %report.run_id, rows = flows.len(), "Starting flow matching");

        let resolved = self.workflow().run_with_report(flows, &mut report).await?;
        let parsed = parse_resolved(resolved.clone(), &mut report);

        Ok(MatchOutcome {
            resolved,
            parsed,
            report,
        })
    }

    /// Run every stage and return the rows with impact values.
    pub async fn assess(&self, flows: &[FlowRecord]) -> Result<Assessment> {
        let MatchOutcome {
            parsed, mut report, ..
        } = self.match_flows(flows).await?;

        let evaluator = ImpactEvaluator::new(&self.database, &self.engine, &self.config.methods);
        let assessed = evaluator.evaluate(parsed, &mut report).await?;

        info!(
            run_id = %report.run_id,
            assessed = assessed.len(),
            failed = report.failure_count(),
            "Assessment complete"
        );
        Ok(Assessment { assessed, report })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::rank::RankingSelector;
    use crate::testing::{MockChat, MockDatabase, MockEngine};
    use crate::types::candidate::{Candidate, ProcessRecord};
    use crate::types::method::ImpactCategory;
    use crate::types::report::RowOutcome;

    #[tokio::test]
    async fn test_assess_runs_every_stage() {
        let db = MockDatabase::new()
            .with_candidates_when("copper", "GLO", vec![Candidate::new("market for copper", "GLO", "kg")])
            .with_process(ProcessRecord::new("cu", "market for copper", "GLO", "kg"));
        let assessor = Assessor::new(
            db,
            MockEngine::new().with_default_score(2.0),
            MockChat::new(),
            RankingSelector,
            MatchConfig::default(),
        );

        let assessment = assessor
            .assess(&[FlowRecord::new(0, "Copper", 3.0), FlowRecord::new(1, "copper", 0.0)])
            .await
            .unwrap();

        assert_eq!(assessment.assessed.len(), 2);
        assert_eq!(assessment.assessed[0].impacts.get(ImpactCategory::Gwp), Some(6.0));
        assert_eq!(assessment.assessed[1].impacts.get(ImpactCategory::Gwp), Some(0.0));
        assert_eq!(assessment.report.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_match_flows_keeps_unparseable_rows_in_resolved() {
        let assessor = Assessor::new(
            MockDatabase::new(),
            MockEngine::new(),
            MockChat::new().failing(),
            RankingSelector,
            MatchConfig::default(),
        );

        let outcome = assessor
            .match_flows(&[FlowRecord::new(0, "unobtainium", 1.0)])
            .await
            .unwrap();

        assert_eq!(outcome.resolved.len(), 1);
        assert!(outcome.parsed.is_empty());
        assert!(matches!(
            outcome.report.outcome(0),
            Some(RowOutcome::ParseFailed { .. })
        ));
    }
}
