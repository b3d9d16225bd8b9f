//! Impact evaluation of parsed flows.
//!
//! Each row is looked up by exact process name and location. The first match
//! is scored once per method for one unit of the process, and the score times
//! the row's quantity lands in the method's column.

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::traits::{database::ProcessDatabase, engine::LcaEngine};
use crate::types::{
    candidate::FunctionalUnit,
    flow::{AssessedFlow, ParsedFlow},
    method::{ImpactCategory, ImpactMethod, ImpactValues},
    report::{BatchReport, RowOutcome, SkippedMethod},
};

/// Scores parsed flows against a set of impact methods.
pub struct ImpactEvaluator<'a, D: ?Sized, E: ?Sized> {
    database: &'a D,
    engine: &'a E,
    methods: &'a [ImpactMethod],
}

impl<'a, D, E> ImpactEvaluator<'a, D, E>
where
    D: ProcessDatabase + ?Sized,
    E: LcaEngine + ?Sized,
{
    pub fn new(database: &'a D, engine: &'a E, methods: &'a [ImpactMethod]) -> Self {
        Self {
            database,
            engine,
            methods,
        }
    }

    /// Evaluate one row.
    ///
    /// `Ok(None)` when no process matches exactly. Otherwise the values that
    /// could be computed along with the methods that were skipped.
    pub async fn evaluate_flow(
        &self,
        parsed: &ParsedFlow,
    ) -> Result<Option<(ImpactValues, Vec<SkippedMethod>)>> {
        let matches = self
            .database
            .find_exact(&parsed.process.process_name, &parsed.process.location)
            .await?;

        let Some(record) = matches.first() else {
            return Ok(None);
        };
        if matches.len() > 1 {
            debug!(row = parsed.flow.row, count = matches.len(), key = %record.key, "Several exact matches, using the first");
        }

        let unit = FunctionalUnit::unit_of(record);
        let mut values = ImpactValues::new();
        let mut skipped = Vec::new();

        for method in self.methods {
            let Some(category) = ImpactCategory::route(method) else {
                debug!(%method, "Method does not map to an impact column");
                continue;
            };

            match self.engine.score(&unit, method).await {
                Ok(score) if score.is_finite() => {
                    values.set(category, score * parsed.flow.quantity);
                }
                Ok(score) => {
                    warn!(row = parsed.flow.row, %method, score, "Non-finite score, skipping column");
                    skipped.push(SkippedMethod {
                        method: method.clone(),
                        reason: format!("non-finite score {}", score),
                    });
                }
                Err(e) => {
                    warn!(row = parsed.flow.row, %method, error = %e, "Scoring failed, skipping column");
                    skipped.push(SkippedMethod {
                        method: method.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(Some((values, skipped)))
    }

    /// Evaluate every row, keeping those with at least one impact value.
    pub async fn evaluate(
        &self,
        parsed: Vec<ParsedFlow>,
        report: &mut BatchReport,
    ) -> Result<Vec<AssessedFlow>> {
        let total = parsed.len();
        let mut assessed = Vec::with_capacity(total);

        for item in parsed {
            let row = item.flow.row;
            match self.evaluate_flow(&item).await? {
                None => {
                    info!(
                        row,
                        process = %item.process.process_name,
                        location = %item.process.location,
                        "No matching process found"
                    );
                    report.record(
                        row,
                        &item.flow.activity,
                        RowOutcome::NoMatch {
                            process_name: item.process.process_name.clone(),
                            location: item.process.location.clone(),
                        },
                    );
                }
                Some((impacts, skipped)) if impacts.is_empty() => {
                    warn!(row, "No impact values computed, dropping row");
                    report.record(row, &item.flow.activity, RowOutcome::NoImpacts { skipped });
                }
                Some((impacts, skipped)) => {
                    report.record(
                        row,
                        &item.flow.activity,
                        RowOutcome::Evaluated {
                            columns: impacts.len(),
                            skipped,
                        },
                    );
                    assessed.push(AssessedFlow {
                        flow: item.flow,
                        process: item.process,
                        impacts,
                    });
                }
            }
        }

        info!(rows = total, assessed = assessed.len(), "Impact evaluation complete");
        Ok(assessed)
    }
}
