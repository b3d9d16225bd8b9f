//! LCA engine over stored characterization results.
//!
//! Scores are looked up from each process record's per-method scores. The
//! two calculation phases are kept apart: [`FactorEngine::lci`] resolves the
//! functional unit into an inventory, then [`FactorEngine::lcia`]
//! characterizes that inventory for one method.

use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;

use crate::error::{MatchError, Result};
use crate::stores::snapshot::DatabaseSnapshot;
use crate::traits::engine::LcaEngine;
use crate::types::candidate::{FunctionalUnit, ProcessRecord};
use crate::types::method::ImpactMethod;

/// Failures inside the factor engine.
#[derive(Debug, Error)]
pub enum FactorError {
    #[error("unknown process '{0}'")]
    UnknownProcess(String),

    #[error("no factor for method {method} on process '{process}'")]
    MissingFactor { process: String, method: String },
}

impl From<FactorError> for MatchError {
    fn from(e: FactorError) -> Self {
        MatchError::Engine(Box::new(e))
    }
}

/// Result of the inventory phase.
#[derive(Debug, Clone, PartialEq)]
pub struct Inventory {
    pub process_key: String,
    pub amount: f64,
}

/// Engine that multiplies stored per-unit scores by the functional unit.
#[derive(Debug, Clone, Default)]
pub struct FactorEngine {
    factors: HashMap<String, HashMap<String, f64>>,
}

impl FactorEngine {
    pub fn from_records(records: &[ProcessRecord]) -> Self {
        Self {
            factors: records
                .iter()
                .map(|r| (r.key.clone(), r.scores.clone()))
                .collect(),
        }
    }

    pub fn from_snapshot(snapshot: &DatabaseSnapshot) -> Self {
        Self::from_records(&snapshot.processes)
    }

    /// Inventory phase.
    pub fn lci(&self, unit: &FunctionalUnit) -> std::result::Result<Inventory, FactorError> {
        if !self.factors.contains_key(&unit.process_key) {
            return Err(FactorError::UnknownProcess(unit.process_key.clone()));
        }
        Ok(Inventory {
            process_key: unit.process_key.clone(),
            amount: unit.amount,
        })
    }

    /// Characterization phase. Requires a completed inventory.
    pub fn lcia(
        &self,
        inventory: &Inventory,
        method: &ImpactMethod,
    ) -> std::result::Result<f64, FactorError> {
        let factor = self
            .factors
            .get(&inventory.process_key)
            .and_then(|scores| scores.get(&method.key()))
            .ok_or_else(|| FactorError::MissingFactor {
                process: inventory.process_key.clone(),
                method: method.to_string(),
            })?;
        Ok(factor * inventory.amount)
    }
}

#[async_trait]
impl LcaEngine for FactorEngine {
    async fn score(&self, unit: &FunctionalUnit, method: &ImpactMethod) -> Result<f64> {
        let inventory = self.lci(unit)?;
        Ok(self.lcia(&inventory, method)?)
    }
}
