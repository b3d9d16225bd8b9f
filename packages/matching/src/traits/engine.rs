//! LCA engine trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::candidate::FunctionalUnit;
use crate::types::method::ImpactMethod;

/// Scores a functional unit against one impact method.
///
/// Implementations run the inventory phase before characterization and
/// return the resulting score. A non-finite score is returned as-is; callers
/// decide what to do with it.
#[async_trait]
pub trait LcaEngine: Send + Sync {
    async fn score(&self, unit: &FunctionalUnit, method: &ImpactMethod) -> Result<f64>;
}
