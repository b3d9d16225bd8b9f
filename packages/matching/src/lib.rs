//! Flow matching and impact assessment library
//!
//! Maps free-text material and energy flows (e.g. "Waste Graphite", 1.5 kg)
//! onto datasets of an LCA process database, then scores each matched flow
//! against a set of impact methods.
//!
//! # Pipeline
//!
//! 1. **Search**: wildcard search of the database in every configured location
//! 2. **Fallback**: optional notes search, then LLM-suggested alternative terms
//! 3. **Select**: one label chosen among the candidates (LLM or rule-based)
//! 4. **Parse**: label split into process, location and unit
//! 5. **Evaluate**: exact process lookup, one engine call per method, scores
//!    routed into impact columns
//!
//! Row-level failures never abort a run; they are recorded in a
//! [`BatchReport`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use matching::{Assessor, DatabaseSnapshot, FactorEngine, MatchConfig, MemoryDatabase};
//! use matching::{OfflineChat, RankingSelector};
//!
//! let snapshot = DatabaseSnapshot::load("ecoinvent.json")?;
//! let engine = FactorEngine::from_snapshot(&snapshot);
//! let database = MemoryDatabase::from_snapshot(snapshot);
//! let config = MatchConfig::default();
//!
//! let flows = matching::table::read_flows("inventory.csv", &config.columns, None)?;
//! let assessor = Assessor::new(database, engine, OfflineChat, RankingSelector, config);
//! let assessment = assessor.assess(&flows).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (ChatModel, ProcessDatabase, LcaEngine)
//! - [`types`] - Flow, candidate, method and report types
//! - [`pipeline`] - Search, selection, parsing and evaluation
//! - [`stores`] - In-memory database and factor engine
//! - [`table`] - CSV input and output
//! - [`chart`] - Waterfall charts
//! - [`testing`] - Mock implementations for testing

pub mod chart;
pub mod error;
pub mod pipeline;
pub mod stores;
pub mod table;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{ChatError, MatchError, ParseFailure, Result, SelectionError, SuggestionError};
pub use pipeline::{
    build_query, Assessment, Assessor, ChatSelector, LabelSelector, MatchOutcome,
    RankingSelector, SearchWorkflow, WildcardQuery,
};
pub use stores::{DatabaseSnapshot, FactorEngine, MemoryDatabase};
pub use traits::{
    chat::{ChatModel, ChatPrompt, OfflineChat},
    database::ProcessDatabase,
    engine::LcaEngine,
};
pub use types::{
    candidate::{Candidate, FunctionalUnit, ProcessRecord},
    config::{MatchConfig, SamplingConfig, TableColumns},
    flow::{
        AssessedFlow, CandidateSource, FlowRecord, ParsedFlow, ParsedLabel, ResolvedFlow,
        SelectedLabel,
    },
    method::{default_methods, ImpactCategory, ImpactMethod, ImpactValues},
    report::{BatchReport, RowOutcome, RowReport, SkippedMethod},
};
