//! Matching pipeline.
//!
//! The pipeline runs:
//! - Search-and-select (wildcard search, alternative terms, final choice)
//! - Label parsing
//! - Impact evaluation and column routing

pub mod assessor;
pub mod evaluate;
pub mod parse;
pub mod prompts;
pub mod query;
pub mod rank;
pub mod select;
pub mod suggest;
pub mod workflow;

pub use assessor::{Assessment, Assessor, MatchOutcome};
pub use evaluate::ImpactEvaluator;
pub use parse::{clean_label, parse_label, parse_resolved};
pub use prompts::{
    format_candidates, format_select_prompt, format_suggest_prompt, SELECT_PROMPT, SUGGEST_PROMPT,
};
pub use query::{build_query, build_query_with_extra, WildcardQuery};
pub use rank::RankingSelector;
pub use select::{ChatSelector, LabelSelector};
pub use suggest::{request_alternatives, split_suggestions, suggest_alternatives};
pub use workflow::{CandidateSet, MatchRun, SearchWorkflow};
