//! Configuration types for matching and assessment.

use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::types::method::{default_methods, ImpactMethod};

/// Sampling parameters for one kind of chat request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub temperature: f32,

    #[serde(default)]
    pub presence_penalty: Option<f32>,

    pub max_tokens: u32,
}

impl SamplingConfig {
    fn suggestion() -> Self {
        Self {
            temperature: 0.7,
            presence_penalty: Some(0.7),
            max_tokens: 50,
        }
    }

    fn selection() -> Self {
        Self {
            temperature: 0.7,
            presence_penalty: None,
            max_tokens: 50,
        }
    }
}

/// Names of the input table columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableColumns {
    /// Activity name column (required).
    pub activity: String,
    /// Quantity column (required).
    pub quantity: String,
    /// Notes column (optional).
    pub notes: String,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self {
            activity: "Input/output".to_string(),
            quantity: "In/out".to_string(),
            notes: "Notes".to_string(),
        }
    }
}

/// Configuration for the matching pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Chat model used for suggestions and selection.
    ///
    /// Default: "gpt-3.5-turbo".
    pub model: String,

    /// Location codes searched for every query, in order.
    ///
    /// Default: ["GLO", "RoW"].
    pub locations: Vec<String>,

    /// Maximum hits per (query, location) search. Default: 50.
    pub search_limit: usize,

    /// Sampling for alternative-term suggestions.
    pub suggestion: SamplingConfig,

    /// Sampling for the final selection.
    pub selection: SamplingConfig,

    /// System message sent with the selection prompt.
    pub system_message: String,

    /// Search the row's notes before asking for alternative terms.
    ///
    /// Only rows with a non-empty notes value are refined. Default: false.
    pub refine_with_notes: bool,

    /// Methods evaluated for every matched row.
    pub methods: Vec<ImpactMethod>,

    /// Input table column names.
    pub columns: TableColumns,

    /// Read at most this many data rows from the table.
    pub max_rows: Option<usize>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            locations: vec!["GLO".to_string(), "RoW".to_string()],
            search_limit: 50,
            suggestion: SamplingConfig::suggestion(),
            selection: SamplingConfig::selection(),
            system_message: String::new(),
            refine_with_notes: false,
            methods: default_methods(),
            columns: TableColumns::default(),
            max_rows: None,
        }
    }
}

impl MatchConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chat model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the searched locations.
    pub fn with_locations(mut self, locations: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.locations = locations.into_iter().map(|l| l.into()).collect();
        self
    }

    /// Set the selection system message.
    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = message.into();
        self
    }

    /// Enable or disable notes refinement.
    pub fn with_notes_refinement(mut self, enabled: bool) -> Self {
        self.refine_with_notes = enabled;
        self
    }

    /// Replace the evaluated methods.
    pub fn with_methods(mut self, methods: Vec<ImpactMethod>) -> Self {
        self.methods = methods;
        self
    }

    /// Limit the number of rows read.
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    /// Check values that would make every search or evaluation a no-op.
    pub fn validate(&self) -> Result<()> {
        if self.locations.is_empty() {
            return Err(MatchError::Config("at least one location is required".to_string()));
        }
        if self.locations.iter().any(|l| l.trim().is_empty()) {
            return Err(MatchError::Config("locations must not be blank".to_string()));
        }
        if self.search_limit == 0 {
            return Err(MatchError::Config("search_limit must be greater than 0".to_string()));
        }
        if self.model.trim().is_empty() {
            return Err(MatchError::Config("model must not be blank".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MatchConfig::default();

        assert_eq!(config.model, "gpt-3.5-turbo");
        assert_eq!(config.locations, vec!["GLO", "RoW"]);
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.suggestion.presence_penalty, Some(0.7));
        assert_eq!(config.selection.presence_penalty, None);
        assert_eq!(config.methods.len(), 9);
        assert!(!config.refine_with_notes);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: MatchConfig =
            serde_json::from_str(r#"{"locations": ["GB"], "refine_with_notes": true}"#).unwrap();

        assert_eq!(config.locations, vec!["GB"]);
        assert!(config.refine_with_notes);
        assert_eq!(config.columns.activity, "Input/output");
        assert_eq!(config.search_limit, 50);
    }

    #[test]
    fn test_validate_rejects_empty_locations() {
        let config = MatchConfig::new().with_locations(Vec::<String>::new());
        assert!(config.validate().is_err());

        let config = MatchConfig::new().with_locations(["GLO", " "]);
        assert!(matches!(
            config.validate(),
            Err(MatchError::Config(msg)) if msg == "locations must not be blank"
        ));
    }
}
