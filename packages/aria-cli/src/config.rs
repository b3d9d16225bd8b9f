use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use matching::MatchConfig;
use secrecy::SecretString;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// CLI configuration: the matching settings plus the chat credentials.
///
/// Built from an optional TOML file, then overridden by environment
/// variables (a `.env` file is loaded first when present).
#[derive(Debug)]
pub struct Config {
    pub matching: MatchConfig,
    pub openai_api_key: Option<SecretString>,
    pub openai_base_url: Option<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the TOML file (if any) and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        let matching = match path {
            Some(path) => read_match_config(path)?,
            None => MatchConfig::default(),
        };
        Self::from_lookup(matching, |name| std::env::var(name).ok())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn from_lookup(
        mut matching: MatchConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(model) = var("OPENAI_MODEL") {
            matching.model = model.trim().to_string();
        }
        if let Some(locations) = var("ARIA_LOCATIONS") {
            matching.locations = locations
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();
        }

        let request_timeout = match var("ARIA_REQUEST_TIMEOUT_SECS") {
            Some(secs) => secs
                .trim()
                .parse()
                .context("ARIA_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?,
            None => DEFAULT_REQUEST_TIMEOUT_SECS,
        };

        matching
            .validate()
            .context("invalid matching configuration")?;

        Ok(Self {
            matching,
            openai_api_key: var("OPENAI_API_KEY").map(SecretString::from),
            openai_base_url: var("OPENAI_BASE_URL"),
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}

/// Read a `MatchConfig` from a TOML file. Missing keys take their defaults.
pub fn read_match_config(path: &Path) -> Result<MatchConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = Config::from_lookup(MatchConfig::default(), lookup(&[])).unwrap();

        assert_eq!(config.matching.model, "gpt-3.5-turbo");
        assert_eq!(config.matching.locations, vec!["GLO", "RoW"]);
        assert!(config.openai_api_key.is_none());
        assert_eq!(config.request_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_environment_overrides() {
        let config = Config::from_lookup(
            MatchConfig::default(),
            lookup(&[
                ("OPENAI_API_KEY", "sk-test"),
                ("OPENAI_MODEL", "gpt-4o-mini"),
                ("ARIA_LOCATIONS", "RER, CH,"),
                ("ARIA_REQUEST_TIMEOUT_SECS", "5"),
                ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
            ]),
        )
        .unwrap();

        assert_eq!(config.matching.model, "gpt-4o-mini");
        assert_eq!(config.matching.locations, vec!["RER", "CH"]);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.openai_api_key.unwrap().expose_secret(), "sk-test");
        assert_eq!(config.openai_base_url.as_deref(), Some("http://localhost:8080/v1"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(Config::from_lookup(
            MatchConfig::default(),
            lookup(&[("ARIA_REQUEST_TIMEOUT_SECS", "soon")])
        )
        .is_err());
        assert!(Config::from_lookup(MatchConfig::default(), lookup(&[("ARIA_LOCATIONS", ",")])).is_err());
    }

    #[test]
    fn test_api_key_is_redacted_in_debug_output() {
        let config =
            Config::from_lookup(MatchConfig::default(), lookup(&[("OPENAI_API_KEY", "sk-secret")])).unwrap();
        assert!(!format!("{:?}", config).contains("sk-secret"));
    }

    #[test]
    fn test_read_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aria.toml");
        std::fs::write(
            &path,
            r#"
locations = ["RER"]
refine_with_notes = true
system_message = "You pick ecoinvent datasets."

[selection]
temperature = 0.0
max_tokens = 80

[columns]
activity = "Flow"
"#,
        )
        .unwrap();

        let config = read_match_config(&path).unwrap();
        assert_eq!(config.locations, vec!["RER"]);
        assert!(config.refine_with_notes);
        assert_eq!(config.selection.temperature, 0.0);
        assert_eq!(config.selection.presence_penalty, None);
        assert_eq!(config.columns.activity, "Flow");
        assert_eq!(config.columns.quantity, "In/out");
        assert_eq!(config.search_limit, 50);
        assert_eq!(config.methods.len(), 9);
    }
}
