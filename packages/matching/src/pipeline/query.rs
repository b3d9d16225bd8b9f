//! Wildcard search expressions.
//!
//! `"waste graphite"` becomes `"*waste* *graphite*"`: every
//! whitespace-delimited token is wildcarded on its own, so each one may match
//! anywhere inside a word of the searched text.

use serde::{Deserialize, Serialize};

/// A search expression of independently wildcarded terms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WildcardQuery {
    terms: Vec<String>,
}

/// Build a query from an already normalized term.
///
/// Performs no normalization; empty input gives an empty query.
pub fn build_query(term: &str) -> WildcardQuery {
    WildcardQuery {
        terms: term.split_whitespace().map(|t| format!("*{}*", t)).collect(),
    }
}

/// Build a query from a term followed by extra words.
pub fn build_query_with_extra(term: &str, extra: &str) -> WildcardQuery {
    WildcardQuery {
        terms: term
            .split_whitespace()
            .chain(extra.split_whitespace())
            .map(|t| format!("*{}*", t))
            .collect(),
    }
}

impl WildcardQuery {
    /// Parse a backend query string (`"*waste* *graph?te*"`) back into terms.
    pub fn parse(query: &str) -> Self {
        Self {
            terms: query.split_whitespace().map(str::to_string).collect(),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// True when every term matches at least one word of `text`.
    ///
    /// Case-insensitive; `*` matches any run of characters. Words are split on
    /// whitespace and commas. An empty query matches nothing.
    pub fn matches(&self, text: &str) -> bool {
        if self.terms.is_empty() {
            return false;
        }
        let text = text.to_lowercase();
        let words: Vec<&str> = text
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|w| !w.is_empty())
            .collect();

        self.terms.iter().all(|term| {
            let pattern = term.to_lowercase();
            words.iter().any(|word| glob_match(&pattern, word))
        })
    }
}

impl std::fmt::Display for WildcardQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.terms.join(" "))
    }
}

/// Match `text` against a pattern where `*` stands for any run of characters.
fn glob_match(pattern: &str, text: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == text;
    }

    let first = parts[0];
    let last = parts[parts.len() - 1];
    if !text.starts_with(first) || text.len() < first.len() + last.len() {
        return false;
    }

    let mut rest = &text[first.len()..];
    for part in &parts[1..parts.len() - 1] {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
