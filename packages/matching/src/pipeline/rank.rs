//! Deterministic stand-in for LLM selection.
//!
//! Applies the same rules the selection prompt states, as exclusions and
//! preferences over candidate names. Used for offline runs and for tests that
//! should not depend on a model's judgement.

use async_trait::async_trait;

use crate::error::ChatError;
use crate::pipeline::select::LabelSelector;
use crate::types::candidate::Candidate;
use crate::types::flow::SelectedLabel;

const MEDIUM_VOLTAGE_MARKET: &str = "market group for electricity, medium voltage";

/// Rule-based selector.
///
/// Exclusions:
/// - activity has "production": no candidate containing "waste"
/// - activity has "waste": no candidate containing "production"
/// - activity lacks "electricity": no candidate containing "electricity"
/// - activity lacks "waste": no candidate containing "waste" or "treatment"
///
/// Preferences, strongest first: the full activity name appears in the
/// candidate; the medium voltage market group for electricity activities;
/// "treatment" for waste activities. Ties keep search order.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankingSelector;

impl RankingSelector {
    pub fn new() -> Self {
        Self
    }

    fn excluded(activity: &str, name: &str) -> bool {
        let has = |a: &str, term: &str| a.contains(term);

        (has(activity, "production") && has(name, "waste"))
            || (has(activity, "waste") && has(name, "production"))
            || (!has(activity, "electricity") && has(name, "electricity"))
            || (!has(activity, "waste") && (has(name, "waste") || has(name, "treatment")))
    }

    fn preference(activity: &str, name: &str) -> u8 {
        let mut score = 0;
        if !activity.is_empty() && name.contains(activity) {
            score += 4;
        }
        if activity.contains("electricity") && name.contains(MEDIUM_VOLTAGE_MARKET) {
            score += 2;
        }
        if activity.contains("waste") && name.contains("treatment") {
            score += 1;
        }
        score
    }

    /// Best candidate under the rules, or `None` when every one is excluded.
    pub fn rank<'a>(&self, activity: &str, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        let activity = activity.trim().to_lowercase();

        candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| {
                let name = c.name.to_lowercase();
                if Self::excluded(&activity, &name) {
                    None
                } else {
                    Some((Self::preference(&activity, &name), idx, c))
                }
            })
            // Highest preference, then earliest position
            .max_by(|(pa, ia, _), (pb, ib, _)| pa.cmp(pb).then(ib.cmp(ia)))
            .map(|(_, _, c)| c)
    }
}

#[async_trait]
impl LabelSelector for RankingSelector {
    async fn select(
        &self,
        activity: &str,
        candidates: &[Candidate],
    ) -> Result<SelectedLabel, ChatError> {
        Ok(self
            .rank(activity, candidates)
            .map(|c| SelectedLabel::new(c.label()))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(names: &[&str]) -> Vec<Candidate> {
        names.iter().map(|n| Candidate::new(*n, "GLO", "kilogram")).collect()
    }

    fn pick(activity: &str, names: &[&str]) -> Option<String> {
        let list = candidates(names);
        RankingSelector::new()
            .rank(activity, &list)
            .map(|c| c.name.clone())
    }

    #[test]
    fn test_exact_activity_name_wins() {
        let chosen = pick(
            "graphite production",
            &["market for graphite", "graphite production, natural"],
        );
        assert_eq!(chosen.as_deref(), Some("graphite production, natural"));
    }

    #[test]
    fn test_production_excludes_waste() {
        let chosen = pick(
            "graphite production",
            &["waste graphite production", "market for graphite"],
        );
        assert_eq!(chosen.as_deref(), Some("market for graphite"));
    }

    #[test]
    fn test_waste_excludes_production_and_prefers_treatment() {
        let chosen = pick(
            "waste graphite",
            &[
                "graphite production, from waste",
                "market for waste graphite",
                "treatment of waste graphite, landfill",
            ],
        );
        // "treatment of waste graphite" contains the full name and treatment
        assert_eq!(chosen.as_deref(), Some("treatment of waste graphite, landfill"));
    }

    #[test]
    fn test_electricity_prefers_medium_voltage_market_group() {
        let chosen = pick(
            "electricity",
            &[
                "market for electricity, low voltage",
                "market group for electricity, medium voltage",
            ],
        );
        assert_eq!(
            chosen.as_deref(),
            Some("market group for electricity, medium voltage")
        );
    }

    #[test]
    fn test_non_electricity_activity_excludes_electricity() {
        let chosen = pick(
            "copper",
            &["electricity production, copper plant", "market for copper"],
        );
        assert_eq!(chosen.as_deref(), Some("market for copper"));
    }

    #[test]
    fn test_non_waste_activity_excludes_waste_and_treatment() {
        let chosen = pick(
            "steel",
            &["treatment of scrap steel", "waste steel", "steel, low-alloyed"],
        );
        assert_eq!(chosen.as_deref(), Some("steel, low-alloyed"));
    }

    #[test]
    fn test_ties_keep_search_order() {
        let chosen = pick("cement", &["market for cement, Portland", "cement, alternative"]);
        assert_eq!(chosen.as_deref(), Some("market for cement, Portland"));
    }

    #[test]
    fn test_everything_excluded() {
        assert_eq!(pick("steel", &["waste steel"]), None);
        assert_eq!(pick("steel", &[]), None);
    }

    #[tokio::test]
    async fn test_select_returns_literal_label() {
        let list = candidates(&["market for cement"]);
        let label = RankingSelector::new().select("cement", &list).await.unwrap();
        assert_eq!(label.as_str(), "market for cement, GLO, kilogram");

        let empty = RankingSelector::new().select("cement", &[]).await.unwrap();
        assert!(empty.is_empty());
    }
}
