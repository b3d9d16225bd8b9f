//! LLM prompts for the matching pipeline.
//!
//! Two prompts: one asks for alternative search terms when a lookup misses,
//! the other picks one dataset out of the search results.

use crate::types::candidate::Candidate;

/// Prompt asking for alternative search terms.
pub const SUGGEST_PROMPT: &str = r#"Suggest a list of 3 alternative search terms that could be used to find similar datasets
for the activity '{activity}' in the ecoinvent database. Each suggestion should modify
the material name to represent similar materials and should be no more than two words.
If '{activity}' includes the word production, keep it in your suggestions and simply add a word.
Your suggestions will be used to find datasets in the ecoinvent database for life cycle assessment, so suggest terms that are likely to give matches.
Focus on alternative materials related to its composition.
Return the suggestions as a comma-separated list."#;

/// Prompt asking the model to choose one dataset from the search results.
pub const SELECT_PROMPT: &str = r#"The ecoinvent database found the following results:
'{results}'
related to '{activity}'.
Choose one dataset to be used for '{activity}' under the following rules:
1. If they exist, give highest preference to datasets that include the exact term '{activity}'.
2. If '{activity}' includes 'production', do not choose a dataset that includes 'waste'.
3. If '{activity}' includes 'waste', do not choose a dataset that includes 'production'; prefer 'treatment'.
4. If '{activity}' includes 'electricity', prefer datasets that include the exact term 'market group for electricity, medium voltage'.
5. If '{activity}' does not include the term 'electricity', never choose a dataset that includes the term 'electricity'.
6. If '{activity}' does not include the term 'waste', never choose a dataset that includes this term or 'treatment'.
7. Print only the name of the dataset exactly as it appears in the results above, without any extra text."#;

/// Format the suggestion prompt, appending free-text hints when present.
pub fn format_suggest_prompt(activity: &str, hints: Option<&str>) -> String {
    let prompt = SUGGEST_PROMPT.replace("{activity}", activity);
    match hints.map(str::trim).filter(|h| !h.is_empty()) {
        Some(hints) => format!("{} {}", prompt, hints),
        None => prompt,
    }
}

/// Bullet list of `- name, location, unit` lines; empty when there are no
/// candidates.
pub fn format_candidates(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| format!("- {}\n", c.label()))
        .collect()
}

/// Format the selection prompt for the given search results.
pub fn format_select_prompt(activity: &str, candidates: &[Candidate]) -> String {
    SELECT_PROMPT
        .replace("{results}", &format_candidates(candidates))
        .replace("{activity}", activity)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suggest_prompt_mentions_activity() {
        let prompt = format_suggest_prompt("waste graphite", None);

        assert!(prompt.contains("for the activity 'waste graphite'"));
        assert!(prompt.contains("comma-separated list"));
        assert!(!prompt.contains("{activity}"));
        assert!(prompt.ends_with("comma-separated list."));
    }

    #[test]
    fn test_suggest_prompt_appends_hints() {
        let prompt = format_suggest_prompt("graphite", Some("battery anode material"));
        assert!(prompt.ends_with("comma-separated list. battery anode material"));

        let blank = format_suggest_prompt("graphite", Some("  "));
        assert!(blank.ends_with("comma-separated list."));
    }

    #[test]
    fn test_format_candidates() {
        let candidates = vec![
            Candidate::new("graphite production", "GLO", "kilogram"),
            Candidate::new("market for graphite", "RoW", ""),
        ];

        assert_eq!(
            format_candidates(&candidates),
            "- graphite production, GLO, kilogram\n- market for graphite, RoW, \n"
        );
        assert_eq!(format_candidates(&[]), "");
    }

    #[test]
    fn test_select_prompt_embeds_rules_and_results() {
        let candidates = vec![Candidate::new("treatment of waste graphite", "GLO", "kilogram")];
        let prompt = format_select_prompt("waste graphite", &candidates);

        assert!(prompt.contains("'- treatment of waste graphite, GLO, kilogram\n'"));
        assert!(prompt.contains("related to 'waste graphite'"));
        assert!(prompt.contains("market group for electricity, medium voltage"));
        assert!(prompt.contains("prefer 'treatment'"));
        assert!(!prompt.contains("{activity}"));
        assert!(!prompt.contains("{results}"));
    }

    #[test]
    fn test_select_prompt_with_no_results() {
        let prompt = format_select_prompt("unobtainium", &[]);
        assert!(prompt.starts_with("The ecoinvent database found the following results:\n''\n"));
    }
}
