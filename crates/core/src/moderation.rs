//! Local, rule-based text moderation.
//!
//! Rules are whole-word, case-insensitive patterns grouped by category. The
//! API combines this verdict with the remote moderation model when one is
//! configured.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Where a verdict came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationSource {
    Rules,
    Provider,
    Combined,
}

/// Result of moderating a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub flagged: bool,
    /// Sorted, de-duplicated category names.
    pub categories: Vec<String>,
    /// Terms that triggered local rules (empty for provider verdicts).
    pub matched_terms: Vec<String>,
    pub source: ModerationSource,
}

impl ModerationVerdict {
    pub fn clean(source: ModerationSource) -> Self {
        Self {
            flagged: false,
            categories: Vec::new(),
            matched_terms: Vec::new(),
            source,
        }
    }

    /// Merge two verdicts: flagged if either is, categories and terms united.
    pub fn merge(mut self, other: ModerationVerdict) -> Self {
        self.flagged |= other.flagged;
        self.categories.extend(other.categories);
        self.categories.sort();
        self.categories.dedup();
        self.matched_terms.extend(other.matched_terms);
        self.matched_terms.sort();
        self.matched_terms.dedup();
        self.source = ModerationSource::Combined;
        self
    }
}

struct Rule {
    category: &'static str,
    pattern: Regex,
}

const RULE_TERMS: &[(&str, &[&str])] = &[
    (
        "violence",
        &["behead", "beheading", "massacre", "mass shooting", "gore", "torture"],
    ),
    ("hate", &["ethnic cleansing", "white power", "gas the"]),
    (
        "sexual",
        &["porn", "pornographic", "nude", "nudity", "explicit sex", "nsfw"],
    ),
    ("self_harm", &["suicide method", "kill myself", "self harm", "self-harm"]),
    (
        "illegal",
        &["buy cocaine", "counterfeit money", "credit card dump", "make a bomb"],
    ),
];

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_TERMS
        .iter()
        .map(|&(category, terms)| {
            let alternatives = terms
                .iter()
                .map(|t| regex::escape(t))
                .collect::<Vec<_>>()
                .join("|");
            Rule {
                category,
                pattern: Regex::new(&format!(r"(?i)\b(?:{alternatives})\b"))
                    .expect("moderation patterns are valid"),
            }
        })
        .collect()
});

/// Run the local rules over `text`.
pub fn check_text(text: &str) -> ModerationVerdict {
    let mut verdict = ModerationVerdict::clean(ModerationSource::Rules);
    for rule in RULES.iter() {
        let mut hit = false;
        for m in rule.pattern.find_iter(text) {
            hit = true;
            verdict.matched_terms.push(m.as_str().to_lowercase());
        }
        if hit {
            verdict.categories.push(rule.category.to_string());
        }
    }
    verdict.categories.sort();
    verdict.matched_terms.sort();
    verdict.matched_terms.dedup();
    verdict.flagged = !verdict.categories.is_empty();
    verdict
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes() {
        let verdict = check_text("10 tips for a productive morning routine");
        assert!(!verdict.flagged);
        assert!(verdict.categories.is_empty());
        assert_eq!(verdict.source, ModerationSource::Rules);
    }

    #[test]
    fn flags_case_insensitive_whole_words() {
        let verdict = check_text("Watch this NSFW gore compilation");
        assert!(verdict.flagged);
        assert_eq!(verdict.categories, vec!["sexual", "violence"]);
        assert_eq!(verdict.matched_terms, vec!["gore", "nsfw"]);
    }

    #[test]
    fn substrings_do_not_match() {
        // "gore" inside "Gorey" and "nude" inside "nudeln" are not whole words.
        let verdict = check_text("Edward Gorey illustrations and Spaetzle nudeln");
        assert!(!verdict.flagged);
    }

    #[test]
    fn merge_unions_categories() {
        let local = check_text("porn");
        let remote = ModerationVerdict {
            flagged: true,
            categories: vec!["harassment".into(), "sexual".into()],
            matched_terms: vec![],
            source: ModerationSource::Provider,
        };
        let merged = local.merge(remote);
        assert!(merged.flagged);
        assert_eq!(merged.categories, vec!["harassment", "sexual"]);
        assert_eq!(merged.source, ModerationSource::Combined);
    }
}
