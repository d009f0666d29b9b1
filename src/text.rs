use anyhow::{Context, Result};
use regex::Regex;

pub const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can",
];

const MAX_CLEANED_WORDS: usize = 6;

pub fn normalize_keyword(input: &str) -> String {
    input
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn contains_any(text: &str, lexemes: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    lexemes.iter().any(|lexeme| lowered.contains(lexeme))
}

pub fn token_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn is_stopword(term: &str) -> bool {
    STOPWORDS.contains(&term)
}

pub struct KeywordCleaner {
    html_entity: Regex,
    punctuation: Regex,
    junk_words: Vec<Regex>,
}

impl KeywordCleaner {
    pub fn new() -> Result<Self> {
        let html_entity =
            Regex::new(r"&[a-zA-Z]+;").context("failed to compile html entity regex")?;
        let punctuation =
            Regex::new(r"[^\w\s]").context("failed to compile punctuation regex")?;
        let junk_words = [
            r"(?i)\b(click|read|more|learn|here|this|that|these|those)\b",
            r"(?i)\b(website|site|page|link|url)\b",
            r"(?i)\b(menu|navigation|header|footer)\b",
        ]
        .iter()
        .map(|pattern| {
            Regex::new(pattern).with_context(|| format!("failed to compile junk regex: {pattern}"))
        })
        .collect::<Result<Vec<Regex>>>()?;

        Ok(Self {
            html_entity,
            punctuation,
            junk_words,
        })
    }

    pub fn clean(&self, text: &str) -> Option<String> {
        let without_entities = self.html_entity.replace_all(text, " ");
        let without_punctuation = self.punctuation.replace_all(&without_entities, " ");
        let mut cleaned = collapse(&without_punctuation);

        for pattern in &self.junk_words {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }

        let cleaned = normalize_keyword(&cleaned);
        if cleaned.is_empty() || token_count(&cleaned) > MAX_CLEANED_WORDS {
            return None;
        }
        Some(cleaned)
    }
}

fn collapse(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_keyword_folds_case_and_collapses_whitespace() {
        assert_eq!(normalize_keyword("  Buy   Fitness\tApp \n"), "buy fitness app");
        assert_eq!(normalize_keyword("   "), "");
    }

    #[test]
    fn normalize_keyword_is_idempotent() {
        let samples = ["Buy Fitness App", "  ÉCOLE   Privée ", "a\u{00a0}b  c", "", "x"];
        for sample in samples {
            let once = normalize_keyword(sample);
            assert_eq!(normalize_keyword(&once), once, "sample: {sample:?}");
        }
    }

    #[test]
    fn contains_any_matches_substrings_case_insensitively() {
        assert!(contains_any("Best Budgeting App", &["best"]));
        assert!(contains_any("CRM vs Sheets", &["vs"]));
        assert!(contains_any("obvs", &["vs"]));
        assert!(!contains_any("budget planner", &["buy", "price"]));
    }

    #[test]
    fn cleaner_strips_entities_punctuation_and_junk_words() {
        let cleaner = KeywordCleaner::new().expect("cleaner should compile");
        assert_eq!(
            cleaner.clean("Click here: Budget&amp;Planner Website!"),
            Some("budget planner".to_string())
        );
    }

    #[test]
    fn cleaner_drops_long_and_empty_phrases() {
        let cleaner = KeywordCleaner::new().expect("cleaner should compile");
        assert_eq!(cleaner.clean("read more here"), None);
        assert_eq!(cleaner.clean("one two three four five six seven"), None);
    }
}
