use serde::{Deserialize, Serialize};

use crate::model::{Competition, Intent};
use crate::text::{contains_any, token_count};

pub const ESTIMATOR_VERSION: &str = "lexical-v1";

const PURCHASE_LEXEMES: &[&str] = &["buy", "price", "cost", "cheap", "discount"];
const HIGH_COMPETITION_LEXEMES: &[&str] = &["best", "top", "near me", "free", "cheap", "discount"];
const MEDIUM_COMPETITION_LEXEMES: &[&str] = &["vs", "compare", "alternatives", "reviews"];

const CPC_HIGH_MULTIPLIER: f64 = 1.8;

pub struct IntentRule {
    pub intent: Intent,
    pub lexemes: &'static [&'static str],
}

pub const INTENT_RULES: &[IntentRule] = &[
    IntentRule {
        intent: Intent::Transactional,
        lexemes: &["buy", "pricing", "price", "demo", "trial", "quote", "order"],
    },
    IntentRule {
        intent: Intent::Commercial,
        lexemes: &["vs", "compare", "alternatives", "competitor", "best", "reviews"],
    },
    IntentRule {
        intent: Intent::Informational,
        lexemes: &["what is", "how to", "guide", "tutorial", "ideas", "benefits"],
    },
];

pub const DEFAULT_INTENT: Intent = Intent::Commercial;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricEstimate {
    pub volume: u64,
    pub competition: Competition,
    pub cpc_low: f64,
    pub cpc_high: f64,
    pub intent: Intent,
}

pub fn detect_intent(keyword: &str) -> Intent {
    INTENT_RULES
        .iter()
        .find(|rule| contains_any(keyword, rule.lexemes))
        .map(|rule| rule.intent)
        .unwrap_or(DEFAULT_INTENT)
}

pub fn estimate_volume(keyword: &str) -> u64 {
    let base = match token_count(keyword) {
        0 | 1 => 1000.0,
        2 => 500.0,
        3 => 200.0,
        _ => 100.0,
    };

    let mut volume: f64 = base;
    match detect_intent(keyword) {
        Intent::Transactional => volume *= 0.8,
        Intent::Informational => volume *= 1.2,
        Intent::Commercial => {}
    }

    if contains_any(keyword, PURCHASE_LEXEMES) {
        volume *= 1.5;
    }

    (volume.trunc() as u64).max(10)
}

pub fn estimate_competition(keyword: &str) -> Competition {
    if contains_any(keyword, HIGH_COMPETITION_LEXEMES) {
        Competition::High
    } else if contains_any(keyword, MEDIUM_COMPETITION_LEXEMES) {
        Competition::Medium
    } else {
        Competition::Low
    }
}

pub fn estimate_cpc_low(keyword: &str) -> f64 {
    let base = match detect_intent(keyword) {
        Intent::Transactional => 2.5,
        Intent::Commercial => 1.8,
        Intent::Informational => 1.2,
    };

    let multiplier = match estimate_competition(keyword) {
        Competition::Low => 0.7,
        Competition::Medium => 1.0,
        Competition::High => 1.5,
    };

    round_cents(base * multiplier)
}

pub fn estimate_cpc_high(keyword: &str) -> f64 {
    round_cents(estimate_cpc_low(keyword) * CPC_HIGH_MULTIPLIER)
}

pub fn estimate_metrics(keyword: &str) -> MetricEstimate {
    MetricEstimate {
        volume: estimate_volume(keyword),
        competition: estimate_competition(keyword),
        cpc_low: estimate_cpc_low(keyword),
        cpc_high: estimate_cpc_high(keyword),
        intent: detect_intent(keyword),
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_cascade_prefers_transactional_over_commercial() {
        assert_eq!(detect_intent("best price for crm"), Intent::Transactional);
        assert_eq!(detect_intent("crm vs spreadsheet"), Intent::Commercial);
        assert_eq!(detect_intent("best guide to crm"), Intent::Commercial);
        assert_eq!(detect_intent("how to pick a crm"), Intent::Informational);
        assert_eq!(detect_intent("crm software"), Intent::Commercial);
    }

    #[test]
    fn volume_buckets_by_token_count_and_intent() {
        assert_eq!(estimate_volume("crm"), 1000);
        assert_eq!(estimate_volume("crm software"), 500);
        assert_eq!(estimate_volume("crm software teams"), 200);
        assert_eq!(estimate_volume("crm software for small teams"), 100);
        assert_eq!(estimate_volume("crm guide"), 600);
        assert_eq!(estimate_volume("crm demo"), 400);
        assert_eq!(estimate_volume("buy crm"), 600);
    }

    #[test]
    fn competition_is_lexical_only() {
        assert_eq!(estimate_competition("plumber near me"), Competition::High);
        assert_eq!(estimate_competition("crm reviews"), Competition::Medium);
        assert_eq!(estimate_competition("crm"), Competition::Low);
    }

    #[test]
    fn best_budgeting_app_estimates_match_documented_example() {
        let keyword = "best budgeting app";
        assert_eq!(estimate_competition(keyword), Competition::High);
        assert_eq!(detect_intent(keyword), Intent::Commercial);
        assert_eq!(estimate_cpc_low(keyword), 2.7);
        assert_eq!(estimate_cpc_high(keyword), 4.86);
    }

    #[test]
    fn estimate_metrics_is_deterministic() {
        let first = estimate_metrics("cheap crm pricing");
        let second = estimate_metrics("cheap crm pricing");
        assert_eq!(first, second);
        assert!(first.cpc_low <= first.cpc_high);
        assert!(first.volume >= 10);
    }
}
