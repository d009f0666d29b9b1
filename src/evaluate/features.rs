use crate::model::ConsolidatedRecord;
use crate::text::contains_any;

const BASE_INTENT_SCORE: f64 = 0.5;

pub const TRANSACTIONAL_TERMS: &[&str] = &[
    "buy", "purchase", "order", "price", "cost", "cheap", "discount", "deal", "sale",
];
pub const COMMERCIAL_TERMS: &[&str] = &[
    "best",
    "top",
    "reviews",
    "compare",
    "vs",
    "alternatives",
    "competitor",
];
pub const INFORMATIONAL_TERMS: &[&str] = &[
    "what is", "how to", "guide", "tutorial", "ideas", "benefits", "tips",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordFeatures {
    pub commercial_intent_score: f64,
    pub competition_score: u8,
    pub bid_spread: f64,
    pub bid_spread_ratio: f64,
    pub volume_cost_ratio: f64,
    pub roi_potential: f64,
}

impl RecordFeatures {
    pub fn inverse_competition(&self) -> f64 {
        f64::from(4 - self.competition_score)
    }
}

pub fn commercial_intent_score(keyword: &str) -> f64 {
    let mut score = BASE_INTENT_SCORE;
    if contains_any(keyword, TRANSACTIONAL_TERMS) {
        score += 0.4;
    }
    if contains_any(keyword, COMMERCIAL_TERMS) {
        score += 0.2;
    }
    if contains_any(keyword, INFORMATIONAL_TERMS) {
        score -= 0.2;
    }
    score.clamp(0.0, 1.0)
}

pub fn bid_denominator(cpc: f64, zero_bid_substitute: f64) -> f64 {
    if cpc == 0.0 { zero_bid_substitute } else { cpc }
}

pub fn derive_features(
    record: &ConsolidatedRecord,
    target_cpc: f64,
    zero_bid_substitute: f64,
) -> RecordFeatures {
    let denominator = bid_denominator(record.cpc_low, zero_bid_substitute);
    let bid_spread = record.cpc_high - record.cpc_low;

    RecordFeatures {
        commercial_intent_score: commercial_intent_score(&record.keyword),
        competition_score: record.competition.ordinal(),
        bid_spread,
        bid_spread_ratio: bid_spread / denominator,
        volume_cost_ratio: record.volume as f64 / denominator,
        roi_potential: (target_cpc - record.cpc_low) / denominator,
    }
}
