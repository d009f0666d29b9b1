use crate::model::{Competition, ConsolidatedRecord, Intent, MatchType, PerformanceTier};

use super::features::RecordFeatures;

pub const VOLUME_WEIGHT: f64 = 0.4;
pub const INVERSE_COMPETITION_WEIGHT: f64 = 0.3;
pub const INTENT_WEIGHT: f64 = 0.3;
pub const GOLDMINE_BOOST: f64 = 1.5;

const EXCLUSION_MAX_CPC_HIGH: f64 = 5.0;
const EXCLUSION_MIN_INTENT: f64 = 0.7;
const LOW_COMPETITION_RETAIN_VOLUME: u64 = 200;
const MEDIUM_COMPETITION_RETAIN_ROI: f64 = 0.2;

const GOLDMINE_MIN_VOLUME: u64 = 1000;
const GOLDMINE_MAX_CPC_LOW: f64 = 2.0;
const GOLDMINE_MIN_INTENT: f64 = 0.6;

const HIGH_PERFORMING_SCORE: f64 = 0.8;
const MEDIUM_PERFORMING_SCORE: f64 = 0.6;

#[derive(Debug, Clone, Copy)]
struct MinMax {
    min: f64,
    max: f64,
}

impl MinMax {
    fn fit(values: impl Iterator<Item = f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            min = min.min(value);
            max = max.max(value);
        }
        Self { min, max }
    }

    fn scale(&self, value: f64) -> f64 {
        let range = self.max - self.min;
        if !range.is_finite() || range <= 0.0 {
            return 0.0;
        }
        ((value - self.min) / range).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedFeatures {
    pub volume: f64,
    pub volume_cost_ratio: f64,
    pub commercial_intent: f64,
    pub bid_spread_ratio: f64,
    pub roi_potential: f64,
    pub inverse_competition: f64,
}

pub fn normalize_batch(
    records: &[ConsolidatedRecord],
    features: &[RecordFeatures],
) -> Vec<NormalizedFeatures> {
    let volume = MinMax::fit(records.iter().map(|record| record.volume as f64));
    let volume_cost = MinMax::fit(features.iter().map(|value| value.volume_cost_ratio));
    let intent = MinMax::fit(features.iter().map(|value| value.commercial_intent_score));
    let spread = MinMax::fit(features.iter().map(|value| value.bid_spread_ratio));
    let roi = MinMax::fit(features.iter().map(|value| value.roi_potential));
    let competition = MinMax::fit(features.iter().map(RecordFeatures::inverse_competition));

    records
        .iter()
        .zip(features)
        .map(|(record, value)| NormalizedFeatures {
            volume: volume.scale(record.volume as f64),
            volume_cost_ratio: volume_cost.scale(value.volume_cost_ratio),
            commercial_intent: intent.scale(value.commercial_intent_score),
            bid_spread_ratio: spread.scale(value.bid_spread_ratio),
            roi_potential: roi.scale(value.roi_potential),
            inverse_competition: competition.scale(value.inverse_competition()),
        })
        .collect()
}

pub fn composite_score(normalized: &NormalizedFeatures) -> f64 {
    let score = VOLUME_WEIGHT * normalized.volume
        + INVERSE_COMPETITION_WEIGHT * normalized.inverse_competition
        + INTENT_WEIGHT * normalized.commercial_intent;
    score.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Excluded,
    Retained,
    Neutral,
}

pub fn admission(record: &ConsolidatedRecord, features: &RecordFeatures) -> Admission {
    let retained = match record.competition {
        Competition::Low => record.volume >= LOW_COMPETITION_RETAIN_VOLUME,
        Competition::Medium => features.roi_potential > MEDIUM_COMPETITION_RETAIN_ROI,
        Competition::High => false,
    };
    if retained {
        return Admission::Retained;
    }

    let excluded = record.competition == Competition::High
        && record.cpc_high > EXCLUSION_MAX_CPC_HIGH
        && features.commercial_intent_score < EXCLUSION_MIN_INTENT;
    if excluded {
        Admission::Excluded
    } else {
        Admission::Neutral
    }
}

pub fn is_goldmine(
    volume: u64,
    cpc_low: f64,
    commercial_intent_score: f64,
    competition: Competition,
) -> bool {
    volume >= GOLDMINE_MIN_VOLUME
        && cpc_low <= GOLDMINE_MAX_CPC_LOW
        && commercial_intent_score >= GOLDMINE_MIN_INTENT
        && competition != Competition::High
}

pub fn boosted_score(base_score: f64, is_goldmine: bool) -> f64 {
    if is_goldmine {
        base_score * GOLDMINE_BOOST
    } else {
        base_score
    }
}

pub fn performance_tier(is_goldmine: bool, final_score: f64) -> PerformanceTier {
    if is_goldmine {
        PerformanceTier::Goldmine
    } else if final_score >= HIGH_PERFORMING_SCORE {
        PerformanceTier::HighPerforming
    } else if final_score >= MEDIUM_PERFORMING_SCORE {
        PerformanceTier::MediumPerforming
    } else {
        PerformanceTier::LowPerforming
    }
}

pub fn recommended_match_type(final_score: f64, volume: u64, intent: Intent) -> MatchType {
    if final_score >= HIGH_PERFORMING_SCORE && volume >= 1000 && intent == Intent::Transactional {
        MatchType::Exact
    } else if final_score >= MEDIUM_PERFORMING_SCORE && volume >= 500 {
        MatchType::Phrase
    } else {
        MatchType::Broad
    }
}
