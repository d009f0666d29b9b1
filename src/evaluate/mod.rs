use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PlanConfig;
use crate::model::{ConsolidatedRecord, ScoredRecord};

mod features;
mod scoring;
#[cfg(test)]
mod tests;

pub use features::{RecordFeatures, bid_denominator, commercial_intent_score, derive_features};
pub use scoring::{
    Admission, GOLDMINE_BOOST, NormalizedFeatures, admission, boosted_score, composite_score,
    is_goldmine, normalize_batch, performance_tier, recommended_match_type,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluationSettings {
    pub target_cpc: f64,
    pub zero_bid_substitute: f64,
}

impl EvaluationSettings {
    pub fn from_config(config: &PlanConfig) -> Self {
        Self {
            target_cpc: config.target_cpc(),
            zero_bid_substitute: config.scoring.zero_bid_substitute,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationStats {
    pub records_in: usize,
    pub excluded: usize,
    pub retained_by_guard: usize,
    pub goldmines: usize,
    pub records_out: usize,
}

#[derive(Debug, Clone)]
pub struct Evaluation {
    pub records: Vec<ScoredRecord>,
    pub stats: EvaluationStats,
}

pub struct EvaluationEngine {
    settings: EvaluationSettings,
}

impl EvaluationEngine {
    pub fn new(settings: EvaluationSettings) -> Self {
        Self { settings }
    }

    pub fn evaluate(&self, records: &[ConsolidatedRecord]) -> Evaluation {
        let mut stats = EvaluationStats {
            records_in: records.len(),
            ..EvaluationStats::default()
        };
        if records.is_empty() {
            info!("evaluation skipped for empty batch");
            return Evaluation {
                records: Vec::new(),
                stats,
            };
        }

        let features = records
            .iter()
            .map(|record| {
                derive_features(
                    record,
                    self.settings.target_cpc,
                    self.settings.zero_bid_substitute,
                )
            })
            .collect::<Vec<RecordFeatures>>();
        let normalized = normalize_batch(records, &features);

        let mut scored = Vec::<ScoredRecord>::with_capacity(records.len());
        for ((record, features), normalized) in records.iter().zip(&features).zip(&normalized) {
            match admission(record, features) {
                Admission::Excluded => {
                    stats.excluded += 1;
                    debug!(keyword = %record.keyword, "excluded high-cost low-intent keyword");
                    continue;
                }
                Admission::Retained => stats.retained_by_guard += 1,
                Admission::Neutral => {}
            }

            let base_score = composite_score(normalized);
            let goldmine = is_goldmine(
                record.volume,
                record.cpc_low,
                features.commercial_intent_score,
                record.competition,
            );
            if goldmine {
                stats.goldmines += 1;
            }
            let final_score = boosted_score(base_score, goldmine);

            scored.push(ScoredRecord {
                record: record.clone(),
                commercial_intent_score: features.commercial_intent_score,
                competition_score: features.competition_score,
                bid_spread: features.bid_spread,
                bid_spread_ratio: features.bid_spread_ratio,
                volume_cost_ratio: features.volume_cost_ratio,
                roi_potential: features.roi_potential,
                base_score,
                final_score,
                is_goldmine: goldmine,
                tier: performance_tier(goldmine, final_score),
                recommended_match_type: recommended_match_type(
                    final_score,
                    record.volume,
                    record.intent,
                ),
            });
        }

        scored.sort_by(|left, right| right.final_score.total_cmp(&left.final_score));
        stats.records_out = scored.len();

        info!(
            records_in = stats.records_in,
            records_out = stats.records_out,
            excluded = stats.excluded,
            goldmines = stats.goldmines,
            "evaluation completed"
        );

        Evaluation {
            records: scored,
            stats,
        }
    }
}
