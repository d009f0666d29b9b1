use crate::model::{Intent, ScoredRecord};

pub fn shopping_target_cpc(records: &[ScoredRecord], target_cpc: f64, default_cpc: f64) -> f64 {
    if records.is_empty() {
        return default_cpc;
    }

    let transactional = records
        .iter()
        .filter(|record| record.record.intent == Intent::Transactional)
        .collect::<Vec<&ScoredRecord>>();
    let subset = if transactional.is_empty() {
        records.iter().collect::<Vec<&ScoredRecord>>()
    } else {
        transactional
    };

    let total_volume = subset
        .iter()
        .map(|record| record.record.volume as f64)
        .sum::<f64>();
    let weighted = if total_volume > 0.0 {
        subset
            .iter()
            .map(|record| record.record.cpc_low * record.record.volume as f64)
            .sum::<f64>()
            / total_volume
    } else {
        default_cpc
    };

    weighted.min(target_cpc)
}
