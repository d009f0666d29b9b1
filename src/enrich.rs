use std::collections::HashSet;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::PlanConfig;
use crate::model::ConsolidatedRecord;
use crate::text::normalize_keyword;

const MIN_HEURISTIC_CHARS: usize = 3;

pub trait KeywordEnricher {
    fn name(&self) -> &str;
    fn filter_keywords(&self, keywords: &[String], context: &str) -> Result<Vec<String>>;
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentMode {
    Skipped,
    Enricher,
    HeuristicFallback,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentStats {
    pub mode: EnrichmentMode,
    pub records_in: usize,
    pub records_out: usize,
}

pub fn business_context(config: &PlanConfig) -> String {
    let mut lines = vec![format!("Brand: {}", config.brand_url)];
    if !config.competitor_urls.is_empty() {
        lines.push(format!("Competitors: {}", config.competitor_urls.join(", ")));
    }
    if !config.service_locations.is_empty() {
        lines.push(format!("Locations: {}", config.service_locations.join(", ")));
    }
    lines.join("\n")
}

pub fn heuristic_keep(keyword: &str) -> bool {
    keyword.chars().any(|character| character.is_ascii_lowercase())
        && keyword.chars().count() >= MIN_HEURISTIC_CHARS
}

pub fn apply_enrichment(
    enricher: Option<&dyn KeywordEnricher>,
    context: &str,
    records: Vec<ConsolidatedRecord>,
) -> (Vec<ConsolidatedRecord>, EnrichmentStats) {
    let records_in = records.len();
    let Some(enricher) = enricher else {
        return (
            records,
            EnrichmentStats {
                mode: EnrichmentMode::Skipped,
                records_in,
                records_out: records_in,
            },
        );
    };
    if records.is_empty() {
        return (
            records,
            EnrichmentStats {
                mode: EnrichmentMode::Skipped,
                records_in,
                records_out: 0,
            },
        );
    }

    let keywords = records
        .iter()
        .map(|record| record.keyword.clone())
        .collect::<Vec<String>>();

    let kept = match enricher.filter_keywords(&keywords, context) {
        Ok(kept) => kept
            .iter()
            .map(|keyword| normalize_keyword(keyword))
            .filter(|keyword| !keyword.is_empty())
            .collect::<HashSet<String>>(),
        Err(err) => {
            warn!(enricher = enricher.name(), error = %err, "keyword enricher failed");
            HashSet::new()
        }
    };

    let (kept_records, mode) = if kept.is_empty() {
        warn!(
            enricher = enricher.name(),
            "keyword enricher kept nothing; using heuristic filter"
        );
        let filtered = records
            .into_iter()
            .filter(|record| heuristic_keep(&record.keyword))
            .collect::<Vec<ConsolidatedRecord>>();
        (filtered, EnrichmentMode::HeuristicFallback)
    } else {
        let filtered = records
            .into_iter()
            .filter(|record| kept.contains(&record.keyword))
            .collect::<Vec<ConsolidatedRecord>>();
        (filtered, EnrichmentMode::Enricher)
    };

    let stats = EnrichmentStats {
        mode,
        records_in,
        records_out: kept_records.len(),
    };
    info!(
        enricher = enricher.name(),
        records_in = stats.records_in,
        records_out = stats.records_out,
        "keyword enrichment finished"
    );
    (kept_records, stats)
}
