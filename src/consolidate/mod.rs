use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::MetricsCache;
use crate::estimate::{MetricEstimate, detect_intent, estimate_metrics};
use crate::model::{
    ConsolidatedRecord, Intent, MatchType, MetricOrigin, MetricProvenance, RawObservation,
};
use crate::text::normalize_keyword;

mod filter;
mod merge;

pub use filter::{InitialFilter, Rejection};

use merge::{ObservationGroup, reconcile_bid_range};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationStats {
    pub observations: usize,
    pub dropped_empty: usize,
    pub unique_keywords: usize,
    pub cache_hits: usize,
    pub estimated: usize,
    pub dropped_low_volume: usize,
    pub dropped_junk: usize,
    pub dropped_length: usize,
    pub records: usize,
}

#[derive(Debug, Clone)]
pub struct Consolidation {
    pub records: Vec<ConsolidatedRecord>,
    pub stats: ConsolidationStats,
}

pub struct ConsolidationEngine<'a> {
    filter: InitialFilter,
    cache: Option<&'a dyn MetricsCache>,
}

impl<'a> ConsolidationEngine<'a> {
    pub fn new(min_volume: u64) -> Result<Self> {
        Ok(Self {
            filter: InitialFilter::new(min_volume)?,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: &'a dyn MetricsCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn consolidate(&self, observations: &[RawObservation]) -> Consolidation {
        let mut stats = ConsolidationStats {
            observations: observations.len(),
            ..ConsolidationStats::default()
        };

        let mut groups = BTreeMap::<String, ObservationGroup>::new();
        for observation in observations {
            let keyword = normalize_keyword(&observation.keyword);
            if keyword.is_empty() {
                stats.dropped_empty += 1;
                continue;
            }
            groups.entry(keyword).or_default().absorb(observation);
        }
        stats.unique_keywords = groups.len();

        let mut records = Vec::<ConsolidatedRecord>::with_capacity(groups.len());
        for (keyword, group) in groups {
            let record = self.enrich(keyword, &group, &mut stats);

            match self.filter.check(&record.keyword, record.volume) {
                Some(Rejection::LowVolume) => stats.dropped_low_volume += 1,
                Some(Rejection::InformationalJunk) => stats.dropped_junk += 1,
                Some(Rejection::Length) => stats.dropped_length += 1,
                None => records.push(record),
            }
        }
        stats.records = records.len();

        info!(
            observations = stats.observations,
            unique_keywords = stats.unique_keywords,
            records = stats.records,
            cache_hits = stats.cache_hits,
            estimated = stats.estimated,
            "consolidation completed"
        );
        debug!(
            dropped_empty = stats.dropped_empty,
            dropped_low_volume = stats.dropped_low_volume,
            dropped_junk = stats.dropped_junk,
            dropped_length = stats.dropped_length,
            "consolidation filters applied"
        );

        Consolidation { records, stats }
    }

    fn enrich(
        &self,
        keyword: String,
        group: &ObservationGroup,
        stats: &mut ConsolidationStats,
    ) -> ConsolidatedRecord {
        let competition = group.merged_competition();
        let complete = group.volume.is_some()
            && competition.is_some()
            && group.cpc_low.is_some()
            && group.cpc_high.is_some();

        let fallback = if complete {
            None
        } else {
            Some(self.fallback_metrics(&keyword, stats))
        };

        let fallback = fallback.as_ref();
        let (volume, volume_origin) =
            resolve_field(group.volume, fallback, &keyword, |value| value.volume);
        let (competition, competition_origin) =
            resolve_field(competition, fallback, &keyword, |value| value.competition);
        let (cpc_low, cpc_low_origin) =
            resolve_field(group.cpc_low, fallback, &keyword, |value| value.cpc_low);
        let (cpc_high, cpc_high_origin) =
            resolve_field(group.cpc_high, fallback, &keyword, |value| value.cpc_high);

        let (cpc_low, cpc_high) =
            reconcile_bid_range((cpc_low, cpc_low_origin), (cpc_high, cpc_high_origin));

        let intent = detect_intent(&keyword);
        let match_type_hint = match_type_hint(intent, volume);

        ConsolidatedRecord {
            keyword,
            sources: group.sources.clone(),
            seed: group.seed.clone(),
            origin_url: group.origin_url.clone(),
            volume,
            competition,
            cpc_low,
            cpc_high,
            intent,
            match_type_hint,
            provenance: MetricProvenance {
                volume: volume_origin,
                competition: competition_origin,
                cpc_low: cpc_low_origin,
                cpc_high: cpc_high_origin,
            },
        }
    }

    fn fallback_metrics(
        &self,
        keyword: &str,
        stats: &mut ConsolidationStats,
    ) -> (MetricEstimate, MetricOrigin) {
        let Some(cache) = self.cache else {
            stats.estimated += 1;
            return (estimate_metrics(keyword), MetricOrigin::Estimated);
        };

        match cache.lookup(keyword) {
            Ok(Some(cached)) => {
                stats.cache_hits += 1;
                return (cached, MetricOrigin::Cached);
            }
            Ok(None) => {}
            Err(err) => {
                warn!(keyword, error = %err, "metrics cache lookup failed; estimating");
            }
        }

        let estimate = estimate_metrics(keyword);
        stats.estimated += 1;
        if let Err(err) = cache.store(keyword, &estimate) {
            warn!(keyword, error = %err, "metrics cache write failed");
        }
        (estimate, MetricOrigin::Estimated)
    }
}

fn resolve_field<T>(
    observed: Option<T>,
    fallback: Option<&(MetricEstimate, MetricOrigin)>,
    keyword: &str,
    field: fn(&MetricEstimate) -> T,
) -> (T, MetricOrigin) {
    if let Some(value) = observed {
        return (value, MetricOrigin::Observed);
    }

    match fallback {
        Some((estimate, origin)) => (field(estimate), *origin),
        None => (field(&estimate_metrics(keyword)), MetricOrigin::Estimated),
    }
}

pub fn match_type_hint(intent: Intent, volume: u64) -> MatchType {
    match intent {
        Intent::Transactional if volume >= 1000 => MatchType::Exact,
        Intent::Commercial if volume >= 500 => MatchType::Phrase,
        _ => MatchType::Broad,
    }
}
