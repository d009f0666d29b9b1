use std::collections::BTreeSet;

use crate::model::{Competition, MetricOrigin, RawObservation};

#[derive(Debug, Clone, Default)]
pub(super) struct ObservationGroup {
    pub(super) sources: BTreeSet<String>,
    pub(super) seed: Option<String>,
    pub(super) origin_url: Option<String>,
    pub(super) volume: Option<u64>,
    pub(super) competition_total: u32,
    pub(super) competition_count: u32,
    pub(super) cpc_low: Option<f64>,
    pub(super) cpc_high: Option<f64>,
}

impl ObservationGroup {
    pub(super) fn absorb(&mut self, observation: &RawObservation) {
        self.sources.insert(observation.source.clone());

        merge_smallest_text(&mut self.seed, observation.seed.as_deref());
        merge_smallest_text(&mut self.origin_url, observation.origin_url.as_deref());

        if let Some(volume) = observation.volume {
            self.volume = Some(self.volume.map_or(volume, |current| current.max(volume)));
        }

        if let Some(competition) = observation.competition {
            self.competition_total += u32::from(competition.ordinal());
            self.competition_count += 1;
        }

        if let Some(bid) = observation.cpc_low.filter(|value| is_valid_bid(*value)) {
            self.cpc_low = Some(self.cpc_low.map_or(bid, |current| current.min(bid)));
        }
        if let Some(bid) = observation.cpc_high.filter(|value| is_valid_bid(*value)) {
            self.cpc_high = Some(self.cpc_high.map_or(bid, |current| current.max(bid)));
        }
    }

    pub(super) fn merged_competition(&self) -> Option<Competition> {
        if self.competition_count == 0 {
            return None;
        }
        let mean = f64::from(self.competition_total) / f64::from(self.competition_count);
        Some(Competition::from_mean(mean))
    }
}

pub(super) fn reconcile_bid_range(
    low: (f64, MetricOrigin),
    high: (f64, MetricOrigin),
) -> (f64, f64) {
    let (low_value, low_origin) = low;
    let (high_value, high_origin) = high;
    if low_value <= high_value {
        return (low_value, high_value);
    }

    match (
        low_origin == MetricOrigin::Observed,
        high_origin == MetricOrigin::Observed,
    ) {
        (false, true) => (high_value, high_value),
        (true, false) => (low_value, low_value),
        _ => (high_value, low_value),
    }
}

fn merge_smallest_text(slot: &mut Option<String>, candidate: Option<&str>) {
    let Some(candidate) = candidate.map(str::trim).filter(|value| !value.is_empty()) else {
        return;
    };

    let replace = slot.as_deref().is_none_or(|current| candidate < current);
    if replace {
        *slot = Some(candidate.to_string());
    }
}

fn is_valid_bid(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
