use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Competition {
    Low,
    Medium,
    High,
}

impl Competition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn ordinal(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }

    pub fn from_mean(mean: f64) -> Self {
        if mean <= 1.5 {
            Self::Low
        } else if mean <= 2.5 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

impl fmt::Display for Competition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Informational,
    Commercial,
    Transactional,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Self::Transactional, Self::Commercial, Self::Informational];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Commercial => "commercial",
            Self::Transactional => "transactional",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Informational => "Informational",
            Self::Commercial => "Commercial",
            Self::Transactional => "Transactional",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Broad,
    Phrase,
    Exact,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricOrigin {
    Observed,
    Cached,
    Estimated,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MetricProvenance {
    pub volume: MetricOrigin,
    pub competition: MetricOrigin,
    pub cpc_low: MetricOrigin,
    pub cpc_high: MetricOrigin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub keyword: String,
    pub source: String,
    #[serde(default)]
    pub seed: Option<String>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub competition: Option<Competition>,
    #[serde(default)]
    pub cpc_low: Option<f64>,
    #[serde(default)]
    pub cpc_high: Option<f64>,
    #[serde(default)]
    pub origin_url: Option<String>,
}

impl RawObservation {
    pub fn new(keyword: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            source: source.into(),
            seed: None,
            volume: None,
            competition: None,
            cpc_low: None,
            cpc_high: None,
            origin_url: None,
        }
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }

    pub fn with_competition(mut self, competition: Competition) -> Self {
        self.competition = Some(competition);
        self
    }

    pub fn with_bids(mut self, cpc_low: f64, cpc_high: f64) -> Self {
        self.cpc_low = Some(cpc_low);
        self.cpc_high = Some(cpc_high);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    pub keyword: String,
    pub sources: BTreeSet<String>,
    pub seed: Option<String>,
    pub origin_url: Option<String>,
    pub volume: u64,
    pub competition: Competition,
    pub cpc_low: f64,
    pub cpc_high: f64,
    pub intent: Intent,
    pub match_type_hint: MatchType,
    pub provenance: MetricProvenance,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Goldmine,
    HighPerforming,
    MediumPerforming,
    LowPerforming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredRecord {
    pub record: ConsolidatedRecord,
    pub commercial_intent_score: f64,
    pub competition_score: u8,
    pub bid_spread: f64,
    pub bid_spread_ratio: f64,
    pub volume_cost_ratio: f64,
    pub roi_potential: f64,
    pub base_score: f64,
    pub final_score: f64,
    pub is_goldmine: bool,
    pub tier: PerformanceTier,
    pub recommended_match_type: MatchType,
}

impl ScoredRecord {
    pub fn keyword(&self) -> &str {
        &self.record.keyword
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub scored: ScoredRecord,
    pub semantic_cluster: usize,
    pub ad_group: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignOutputs {
    pub records: Vec<LabeledRecord>,
    pub themes: Vec<String>,
    pub shopping_target_cpc: f64,
}

impl CampaignOutputs {
    pub fn labels(&self) -> BTreeMap<String, String> {
        self.records
            .iter()
            .map(|value| (value.scored.keyword().to_string(), value.ad_group.clone()))
            .collect()
    }

    pub fn ad_groups(&self) -> BTreeMap<String, Vec<String>> {
        let mut groups = BTreeMap::<String, Vec<String>>::new();
        for value in &self.records {
            groups
                .entry(value.ad_group.clone())
                .or_default()
                .push(value.scored.keyword().to_string());
        }
        groups
    }
}
