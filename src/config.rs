use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::util::read_json;

const BUDGET_TESTING_RESERVE: f64 = 0.9;
const ASSUMED_AVERAGE_CPC: f64 = 2.0;
const FALLBACK_TARGET_CPA: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdBudgets {
    #[serde(default)]
    pub search_ads_budget: f64,
    #[serde(default)]
    pub shopping_ads_budget: f64,
    #[serde(default)]
    pub pmax_ads_budget: f64,
}

impl AdBudgets {
    pub fn total(&self) -> f64 {
        self.search_ads_budget + self.shopping_ads_budget + self.pmax_ads_budget
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default = "default_conversion_rate")]
    pub assumed_conversion_rate: f64,
    #[serde(default = "default_min_volume")]
    pub min_search_volume_threshold: u64,
    #[serde(default)]
    pub clean_keywords: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            assumed_conversion_rate: default_conversion_rate(),
            min_search_volume_threshold: default_min_volume(),
            clean_keywords: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringSettings {
    /// Stand-in denominator for a $0 floor bid in ratio features. Tunable, not derived.
    #[serde(default = "default_zero_bid_substitute")]
    pub zero_bid_substitute: f64,
    #[serde(default = "default_shopping_cpc")]
    pub default_shopping_cpc: f64,
    #[serde(default = "default_kmeans_seed")]
    pub kmeans_seed: u64,
    #[serde(default = "default_kmeans_restarts")]
    pub kmeans_restarts: usize,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            zero_bid_substitute: default_zero_bid_substitute(),
            default_shopping_cpc: default_shopping_cpc(),
            kmeans_seed: default_kmeans_seed(),
            kmeans_restarts: default_kmeans_restarts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub brand_url: String,
    #[serde(default)]
    pub competitor_urls: Vec<String>,
    #[serde(default)]
    pub service_locations: Vec<String>,
    pub ad_budgets: AdBudgets,
    #[serde(default)]
    pub project_settings: ProjectSettings,
    #[serde(default)]
    pub scoring: ScoringSettings,
}

impl PlanConfig {
    pub fn new(brand_url: impl Into<String>, ad_budgets: AdBudgets) -> Self {
        Self {
            brand_url: brand_url.into(),
            competitor_urls: Vec::new(),
            service_locations: Vec::new(),
            ad_budgets,
            project_settings: ProjectSettings::default(),
            scoring: ScoringSettings::default(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let config: PlanConfig = read_json(path)?;
        config
            .validate()
            .with_context(|| format!("invalid configuration: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let brand_url = self.brand_url.trim().to_ascii_lowercase();
        if !(brand_url.starts_with("http://") || brand_url.starts_with("https://")) {
            bail!("brand_url must be a full URL (http/https)");
        }

        let budgets = &self.ad_budgets;
        for (name, value) in [
            ("search_ads_budget", budgets.search_ads_budget),
            ("shopping_ads_budget", budgets.shopping_ads_budget),
            ("pmax_ads_budget", budgets.pmax_ads_budget),
        ] {
            if !value.is_finite() || value < 0.0 {
                bail!("{name} must be a non-negative number, got {value}");
            }
        }

        let rate = self.project_settings.assumed_conversion_rate;
        if !rate.is_finite() || rate <= 0.0 || rate > 1.0 {
            bail!("assumed_conversion_rate must be in (0, 1], got {rate}");
        }

        let scoring = &self.scoring;
        if !scoring.zero_bid_substitute.is_finite() || scoring.zero_bid_substitute <= 0.0 {
            bail!("zero_bid_substitute must be positive");
        }
        if !scoring.default_shopping_cpc.is_finite() || scoring.default_shopping_cpc < 0.0 {
            bail!("default_shopping_cpc must be non-negative");
        }
        if scoring.kmeans_restarts == 0 {
            bail!("kmeans_restarts must be at least 1");
        }

        Ok(())
    }

    pub fn conversion_rate(&self) -> f64 {
        self.project_settings.assumed_conversion_rate
    }

    pub fn target_cpa(&self) -> f64 {
        let effective_budget = self.ad_budgets.total() * BUDGET_TESTING_RESERVE;
        let expected_conversions = effective_budget * self.conversion_rate() / ASSUMED_AVERAGE_CPC;

        if expected_conversions > 0.0 {
            effective_budget / expected_conversions
        } else {
            FALLBACK_TARGET_CPA
        }
    }

    pub fn target_cpc(&self) -> f64 {
        self.target_cpa() * self.conversion_rate()
    }

    pub fn brand_terms(&self) -> Vec<String> {
        domain_terms(&self.brand_url)
    }
}

pub fn domain_terms(url: &str) -> Vec<String> {
    let lowered = url.trim().to_ascii_lowercase();
    let without_scheme = lowered
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(lowered.as_str());
    let authority = without_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    let host = authority.rsplit('@').next().unwrap_or_default();
    let host = host.split(':').next().unwrap_or_default();
    let host = host.strip_prefix("www.").unwrap_or(host);

    let labels = host.split('.').collect::<Vec<&str>>();
    if labels.len() < 2 {
        return Vec::new();
    }

    labels[labels.len() - 2]
        .split(['-', '_'])
        .filter(|term| term.len() > 2)
        .map(ToOwned::to_owned)
        .collect()
}

fn default_conversion_rate() -> f64 {
    0.02
}

fn default_min_volume() -> u64 {
    500
}

fn default_zero_bid_substitute() -> f64 {
    1.0
}

fn default_shopping_cpc() -> f64 {
    2.0
}

fn default_kmeans_seed() -> u64 {
    42
}

fn default_kmeans_restarts() -> usize {
    10
}
