use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PlanConfig;
use crate::model::{CampaignOutputs, LabeledRecord, ScoredRecord};

mod cascade;
mod embedding;
mod kmeans;
mod shopping;
mod themes;

pub use cascade::{
    AdGroupCascade, AdGroupRule, BRAND_GROUP, CascadeContext, GOLDMINE_GROUP,
    HIGH_PERFORMING_GROUP, HIGH_VOLUME_GROUP, LOW_COMPETITION_GROUP, OTHER_GROUP, cluster_sizes,
};
pub use embedding::{
    DEFAULT_EMBEDDING_DIM, EmbeddingProvider, EmbeddingSource, LOCAL_MODEL_ID, LocalHashEmbedder,
    embed_keywords,
};
pub use kmeans::{KMeansFit, KMeansParams, cluster_count};
pub use shopping::shopping_target_cpc;
pub use themes::{PRODUCT_INDICATORS, common_terms, derive_themes};

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentationSettings {
    pub brand_terms: Vec<String>,
    pub target_cpc: f64,
    pub default_shopping_cpc: f64,
    pub kmeans_seed: u64,
    pub kmeans_restarts: usize,
}

impl SegmentationSettings {
    pub fn from_config(config: &PlanConfig) -> Self {
        Self {
            brand_terms: config.brand_terms(),
            target_cpc: config.target_cpc(),
            default_shopping_cpc: config.scoring.default_shopping_cpc,
            kmeans_seed: config.scoring.kmeans_seed,
            kmeans_restarts: config.scoring.kmeans_restarts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationStats {
    pub records: usize,
    pub clusters: usize,
    pub embedding_source: Option<EmbeddingSource>,
    pub ad_groups: usize,
    pub themes: usize,
}

#[derive(Debug, Clone)]
pub struct Segmentation {
    pub outputs: CampaignOutputs,
    pub stats: SegmentationStats,
}

pub struct SegmentationEngine<'a> {
    settings: SegmentationSettings,
    cascade: AdGroupCascade,
    provider: Option<&'a dyn EmbeddingProvider>,
    local: LocalHashEmbedder,
}

impl<'a> SegmentationEngine<'a> {
    pub fn new(settings: SegmentationSettings) -> Self {
        Self {
            settings,
            cascade: AdGroupCascade::standard(),
            provider: None,
            local: LocalHashEmbedder::default(),
        }
    }

    pub fn with_provider(mut self, provider: &'a dyn EmbeddingProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_cascade(mut self, cascade: AdGroupCascade) -> Self {
        self.cascade = cascade;
        self
    }

    pub fn cascade(&self) -> &AdGroupCascade {
        &self.cascade
    }

    pub fn segment(&self, records: &[ScoredRecord]) -> Segmentation {
        if records.is_empty() {
            info!("segmentation skipped for empty batch");
            return Segmentation {
                outputs: CampaignOutputs {
                    records: Vec::new(),
                    themes: Vec::new(),
                    shopping_target_cpc: self.settings.default_shopping_cpc,
                },
                stats: SegmentationStats {
                    records: 0,
                    clusters: 0,
                    embedding_source: None,
                    ad_groups: 0,
                    themes: 0,
                },
            };
        }

        let keywords = records
            .iter()
            .map(|record| record.keyword().to_string())
            .collect::<Vec<String>>();
        let (vectors, embedding_source) = embed_keywords(self.provider, &self.local, &keywords);

        let params = KMeansParams::for_batch(
            records.len(),
            self.settings.kmeans_seed,
            self.settings.kmeans_restarts,
        );
        let fit = kmeans::fit(&vectors, &params);
        debug!(
            clusters = params.clusters,
            inertia = fit.inertia,
            "semantic clustering finished"
        );

        let sizes = cluster_sizes(&fit.labels);
        let context = CascadeContext {
            brand_terms: &self.settings.brand_terms,
            cluster_sizes: &sizes,
        };
        let labeled = records
            .iter()
            .zip(&fit.labels)
            .map(|(record, cluster)| LabeledRecord {
                scored: record.clone(),
                semantic_cluster: *cluster,
                ad_group: self.cascade.assign(record, *cluster, &context),
            })
            .collect::<Vec<LabeledRecord>>();

        let themes = derive_themes(records, &fit.labels);
        let shopping_target_cpc = shopping_target_cpc(
            records,
            self.settings.target_cpc,
            self.settings.default_shopping_cpc,
        );

        let outputs = CampaignOutputs {
            records: labeled,
            themes,
            shopping_target_cpc,
        };
        let stats = SegmentationStats {
            records: outputs.records.len(),
            clusters: params.clusters,
            embedding_source: Some(embedding_source),
            ad_groups: outputs.ad_groups().len(),
            themes: outputs.themes.len(),
        };

        info!(
            records = stats.records,
            clusters = stats.clusters,
            ad_groups = stats.ad_groups,
            themes = stats.themes,
            shopping_target_cpc = outputs.shopping_target_cpc,
            "segmentation completed"
        );

        Segmentation { outputs, stats }
    }
}

pub fn assign_ad_group(
    record: &ScoredRecord,
    cluster: usize,
    brand_terms: &[String],
    cluster_sizes: &[usize],
) -> String {
    AdGroupCascade::standard().assign(
        record,
        cluster,
        &CascadeContext {
            brand_terms,
            cluster_sizes,
        },
    )
}
