use std::borrow::Cow;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cache::MetricsCache;
use crate::config::PlanConfig;
use crate::consolidate::{ConsolidationEngine, ConsolidationStats};
use crate::enrich::{
    EnrichmentMode, EnrichmentStats, KeywordEnricher, apply_enrichment, business_context,
};
use crate::evaluate::{EvaluationEngine, EvaluationSettings, EvaluationStats};
use crate::model::{CampaignOutputs, RawObservation};
use crate::segment::{
    AdGroupCascade, EmbeddingProvider, EmbeddingSource, SegmentationEngine, SegmentationSettings,
    SegmentationStats,
};
use crate::text::KeywordCleaner;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub observations_in: usize,
    pub dropped_by_cleaning: usize,
    pub consolidation: ConsolidationStats,
    pub enrichment: EnrichmentStats,
    pub evaluation: EvaluationStats,
    pub segmentation: SegmentationStats,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub outputs: CampaignOutputs,
    pub report: PipelineReport,
}

pub struct Pipeline<'a> {
    config: PlanConfig,
    cleaner: Option<KeywordCleaner>,
    consolidation: ConsolidationEngine<'a>,
    evaluation: EvaluationEngine,
    segmentation: SegmentationEngine<'a>,
    enricher: Option<&'a dyn KeywordEnricher>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: PlanConfig) -> Result<Self> {
        let cleaner = if config.project_settings.clean_keywords {
            Some(KeywordCleaner::new()?)
        } else {
            None
        };
        let consolidation =
            ConsolidationEngine::new(config.project_settings.min_search_volume_threshold)?;
        let evaluation = EvaluationEngine::new(EvaluationSettings::from_config(&config));
        let segmentation = SegmentationEngine::new(SegmentationSettings::from_config(&config));

        Ok(Self {
            config,
            cleaner,
            consolidation,
            evaluation,
            segmentation,
            enricher: None,
        })
    }

    pub fn with_cache(mut self, cache: &'a dyn MetricsCache) -> Self {
        self.consolidation = self.consolidation.with_cache(cache);
        self
    }

    pub fn with_embedding_provider(mut self, provider: &'a dyn EmbeddingProvider) -> Self {
        self.segmentation = self.segmentation.with_provider(provider);
        self
    }

    pub fn with_enricher(mut self, enricher: &'a dyn KeywordEnricher) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn with_cascade(mut self, cascade: AdGroupCascade) -> Self {
        self.segmentation = self.segmentation.with_cascade(cascade);
        self
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn run(&self, observations: &[RawObservation]) -> PipelineRun {
        info!(observations = observations.len(), "pipeline started");

        let (prepared, dropped_by_cleaning) = self.clean(observations);
        let consolidation = self.consolidation.consolidate(&prepared);
        let (records, enrichment) = apply_enrichment(
            self.enricher,
            &business_context(&self.config),
            consolidation.records,
        );
        let evaluation = self.evaluation.evaluate(&records);
        let segmentation = self.segmentation.segment(&evaluation.records);

        let mut warnings = Vec::<String>::new();
        if enrichment.mode == EnrichmentMode::HeuristicFallback {
            warnings.push("keyword enricher unavailable; heuristic filter applied".to_string());
        }
        if segmentation.stats.embedding_source == Some(EmbeddingSource::LocalFallback) {
            warnings.push("embedding provider unavailable; local hash embeddings used".to_string());
        }
        if !observations.is_empty() && consolidation.stats.records == 0 {
            warnings.push("no keywords survived consolidation".to_string());
        }
        for message in &warnings {
            warn!(warning = %message, "pipeline warning");
        }

        let report = PipelineReport {
            observations_in: observations.len(),
            dropped_by_cleaning,
            consolidation: consolidation.stats,
            enrichment,
            evaluation: evaluation.stats,
            segmentation: segmentation.stats,
            warnings,
        };

        info!(
            records = segmentation.outputs.records.len(),
            themes = segmentation.outputs.themes.len(),
            shopping_target_cpc = segmentation.outputs.shopping_target_cpc,
            "pipeline completed"
        );

        PipelineRun {
            outputs: segmentation.outputs,
            report,
        }
    }

    fn clean<'o>(&self, observations: &'o [RawObservation]) -> (Cow<'o, [RawObservation]>, usize) {
        let Some(cleaner) = &self.cleaner else {
            return (Cow::Borrowed(observations), 0);
        };

        let mut dropped = 0_usize;
        let mut cleaned = Vec::<RawObservation>::with_capacity(observations.len());
        for observation in observations {
            match cleaner.clean(&observation.keyword) {
                Some(keyword) => cleaned.push(RawObservation {
                    keyword,
                    ..observation.clone()
                }),
                None => dropped += 1,
            }
        }
        if dropped > 0 {
            info!(dropped, "keyword cleaning dropped observations");
        }
        (Cow::Owned(cleaned), dropped)
    }
}
