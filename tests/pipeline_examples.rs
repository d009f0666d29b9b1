use std::collections::BTreeSet;

use semplan::cache::SqliteMetricsCache;
use semplan::config::{AdBudgets, PlanConfig};
use semplan::consolidate::ConsolidationEngine;
use semplan::enrich::{EnrichmentMode, KeywordEnricher};
use semplan::estimate::estimate_metrics;
use semplan::evaluate::{EvaluationEngine, EvaluationSettings};
use semplan::model::{Competition, Intent, RawObservation};
use semplan::pipeline::Pipeline;
use semplan::segment::{BRAND_GROUP, OTHER_GROUP};
use semplan::text::normalize_keyword;

fn config() -> PlanConfig {
    PlanConfig::new(
        "https://www.fitpal.com",
        AdBudgets {
            search_ads_budget: 3000.0,
            shopping_ads_budget: 1000.0,
            pmax_ads_budget: 1000.0,
        },
    )
}

fn observation(keyword: &str, source: &str, volume: u64) -> RawObservation {
    RawObservation::new(keyword, source).with_volume(volume)
}

fn sample_observations() -> Vec<RawObservation> {
    vec![
        observation("Buy Fitness App", "brand_tool", 1200),
        RawObservation::new("buy fitness app", "competitor_tool")
            .with_competition(Competition::High),
        observation("fitness app pricing", "competitor_tool", 2400)
            .with_competition(Competition::Low),
        observation("fitpal premium", "brand_tool", 900),
        observation("best fitness app", "suggest", 5400),
        observation("fitness app reviews", "suggest", 1900).with_competition(Competition::Medium),
        observation("workout planner app", "suggest", 1300).with_competition(Competition::Low),
        observation("home workout tool", "suggest", 700),
        observation("running coach software", "suggest", 800).with_bids(0.9, 2.4),
        observation("how to build a budget", "suggest", 50_000),
        observation("diy gym equipment", "suggest", 8000),
        observation("gym", "suggest", 100),
        observation("   ", "suggest", 9000),
    ]
}

#[test]
fn normalization_is_idempotent() {
    for raw in ["  Buy   Fitness APP ", "fitness\tapp", "already normal"] {
        let once = normalize_keyword(raw);
        assert_eq!(normalize_keyword(&once), once);
    }
}

#[test]
fn duplicate_observations_merge_into_one_record() {
    let engine = ConsolidationEngine::new(500).expect("engine");
    let consolidation = engine.consolidate(&sample_observations()[..2]);

    assert_eq!(consolidation.records.len(), 1);
    let record = &consolidation.records[0];
    assert_eq!(record.keyword, "buy fitness app");
    assert_eq!(record.volume, 1200);
    assert_eq!(record.competition, Competition::High);
    assert_eq!(
        record.sources,
        BTreeSet::from(["brand_tool".to_string(), "competitor_tool".to_string()])
    );
}

#[test]
fn tutorial_style_keywords_are_dropped_regardless_of_volume() {
    let engine = ConsolidationEngine::new(0).expect("engine");
    let consolidation = engine.consolidate(&[observation(
        "how to build a budget",
        "suggest",
        1_000_000,
    )]);
    assert!(consolidation.records.is_empty());
}

#[test]
fn estimator_matches_reference_keyword() {
    let estimate = estimate_metrics("best budgeting app");
    assert_eq!(estimate.competition, Competition::High);
    assert_eq!(estimate.intent, Intent::Commercial);
    assert_eq!(estimate.cpc_low, 2.7);
    assert_eq!(estimate.cpc_high, 4.86);
}

#[test]
fn consolidation_is_order_independent() {
    let engine = ConsolidationEngine::new(500).expect("engine");
    let forward = sample_observations();
    let mut reversed = forward.clone();
    reversed.reverse();

    assert_eq!(
        engine.consolidate(&forward).records,
        engine.consolidate(&reversed).records
    );
}

#[test]
fn empty_batch_produces_empty_outputs() {
    let evaluation =
        EvaluationEngine::new(EvaluationSettings::from_config(&config())).evaluate(&[]);
    assert!(evaluation.records.is_empty());

    let pipeline = Pipeline::new(config()).expect("pipeline");
    let outcome = pipeline.run(&[]);
    assert!(outcome.outputs.labels().is_empty());
    assert!(outcome.outputs.themes.is_empty());
    assert_eq!(outcome.outputs.shopping_target_cpc, 2.0);
}

#[test]
fn full_pipeline_labels_every_surviving_keyword_once() {
    let cache = SqliteMetricsCache::in_memory().expect("cache");
    let pipeline = Pipeline::new(config()).expect("pipeline").with_cache(&cache);
    let outcome = pipeline.run(&sample_observations());

    let keywords = outcome
        .outputs
        .records
        .iter()
        .map(|labeled| labeled.scored.keyword().to_string())
        .collect::<Vec<String>>();
    let unique = keywords.iter().cloned().collect::<BTreeSet<String>>();
    assert_eq!(keywords.len(), unique.len());

    assert!(!unique.contains("how to build a budget"));
    assert!(!unique.contains("diy gym equipment"));
    assert!(!unique.contains("gym"));
    assert!(unique.contains("buy fitness app"));

    let labels = outcome.outputs.labels();
    assert_eq!(labels.len(), keywords.len());
    assert_eq!(labels["fitpal premium"], BRAND_GROUP);
    assert_eq!(labels["buy fitness app"], "Transactional Intent");
    assert!(labels.values().all(|label| label != OTHER_GROUP));

    for labeled in &outcome.outputs.records {
        let scored = &labeled.scored;
        assert!((0.0..=1.5).contains(&scored.final_score));
        assert!(scored.record.cpc_low <= scored.record.cpc_high);
        if scored.is_goldmine {
            assert_eq!(scored.final_score, scored.base_score * 1.5);
        }
    }
    for pair in outcome.outputs.records.windows(2) {
        assert!(pair[0].scored.final_score >= pair[1].scored.final_score);
    }

    assert!(outcome.outputs.shopping_target_cpc > 0.0);
    assert!(outcome.outputs.shopping_target_cpc <= pipeline.config().target_cpc());
    assert_eq!(outcome.report.consolidation.dropped_empty, 1);
    assert!(outcome.report.warnings.is_empty());
}

#[test]
fn repeated_runs_are_deterministic() {
    let pipeline = Pipeline::new(config()).expect("pipeline");
    let first = pipeline.run(&sample_observations());
    let second = pipeline.run(&sample_observations());

    assert_eq!(first.outputs, second.outputs);
}

#[test]
fn observed_bids_survive_the_pipeline() {
    let pipeline = Pipeline::new(config()).expect("pipeline");
    let outcome = pipeline.run(&sample_observations());

    let coach = outcome
        .outputs
        .records
        .iter()
        .find(|labeled| labeled.scored.keyword() == "running coach software")
        .expect("running coach software kept");
    assert_eq!(coach.scored.record.cpc_low, 0.9);
    assert_eq!(coach.scored.record.cpc_high, 2.4);
}

#[test]
fn cleaning_rewrites_keywords_before_consolidation() {
    let mut config = config();
    config.project_settings.clean_keywords = true;
    config.project_settings.min_search_volume_threshold = 0;

    let pipeline = Pipeline::new(config).expect("pipeline");
    let outcome = pipeline.run(&[
        observation("Fitness&amp;App Pricing!", "scraper", 900),
        observation("click here", "scraper", 900),
    ]);

    let labels = outcome.outputs.labels();
    assert!(labels.contains_key("fitness app pricing"));
    assert_eq!(labels.len(), 1);
    assert_eq!(outcome.report.dropped_by_cleaning, 1);
}

struct OfflineEnricher;

impl KeywordEnricher for OfflineEnricher {
    fn name(&self) -> &str {
        "offline"
    }

    fn filter_keywords(&self, _keywords: &[String], _context: &str) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("no credentials configured")
    }
}

#[test]
fn failing_enricher_falls_back_and_reports_warning() {
    let enricher = OfflineEnricher;
    let pipeline = Pipeline::new(config())
        .expect("pipeline")
        .with_enricher(&enricher);
    let baseline = Pipeline::new(config()).expect("pipeline").run(&sample_observations());
    let outcome = pipeline.run(&sample_observations());

    assert_eq!(outcome.report.enrichment.mode, EnrichmentMode::HeuristicFallback);
    assert_eq!(outcome.report.warnings.len(), 1);
    assert_eq!(outcome.outputs.labels(), baseline.outputs.labels());
}
