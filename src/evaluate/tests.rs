use std::collections::BTreeSet;

use super::*;
use crate::consolidate::match_type_hint;
use crate::estimate::detect_intent;
use crate::model::{Competition, MatchType, MetricOrigin, MetricProvenance, PerformanceTier};

const OBSERVED: MetricProvenance = MetricProvenance {
    volume: MetricOrigin::Observed,
    competition: MetricOrigin::Observed,
    cpc_low: MetricOrigin::Observed,
    cpc_high: MetricOrigin::Observed,
};

fn record(
    keyword: &str,
    volume: u64,
    competition: Competition,
    cpc_low: f64,
    cpc_high: f64,
) -> ConsolidatedRecord {
    let intent = detect_intent(keyword);
    ConsolidatedRecord {
        keyword: keyword.to_string(),
        sources: BTreeSet::from(["test".to_string()]),
        seed: None,
        origin_url: None,
        volume,
        competition,
        cpc_low,
        cpc_high,
        intent,
        match_type_hint: match_type_hint(intent, volume),
        provenance: OBSERVED,
    }
}

fn engine() -> EvaluationEngine {
    EvaluationEngine::new(EvaluationSettings {
        target_cpc: 2.0,
        zero_bid_substitute: 1.0,
    })
}

#[test]
fn commercial_intent_adjustments_are_additive_and_clamped() {
    assert_eq!(commercial_intent_score("crm software"), 0.5);
    assert!((commercial_intent_score("buy crm") - 0.9).abs() < 1e-9);
    assert_eq!(commercial_intent_score("best cheap crm deal"), 1.0);
    assert!((commercial_intent_score("crm tips") - 0.3).abs() < 1e-9);
    assert!((commercial_intent_score("best crm guide") - 0.5).abs() < 1e-9);
}

#[test]
fn zero_floor_bid_uses_substitute_denominator() {
    let free = record("crm", 300, Competition::Low, 0.0, 0.5);
    let features = derive_features(&free, 2.0, 1.0);
    assert_eq!(features.volume_cost_ratio, 300.0);
    assert_eq!(features.bid_spread_ratio, 0.5);
    assert_eq!(features.roi_potential, 2.0);
    assert_eq!(bid_denominator(0.25, 1.0), 0.25);
}

#[test]
fn empty_batch_returns_empty_output() {
    let evaluation = engine().evaluate(&[]);
    assert!(evaluation.records.is_empty());
    assert_eq!(evaluation.stats.records_in, 0);
}

#[test]
fn final_scores_are_bounded_and_sorted() {
    let records = vec![
        record("crm", 5000, Competition::Low, 1.0, 1.8),
        record("buy crm", 2000, Competition::Medium, 1.5, 2.7),
        record("crm reviews", 900, Competition::Medium, 1.8, 3.24),
        record("crm guide", 600, Competition::Low, 0.84, 1.51),
        record("top crm", 300, Competition::High, 2.7, 4.86),
    ];

    let evaluation = engine().evaluate(&records);
    assert_eq!(evaluation.records.len(), records.len());
    for scored in &evaluation.records {
        assert!(
            (0.0..=1.5).contains(&scored.final_score),
            "{} out of range: {}",
            scored.keyword(),
            scored.final_score
        );
        assert!((0.0..=1.0).contains(&scored.base_score));
    }
    for pair in evaluation.records.windows(2) {
        assert!(pair[0].final_score >= pair[1].final_score);
    }
}

#[test]
fn single_record_batch_normalizes_to_zero() {
    let evaluation = engine().evaluate(&[record("crm", 5000, Competition::Low, 1.0, 1.8)]);
    assert_eq!(evaluation.records.len(), 1);
    assert_eq!(evaluation.records[0].base_score, 0.0);
}

#[test]
fn expensive_low_intent_high_competition_keywords_are_excluded() {
    let records = vec![
        record("free crm", 3000, Competition::High, 4.0, 7.2),
        record("buy top crm", 3000, Competition::High, 4.0, 7.2),
        record("crm software", 3000, Competition::Low, 1.0, 1.8),
    ];

    let evaluation = engine().evaluate(&records);
    let keywords = evaluation
        .records
        .iter()
        .map(ScoredRecord::keyword)
        .collect::<BTreeSet<&str>>();
    assert!(!keywords.contains("free crm"));
    assert!(keywords.contains("buy top crm"));
    assert!(keywords.contains("crm software"));
    assert_eq!(evaluation.stats.excluded, 1);
}

#[test]
fn retention_guards_cover_cost_efficient_tiers() {
    let low = record("crm", 200, Competition::Low, 1.0, 1.8);
    let medium = record("crm reviews", 50, Competition::Medium, 1.0, 1.8);
    let high = record("top crm", 50, Competition::High, 1.0, 1.8);

    let low_features = derive_features(&low, 2.0, 1.0);
    let medium_features = derive_features(&medium, 2.0, 1.0);
    let high_features = derive_features(&high, 2.0, 1.0);
    assert_eq!(admission(&low, &low_features), Admission::Retained);
    assert_eq!(admission(&medium, &medium_features), Admission::Retained);
    assert_eq!(admission(&high, &high_features), Admission::Neutral);
}

#[test]
fn goldmine_rule_matches_documented_example() {
    assert!(is_goldmine(1500, 1.5, 0.65, Competition::Low));
    assert!(!is_goldmine(1500, 1.5, 0.65, Competition::High));
    assert!(!is_goldmine(999, 1.5, 0.65, Competition::Low));
    assert!(!is_goldmine(1500, 2.01, 0.65, Competition::Low));
    assert!(!is_goldmine(1500, 1.5, 0.59, Competition::Low));
    assert_eq!(boosted_score(0.6, true), 0.6 * 1.5);
    assert_eq!(boosted_score(0.6, false), 0.6);
}

#[test]
fn goldmine_records_have_final_score_boosted_by_exactly_one_and_a_half() {
    let records = vec![
        record("buy crm", 1500, Competition::Low, 1.5, 2.7),
        record("crm software", 800, Competition::Medium, 1.8, 3.24),
        record("crm guide", 100, Competition::Low, 0.84, 1.51),
    ];

    let evaluation = engine().evaluate(&records);
    let goldmine = evaluation
        .records
        .iter()
        .find(|scored| scored.keyword() == "buy crm")
        .expect("goldmine record present");

    assert!(goldmine.is_goldmine);
    assert_eq!(goldmine.tier, PerformanceTier::Goldmine);
    assert_eq!(goldmine.final_score, goldmine.base_score * GOLDMINE_BOOST);
    assert_eq!(evaluation.stats.goldmines, 1);
    assert_eq!(evaluation.records[0].keyword(), "buy crm");
}

#[test]
fn ties_keep_input_order() {
    let records = vec![
        record("alpha crm", 700, Competition::Low, 1.0, 1.8),
        record("beta crm", 700, Competition::Low, 1.0, 1.8),
        record("gamma crm", 700, Competition::Low, 1.0, 1.8),
    ];

    let evaluation = engine().evaluate(&records);
    let order = evaluation
        .records
        .iter()
        .map(ScoredRecord::keyword)
        .collect::<Vec<&str>>();
    assert_eq!(order, vec!["alpha crm", "beta crm", "gamma crm"]);
}

#[test]
fn recommended_match_type_uses_final_score() {
    assert_eq!(
        recommended_match_type(0.9, 1200, crate::model::Intent::Transactional),
        MatchType::Exact
    );
    assert_eq!(
        recommended_match_type(0.9, 1200, crate::model::Intent::Commercial),
        MatchType::Phrase
    );
    assert_eq!(
        recommended_match_type(0.5, 1200, crate::model::Intent::Transactional),
        MatchType::Broad
    );
}
