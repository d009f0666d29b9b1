use std::collections::HashMap;

use crate::model::{Intent, PerformanceTier, ScoredRecord};
use crate::text::is_stopword;

pub const PRODUCT_INDICATORS: &[&str] = &[
    "product", "service", "tool", "software", "app", "platform", "solution",
];

const CANDIDATE_TERMS: usize = 10;
const CLUSTER_THEME_MIN_MEMBERS: usize = 3;
const CLUSTER_THEME_TERMS: usize = 3;
const BUCKET_THEME_TERMS: usize = 2;

pub fn common_terms<'a>(keywords: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut counts = HashMap::<String, (usize, usize)>::new();
    let mut next_position = 0_usize;
    for keyword in keywords {
        for term in keyword.split_whitespace() {
            let term = term.to_lowercase();
            let entry = counts.entry(term).or_insert_with(|| {
                next_position += 1;
                (0, next_position)
            });
            entry.0 += 1;
        }
    }

    let mut ranked = counts.into_iter().collect::<Vec<(String, (usize, usize))>>();
    ranked.sort_by(|left, right| {
        right
            .1
            .0
            .cmp(&left.1.0)
            .then_with(|| left.1.1.cmp(&right.1.1))
    });

    ranked
        .into_iter()
        .take(CANDIDATE_TERMS)
        .map(|(term, _)| term)
        .filter(|term| term.chars().count() > 2 && !is_stopword(term))
        .collect()
}

pub fn derive_themes(records: &[ScoredRecord], clusters: &[usize]) -> Vec<String> {
    let mut themes = Vec::<String>::new();

    let mut cluster_order = Vec::<usize>::new();
    let mut performers = HashMap::<usize, Vec<&str>>::new();
    for (record, cluster) in records.iter().zip(clusters) {
        if !matches!(
            record.tier,
            PerformanceTier::Goldmine | PerformanceTier::HighPerforming
        ) {
            continue;
        }
        if !performers.contains_key(cluster) {
            cluster_order.push(*cluster);
        }
        performers.entry(*cluster).or_default().push(record.keyword());
    }
    for cluster in cluster_order {
        let members = &performers[&cluster];
        if members.len() < CLUSTER_THEME_MIN_MEMBERS {
            continue;
        }
        let terms = common_terms(members.iter().copied());
        if !terms.is_empty() {
            themes.push(join_terms(&terms, CLUSTER_THEME_TERMS));
        }
    }

    for intent in [Intent::Transactional, Intent::Commercial] {
        let terms = common_terms(
            records
                .iter()
                .filter(|record| record.record.intent == intent)
                .map(ScoredRecord::keyword),
        );
        if !terms.is_empty() {
            themes.push(format!(
                "{}: {}",
                intent.title(),
                join_terms(&terms, BUCKET_THEME_TERMS)
            ));
        }
    }

    for indicator in PRODUCT_INDICATORS {
        let terms = common_terms(
            records
                .iter()
                .map(ScoredRecord::keyword)
                .filter(|keyword| keyword.contains(indicator)),
        );
        if !terms.is_empty() {
            themes.push(format!(
                "{}: {}",
                title_case(indicator),
                join_terms(&terms, BUCKET_THEME_TERMS)
            ));
        }
    }

    dedupe_preserving_order(themes)
}

fn join_terms(terms: &[String], limit: usize) -> String {
    terms
        .iter()
        .take(limit)
        .map(String::as_str)
        .collect::<Vec<&str>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut characters = word.chars();
    match characters.next() {
        Some(first) => first.to_uppercase().chain(characters).collect(),
        None => String::new(),
    }
}

fn dedupe_preserving_order(themes: Vec<String>) -> Vec<String> {
    let mut unique = Vec::<String>::with_capacity(themes.len());
    for theme in themes {
        if !unique.contains(&theme) {
            unique.push(theme);
        }
    }
    unique
}
