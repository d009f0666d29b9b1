use crate::model::{Competition, ScoredRecord};

pub const BRAND_GROUP: &str = "Brand Terms";
pub const GOLDMINE_GROUP: &str = "Goldmine Opportunities";
pub const HIGH_PERFORMING_GROUP: &str = "High Performing";
pub const LOW_COMPETITION_GROUP: &str = "Low Competition";
pub const HIGH_VOLUME_GROUP: &str = "High Volume";
pub const OTHER_GROUP: &str = "Other";

const HIGH_PERFORMING_SCORE: f64 = 0.8;
const HIGH_VOLUME_MIN: u64 = 1000;
const MIN_SEMANTIC_CLUSTER_SIZE: usize = 3;

#[derive(Debug, Clone, Copy)]
pub struct CascadeContext<'a> {
    pub brand_terms: &'a [String],
    pub cluster_sizes: &'a [usize],
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum AdGroupRule {
    BrandTerms,
    Intent,
    Performance,
    LowCompetition,
    HighVolume,
    SemanticCluster,
}

impl AdGroupRule {
    pub fn label(
        self,
        record: &ScoredRecord,
        cluster: usize,
        context: &CascadeContext<'_>,
    ) -> Option<String> {
        match self {
            Self::BrandTerms => context
                .brand_terms
                .iter()
                .any(|term| !term.is_empty() && record.keyword().contains(term.as_str()))
                .then(|| BRAND_GROUP.to_string()),
            Self::Intent => Some(format!("{} Intent", record.record.intent.title())),
            Self::Performance => {
                if record.is_goldmine {
                    Some(GOLDMINE_GROUP.to_string())
                } else if record.final_score >= HIGH_PERFORMING_SCORE {
                    Some(HIGH_PERFORMING_GROUP.to_string())
                } else {
                    None
                }
            }
            Self::LowCompetition => (record.record.competition == Competition::Low)
                .then(|| LOW_COMPETITION_GROUP.to_string()),
            Self::HighVolume => {
                (record.record.volume >= HIGH_VOLUME_MIN).then(|| HIGH_VOLUME_GROUP.to_string())
            }
            Self::SemanticCluster => {
                let size = context.cluster_sizes.get(cluster).copied().unwrap_or(0);
                (size >= MIN_SEMANTIC_CLUSTER_SIZE).then(|| format!("Semantic Cluster {cluster}"))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdGroupCascade {
    rules: Vec<AdGroupRule>,
}

impl Default for AdGroupCascade {
    fn default() -> Self {
        Self::standard()
    }
}

impl AdGroupCascade {
    pub fn standard() -> Self {
        Self::new(vec![
            AdGroupRule::BrandTerms,
            AdGroupRule::Intent,
            AdGroupRule::Performance,
            AdGroupRule::LowCompetition,
            AdGroupRule::HighVolume,
            AdGroupRule::SemanticCluster,
        ])
    }

    pub fn new(rules: Vec<AdGroupRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[AdGroupRule] {
        &self.rules
    }

    pub fn assign(
        &self,
        record: &ScoredRecord,
        cluster: usize,
        context: &CascadeContext<'_>,
    ) -> String {
        self.rules
            .iter()
            .find_map(|rule| rule.label(record, cluster, context))
            .unwrap_or_else(|| OTHER_GROUP.to_string())
    }
}

pub fn cluster_sizes(labels: &[usize]) -> Vec<usize> {
    let mut sizes = vec![0_usize; labels.iter().max().map_or(0, |max| max + 1)];
    for label in labels {
        sizes[*label] += 1;
    }
    sizes
}
