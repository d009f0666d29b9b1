use serde::{Deserialize, Serialize};

use semplan::pipeline::PipelineReport;

pub const PLAN_MANIFEST_PREFIX: &str = "plan_run_";
pub const OUTPUTS_PREFIX: &str = "campaign_outputs_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanPaths {
    pub cache_root: String,
    pub manifest_dir: String,
    pub config_path: String,
    pub observations_path: String,
    pub cache_db_path: Option<String>,
    pub outputs_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOutputSummary {
    pub records: usize,
    pub ad_groups: usize,
    pub themes: usize,
    pub shopping_target_cpc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub completed_at: String,
    pub duration_ms: u128,
    pub command: String,
    pub estimator_version: String,
    pub config_sha256: String,
    pub observations_sha256: String,
    pub paths: PlanPaths,
    pub summary: PlanOutputSummary,
    pub report: PipelineReport,
    pub warnings: Vec<String>,
}
