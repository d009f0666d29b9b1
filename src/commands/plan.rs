use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{info, warn};

use semplan::cache::{CACHE_DB_FILENAME, SqliteMetricsCache};
use semplan::config::PlanConfig;
use semplan::estimate::ESTIMATOR_VERSION;
use semplan::model::RawObservation;
use semplan::pipeline::Pipeline;
use semplan::util::{
    ensure_directory, now_utc_string, read_json, sha256_file, utc_compact_string,
    write_json_pretty,
};

use crate::cli::PlanArgs;
use crate::manifest::{
    OUTPUTS_PREFIX, PLAN_MANIFEST_PREFIX, PlanOutputSummary, PlanPaths, PlanRunManifest,
};

pub fn run(args: PlanArgs) -> Result<()> {
    let timer = Instant::now();
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let compact = utc_compact_string(started_ts);
    let run_id = format!("plan-{compact}");

    let cache_root = args.cache_root.clone();
    let manifest_dir = cache_root.join("manifests");
    ensure_directory(&manifest_dir)?;

    let outputs_path = args
        .outputs_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(format!("{OUTPUTS_PREFIX}{compact}.json")));
    let manifest_path = args
        .manifest_path
        .clone()
        .unwrap_or_else(|| manifest_dir.join(format!("{PLAN_MANIFEST_PREFIX}{compact}.json")));

    info!(cache_root = %cache_root.display(), run_id = %run_id, "starting plan");

    let config = PlanConfig::load(&args.config)?;
    let observations: Vec<RawObservation> = read_json(&args.observations)
        .with_context(|| format!("failed to load observations: {}", args.observations.display()))?;
    let config_sha256 = sha256_file(&args.config)?;
    let observations_sha256 = sha256_file(&args.observations)?;

    let mut warnings = Vec::<String>::new();
    let cache_db_path = (!args.no_cache).then(|| cache_root.join(CACHE_DB_FILENAME));
    let cache = match &cache_db_path {
        Some(path) => match SqliteMetricsCache::open(path) {
            Ok(cache) => Some(cache),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "metrics cache unavailable");
                warnings.push(format!("metrics cache unavailable: {err}"));
                None
            }
        },
        None => None,
    };

    let mut pipeline = Pipeline::new(config)?;
    if let Some(cache) = &cache {
        pipeline = pipeline.with_cache(cache);
    }
    let outcome = pipeline.run(&observations);

    write_json_pretty(&outputs_path, &outcome.outputs)?;

    warnings.extend(outcome.report.warnings.iter().cloned());
    let summary = PlanOutputSummary {
        records: outcome.outputs.records.len(),
        ad_groups: outcome.outputs.ad_groups().len(),
        themes: outcome.outputs.themes.len(),
        shopping_target_cpc: outcome.outputs.shopping_target_cpc,
    };

    let manifest = PlanRunManifest {
        manifest_version: 1,
        run_id: run_id.clone(),
        status: "completed".to_string(),
        started_at,
        completed_at: now_utc_string(),
        duration_ms: timer.elapsed().as_millis(),
        command: render_plan_command(&args),
        estimator_version: ESTIMATOR_VERSION.to_string(),
        config_sha256,
        observations_sha256,
        paths: PlanPaths {
            cache_root: cache_root.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            config_path: args.config.display().to_string(),
            observations_path: args.observations.display().to_string(),
            cache_db_path: cache
                .as_ref()
                .and(cache_db_path.as_ref())
                .map(|path| path.display().to_string()),
            outputs_path: outputs_path.display().to_string(),
        },
        summary,
        report: outcome.report,
        warnings,
    };
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        run_id = %run_id,
        records = manifest.summary.records,
        ad_groups = manifest.summary.ad_groups,
        themes = manifest.summary.themes,
        shopping_target_cpc = manifest.summary.shopping_target_cpc,
        outputs = %outputs_path.display(),
        manifest = %manifest_path.display(),
        "plan completed"
    );

    Ok(())
}

fn render_plan_command(args: &PlanArgs) -> String {
    let mut parts = vec![
        "semplan plan".to_string(),
        format!("--config {}", args.config.display()),
        format!("--observations {}", args.observations.display()),
        format!("--cache-root {}", args.cache_root.display()),
    ];
    if let Some(path) = optional_display(&args.outputs_path) {
        parts.push(format!("--outputs-path {path}"));
    }
    if let Some(path) = optional_display(&args.manifest_path) {
        parts.push(format!("--manifest-path {path}"));
    }
    if args.no_cache {
        parts.push("--no-cache".to_string());
    }
    parts.join(" ")
}

fn optional_display(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|value| value.display().to_string())
}
