use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use semplan::cache::{CACHE_DB_FILENAME, SqliteMetricsCache};
use semplan::estimate::ESTIMATOR_VERSION;
use semplan::util::read_json;

use crate::cli::StatusArgs;
use crate::manifest::{PLAN_MANIFEST_PREFIX, PlanRunManifest};

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.cache_root.join("manifests");
    let db_path = args.cache_root.join(CACHE_DB_FILENAME);

    info!(cache_root = %args.cache_root.display(), "status requested");

    match latest_plan_manifest(&manifest_dir)? {
        Some(path) => {
            let manifest: PlanRunManifest = read_json(&path)?;
            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                started_at = %manifest.started_at,
                completed_at = %manifest.completed_at,
                duration_ms = manifest.duration_ms,
                observations = manifest.report.observations_in,
                records = manifest.summary.records,
                ad_groups = manifest.summary.ad_groups,
                themes = manifest.summary.themes,
                shopping_target_cpc = manifest.summary.shopping_target_cpc,
                warnings = manifest.warnings.len(),
                "loaded latest plan manifest"
            );
        }
        None => warn!(path = %manifest_dir.display(), "no plan manifest found"),
    }

    if db_path.exists() {
        let cache = SqliteMetricsCache::open(&db_path)?;
        let stats = cache.stats()?;
        info!(
            path = %db_path.display(),
            estimator_version = ESTIMATOR_VERSION,
            current_rows = stats.current_rows,
            stale_rows = stats.stale_rows,
            "metrics cache status"
        );
    } else {
        warn!(path = %db_path.display(), "metrics cache missing");
    }

    Ok(())
}

fn latest_plan_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let mut latest: Option<(String, PathBuf)> = None;
    for entry in fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to list {}", manifest_dir.display()))?
    {
        let entry =
            entry.with_context(|| format!("failed to list {}", manifest_dir.display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with(PLAN_MANIFEST_PREFIX) || !name.ends_with(".json") {
            continue;
        }
        let newer = latest.as_ref().is_none_or(|(current, _)| name > *current);
        if newer {
            latest = Some((name, entry.path()));
        }
    }

    Ok(latest.map(|(_, path)| path))
}
