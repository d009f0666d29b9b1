use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, params};

use crate::estimate::{ESTIMATOR_VERSION, MetricEstimate, detect_intent};
use crate::model::Competition;
use crate::util::{ensure_directory, now_utc_string};

pub const CACHE_DB_FILENAME: &str = "metrics_cache.sqlite";

pub trait MetricsCache {
    fn lookup(&self, keyword: &str) -> Result<Option<MetricEstimate>>;
    fn store(&self, keyword: &str, estimate: &MetricEstimate) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub current_rows: i64,
    pub stale_rows: i64,
}

pub struct SqliteMetricsCache {
    connection: Connection,
}

impl SqliteMetricsCache {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }

        let connection = Connection::open(db_path)
            .with_context(|| format!("failed to open metrics cache: {}", db_path.display()))?;
        connection
            .pragma_update(None, "journal_mode", "WAL")
            .context("failed to set journal_mode=WAL for metrics cache")?;
        connection
            .pragma_update(None, "synchronous", "NORMAL")
            .context("failed to set synchronous=NORMAL for metrics cache")?;

        Self::with_connection(connection)
    }

    pub fn in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("failed to open in-memory metrics cache")?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self> {
        ensure_cache_schema(&connection)?;
        Ok(Self { connection })
    }

    pub fn stats(&self) -> Result<CacheStats> {
        let current_rows = self.connection.query_row(
            "SELECT COUNT(*) FROM keyword_metrics WHERE estimator_version = ?1",
            [ESTIMATOR_VERSION],
            |row| row.get(0),
        )?;
        let stale_rows = self.connection.query_row(
            "SELECT COUNT(*) FROM keyword_metrics WHERE estimator_version != ?1",
            [ESTIMATOR_VERSION],
            |row| row.get(0),
        )?;

        Ok(CacheStats {
            current_rows,
            stale_rows,
        })
    }
}

impl MetricsCache for SqliteMetricsCache {
    fn lookup(&self, keyword: &str) -> Result<Option<MetricEstimate>> {
        let row = self
            .connection
            .query_row(
                "
                SELECT volume, competition, cpc_low, cpc_high
                FROM keyword_metrics
                WHERE keyword = ?1 AND estimator_version = ?2
                LIMIT 1
                ",
                params![keyword, ESTIMATOR_VERSION],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                    ))
                },
            )
            .optional()
            .with_context(|| format!("failed to read cached metrics for '{keyword}'"))?;

        let Some((volume, competition, cpc_low, cpc_high)) = row else {
            return Ok(None);
        };

        let Some(competition) = Competition::parse(&competition) else {
            return Ok(None);
        };
        if volume < 0 || !cpc_low.is_finite() || !cpc_high.is_finite() || cpc_low > cpc_high {
            return Ok(None);
        }

        Ok(Some(MetricEstimate {
            volume: volume as u64,
            competition,
            cpc_low,
            cpc_high,
            intent: detect_intent(keyword),
        }))
    }

    fn store(&self, keyword: &str, estimate: &MetricEstimate) -> Result<()> {
        self.connection
            .execute(
                "
                INSERT INTO keyword_metrics(keyword, estimator_version, volume, competition, cpc_low, cpc_high, updated_at)
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7)
                ON CONFLICT(keyword) DO UPDATE SET
                  estimator_version=excluded.estimator_version,
                  volume=excluded.volume,
                  competition=excluded.competition,
                  cpc_low=excluded.cpc_low,
                  cpc_high=excluded.cpc_high,
                  updated_at=excluded.updated_at
                ",
                params![
                    keyword,
                    ESTIMATOR_VERSION,
                    estimate.volume as i64,
                    estimate.competition.as_str(),
                    estimate.cpc_low,
                    estimate.cpc_high,
                    now_utc_string(),
                ],
            )
            .with_context(|| format!("failed to write cached metrics for '{keyword}'"))?;

        Ok(())
    }
}

fn ensure_cache_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS keyword_metrics (
              keyword TEXT PRIMARY KEY,
              estimator_version TEXT NOT NULL,
              volume INTEGER NOT NULL,
              competition TEXT NOT NULL,
              cpc_low REAL NOT NULL,
              cpc_high REAL NOT NULL,
              updated_at TEXT NOT NULL
            );
            ",
        )
        .context("failed to ensure metrics cache schema")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::estimate_metrics;

    #[test]
    fn store_then_lookup_returns_cached_metrics() {
        let cache = SqliteMetricsCache::in_memory().expect("cache should open");
        let estimate = estimate_metrics("crm pricing");
        cache.store("crm pricing", &estimate).expect("store");

        let cached = cache.lookup("crm pricing").expect("lookup");
        assert_eq!(cached, Some(estimate));
        assert_eq!(cache.lookup("unknown").expect("lookup"), None);
    }

    #[test]
    fn rows_from_other_estimator_versions_are_misses() {
        let cache = SqliteMetricsCache::in_memory().expect("cache should open");
        cache
            .connection
            .execute(
                "INSERT INTO keyword_metrics VALUES('crm', 'lexical-v0', 5, 'low', 1.0, 2.0, 'then')",
                [],
            )
            .expect("seed stale row");

        assert_eq!(cache.lookup("crm").expect("lookup"), None);
        let stats = cache.stats().expect("stats");
        assert_eq!(stats.current_rows, 0);
        assert_eq!(stats.stale_rows, 1);
    }

    #[test]
    fn corrupt_rows_are_ignored() {
        let cache = SqliteMetricsCache::in_memory().expect("cache should open");
        cache
            .connection
            .execute(
                "INSERT INTO keyword_metrics VALUES('crm', ?1, 5, 'extreme', 1.0, 2.0, 'then')",
                [ESTIMATOR_VERSION],
            )
            .expect("seed corrupt row");

        assert_eq!(cache.lookup("crm").expect("lookup"), None);
    }

    #[test]
    fn store_is_last_writer_wins() {
        let cache = SqliteMetricsCache::in_memory().expect("cache should open");
        let mut estimate = estimate_metrics("crm");
        cache.store("crm", &estimate).expect("first store");
        estimate.volume = 42;
        cache.store("crm", &estimate).expect("second store");

        let cached = cache.lookup("crm").expect("lookup").expect("row present");
        assert_eq!(cached.volume, 42);
        assert_eq!(cache.stats().expect("stats").current_rows, 1);
    }
}
