use std::io::{self, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

use semplan::estimate::{ESTIMATOR_VERSION, MetricEstimate, estimate_metrics};
use semplan::text::normalize_keyword;

use crate::cli::EstimateArgs;

#[derive(Debug, Serialize)]
struct EstimateRow {
    keyword: String,
    #[serde(flatten)]
    estimate: MetricEstimate,
}

#[derive(Debug, Serialize)]
struct EstimateResponse {
    estimator_version: &'static str,
    results: Vec<EstimateRow>,
}

pub fn run(args: EstimateArgs) -> Result<()> {
    let mut rows = Vec::<EstimateRow>::with_capacity(args.keywords.len());
    for raw in &args.keywords {
        let keyword = normalize_keyword(raw);
        if keyword.is_empty() {
            warn!(input = %raw, "skipping empty keyword");
            continue;
        }
        let estimate = estimate_metrics(&keyword);
        rows.push(EstimateRow { keyword, estimate });
    }

    info!(keywords = rows.len(), "metric estimates computed");

    if args.json {
        write_json_response(rows)
    } else {
        write_text_response(&rows)
    }
}

fn write_json_response(results: Vec<EstimateRow>) -> Result<()> {
    let response = EstimateResponse {
        estimator_version: ESTIMATOR_VERSION,
        results,
    };

    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, &response)
        .context("failed to serialize estimate json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

fn write_text_response(rows: &[EstimateRow]) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    writeln!(output, "Estimator: {ESTIMATOR_VERSION}")?;
    for row in rows {
        writeln!(
            output,
            "{}\tvolume={}\tcompetition={}\tcpc={:.2}-{:.2}\tintent={}",
            row.keyword,
            row.estimate.volume,
            row.estimate.competition,
            row.estimate.cpc_low,
            row.estimate.cpc_high,
            row.estimate.intent,
        )?;
    }

    output.flush()?;
    Ok(())
}
