use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "semplan",
    version,
    about = "Keyword consolidation, scoring and campaign segmentation"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Plan(PlanArgs),
    Estimate(EstimateArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[arg(long)]
    pub config: PathBuf,

    #[arg(long)]
    pub observations: PathBuf,

    #[arg(long, default_value = ".cache/semplan")]
    pub cache_root: PathBuf,

    #[arg(long)]
    pub outputs_path: Option<PathBuf>,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_cache: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EstimateArgs {
    #[arg(long = "keyword", required = true)]
    pub keywords: Vec<String>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/semplan")]
    pub cache_root: PathBuf,
}
