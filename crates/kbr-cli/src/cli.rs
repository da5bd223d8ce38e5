use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kbr_types::ResourceKind;

#[derive(Parser)]
#[command(
    name = "kbr",
    about = "Kibana reconciler: three-way diff and apply for spaces, roles, and Logstash pipelines",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// TOML file with connection settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Kibana base URL
    #[arg(long, global = true, env = "KBR_ADDRESS")]
    pub address: Option<String>,

    #[arg(long, global = true, env = "KBR_USERNAME")]
    pub username: Option<String>,

    #[arg(long, global = true, env = "KBR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long, global = true, env = "KBR_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Three-way diff of local JSON files, without contacting Kibana
    Diff(DiffArgs),
    /// Print a live resource
    Get(TargetArgs),
    /// Delete a live resource
    Delete(TargetArgs),
    /// Reconcile a live resource with its declaration
    Apply(ApplyArgs),
}

#[derive(Args)]
pub struct DiffArgs {
    /// space, role, or pipeline
    #[arg(short, long)]
    pub kind: ResourceKind,
    /// Declared state
    #[arg(long)]
    pub expected: PathBuf,
    /// Live state; omitted means the resource does not exist yet
    #[arg(long)]
    pub actual: Option<PathBuf>,
    /// Last-applied state
    #[arg(long)]
    pub original: Option<PathBuf>,
    /// Dotted field path to leave untouched (repeatable)
    #[arg(long)]
    pub ignore: Vec<String>,
}

#[derive(Args)]
pub struct TargetArgs {
    #[arg(short, long)]
    pub kind: ResourceKind,
    pub id: String,
}

#[derive(Args)]
pub struct ApplyArgs {
    #[arg(short, long)]
    pub kind: ResourceKind,
    #[arg(long)]
    pub expected: PathBuf,
    #[arg(long)]
    pub original: Option<PathBuf>,
    #[arg(long)]
    pub ignore: Vec<String>,
    /// Show what would be sent without sending it
    #[arg(long)]
    pub dry_run: bool,
}
