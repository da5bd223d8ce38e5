use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use kbr_client::{KibanaClient, KibanaConfig, ResourceClient};
use kbr_handler::{adapter, Outcome, Reconciler};
use kbr_patch::{PatchMaker, PatchOptions, PatchResult};
use kbr_types::{KibanaRole, KibanaSpace, LogstashPipeline, Resource, ResourceKind};
use serde_json::{json, Value};
use tracing::debug;

use crate::cli::*;

/// Dispatch a generic command over the concrete type for `kind`.
macro_rules! for_kind {
    ($kind:expr, $cmd:ident ( $($arg:expr),* )) => {
        match $kind {
            ResourceKind::UserSpace => $cmd::<KibanaSpace>($($arg),*).await,
            ResourceKind::Role => $cmd::<KibanaRole>($($arg),*).await,
            ResourceKind::LogstashPipeline => $cmd::<LogstashPipeline>($($arg),*).await,
        }
    };
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = &cli.format;
    match &cli.command {
        Command::Diff(args) => for_kind!(args.kind, cmd_diff(args, format)),
        Command::Get(args) => {
            let client = connect(&cli)?;
            for_kind!(args.kind, cmd_get(&client, &args.id))
        }
        Command::Delete(args) => {
            let client = connect(&cli)?;
            for_kind!(args.kind, cmd_delete(&client, &args.id, format))
        }
        Command::Apply(args) => {
            let client = connect(&cli)?;
            for_kind!(args.kind, cmd_apply(&client, args, format))
        }
    }
}

/// Merge connection settings: flag or env var, then config file, then defaults.
pub fn resolve_config(cli: &Cli) -> anyhow::Result<KibanaConfig> {
    let mut config = match &cli.config {
        Some(path) => KibanaConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => KibanaConfig::default(),
    };
    if let Some(address) = &cli.address {
        config.address = address.clone();
    }
    if let Some(username) = &cli.username {
        config.username = Some(username.clone());
    }
    if let Some(password) = &cli.password {
        config.password = Some(password.clone());
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    config.validate()?;
    Ok(config)
}

fn connect(cli: &Cli) -> anyhow::Result<KibanaClient> {
    let config = resolve_config(cli)?;
    debug!(address = %config.address, "connecting to kibana");
    Ok(KibanaClient::new(config)?)
}

fn read_resource<R: Resource>(path: &Path) -> anyhow::Result<R> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid {}", path.display(), R::KIND))
}

fn read_optional<R: Resource>(path: Option<&Path>) -> anyhow::Result<Option<R>> {
    path.map(|p| read_resource::<R>(p)).transpose()
}

fn maker(ignore: &[String]) -> PatchMaker {
    let options = ignore
        .iter()
        .fold(PatchOptions::default(), |options, path| options.ignore(path));
    PatchMaker::new(options)
}

async fn cmd_diff<R: Resource>(args: &DiffArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let expected: R = read_resource(&args.expected)?;
    let actual: Option<R> = read_optional(args.actual.as_deref())?;
    let original: Option<R> = read_optional(args.original.as_deref())?;

    let result = adapter::diff_with(&maker(&args.ignore), actual.as_ref(), &expected, original.as_ref())?;
    report(&expected, planned(&result), false, &result, format)
}

async fn cmd_get<R: Resource>(client: &KibanaClient, id: &str) -> anyhow::Result<()>
where
    KibanaClient: ResourceClient<R>,
{
    match ResourceClient::<R>::get(client, id).await? {
        Some(resource) => {
            println!("{}", serde_json::to_string_pretty(&resource)?);
            Ok(())
        }
        None => bail!("{} {id} not found", R::KIND),
    }
}

async fn cmd_delete<R: Resource>(client: &KibanaClient, id: &str, format: &OutputFormat) -> anyhow::Result<()>
where
    KibanaClient: ResourceClient<R>,
{
    ResourceClient::<R>::delete(client, id).await?;
    match format {
        OutputFormat::Text => println!("{} Deleted {} {}", "✓".green().bold(), R::KIND, id.yellow()),
        OutputFormat::Json => println!("{}", json!({"kind": R::KIND, "id": id, "deleted": true})),
    }
    Ok(())
}

async fn cmd_apply<R: Resource>(client: &KibanaClient, args: &ApplyArgs, format: &OutputFormat) -> anyhow::Result<()>
where
    KibanaClient: ResourceClient<R>,
{
    let expected: R = read_resource(&args.expected)?;
    let original: Option<R> = read_optional(args.original.as_deref())?;
    let reconciler = Reconciler::new(maker(&args.ignore));

    let rec = if args.dry_run {
        reconciler.plan(client, &expected, original.as_ref()).await?
    } else {
        reconciler.reconcile(client, &expected, original.as_ref()).await?
    };
    report(&expected, rec.outcome, !args.dry_run, &rec.result, format)
}

/// What a submission of `result` would do.
fn planned<R>(result: &PatchResult<R>) -> Outcome {
    if result.is_empty() {
        Outcome::Unchanged
    } else if result.is_creation() {
        Outcome::Created
    } else {
        Outcome::Updated
    }
}

fn report<R: Resource>(
    expected: &R,
    outcome: Outcome,
    applied: bool,
    result: &PatchResult<R>,
    format: &OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary(expected, outcome, applied, result)?)?);
        }
        OutputFormat::Text => {
            let key = expected.key();
            let line = match (outcome, applied) {
                (Outcome::Created, true) => format!("{} Created {}", "+".green().bold(), key.bold()),
                (Outcome::Created, false) => format!("{} {} will be created", "+".green().bold(), key.bold()),
                (Outcome::Updated, true) => format!("{} Updated {}", "~".yellow().bold(), key.bold()),
                (Outcome::Updated, false) => format!("{} {} needs update", "~".yellow().bold(), key.bold()),
                (Outcome::Unchanged, _) => format!("{} {} is up to date", "✓".green(), key.bold()),
            };
            println!("{line}");
            if !result.is_empty() {
                println!("  Patch: {}", result.patch_str().cyan());
                println!("  Fingerprint: {}", result.modified_fingerprint().short().dimmed());
                print_diff(&result.unified_diff());
            }
        }
    }
    Ok(())
}

fn summary<R: Resource>(
    expected: &R,
    outcome: Outcome,
    applied: bool,
    result: &PatchResult<R>,
) -> anyhow::Result<Value> {
    let patch: Value = serde_json::from_slice(&result.patch)?;
    Ok(json!({
        "kind": R::KIND,
        "id": expected.id(),
        "outcome": outcome.to_string(),
        "applied": applied,
        "empty": result.is_empty(),
        "patch": patch,
        "fingerprint": result.modified_fingerprint().to_hex(),
        "patched": serde_json::to_value(&result.patched)?,
    }))
}

fn print_diff(diff: &str) {
    for line in diff.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.bold()
        } else if line.starts_with('+') {
            line.green()
        } else if line.starts_with('-') {
            line.red()
        } else if line.starts_with("@@") {
            line.cyan()
        } else {
            line.normal()
        };
        println!("  {styled}");
    }
}
