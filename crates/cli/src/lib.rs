use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use landlord_engine::{is_compatible, jaccard_distance, tokenize, ContainerSpec, Settings};
use serde::Serialize;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

mod driver;
mod report;
mod source;

use driver::ReplayOptions;
use source::ReadOptions;

const THRESHOLD_ENV: &str = "LANDLORD_SIMILARITY_THRESHOLD";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "landlord")]
#[command(about = "Decide build/merge/reuse for container software specifications", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// JSON or TOML config file (similarity_threshold, sample_every)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Merge-eligibility cutoff on Jaccard distance (overrides LANDLORD_SIMILARITY_THRESHOLD)
    #[arg(long, global = true)]
    threshold: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON Lines stream of spec records through the engine
    Run(RunArgs),

    /// Show distance and pin compatibility between two specs
    Distance(DistanceArgs),
}

#[derive(Args)]
struct RunArgs {
    /// JSON Lines input (defaults to stdin)
    input: Option<PathBuf>,

    /// Stop after this many specs were decided
    #[arg(long)]
    limit: Option<usize>,

    /// Log counters every N decided specs
    #[arg(long)]
    sample_every: Option<usize>,

    /// Feed specs without any requirement to the engine instead of skipping them
    #[arg(long)]
    keep_empty: bool,

    /// Skip records whose apt package names are not lowercase Debian names
    #[arg(long)]
    strict_apt: bool,

    /// Output JSON format
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to this file
    #[arg(long)]
    out_json: Option<PathBuf>,

    /// Write the final environment specs as JSON
    #[arg(long)]
    dump_specs: Option<PathBuf>,
}

#[derive(Args)]
struct DistanceArgs {
    /// First spec as JSON, e.g. '{"pip":["numpy==1.0"]}'
    left: String,

    /// Second spec as JSON
    right: String,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct DistanceOutput {
    distance: f64,
    compatible: bool,
    left_contains_right: bool,
    right_contains_left: bool,
    mergeable: bool,
}

pub async fn main_entry() -> Result<()> {
    let mut cli = Cli::parse();

    let json_output = match &cli.command {
        Commands::Run(args) => args.json,
        Commands::Distance(args) => args.json,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let settings = resolve_settings(cli.config.as_deref(), cli.threshold)?;

    match cli.command {
        Commands::Run(args) => run_stream(args, settings).await?,
        Commands::Distance(args) => run_distance(args, settings)?,
    }

    Ok(())
}

/// Defaults, then config file, then environment, then flags
fn resolve_settings(config: Option<&Path>, threshold: Option<f64>) -> Result<Settings> {
    let mut settings = match config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Settings::default(),
    };

    if let Ok(raw) = env::var(THRESHOLD_ENV) {
        let value: f64 = raw
            .trim()
            .parse()
            .with_context(|| format!("{THRESHOLD_ENV} is not a number: {raw:?}"))?;
        settings = settings
            .with_threshold(value)
            .with_context(|| format!("Invalid {THRESHOLD_ENV}"))?;
    }
    if let Some(value) = threshold {
        settings = settings
            .with_threshold(value)
            .context("Invalid --threshold")?;
    }
    Ok(settings)
}

async fn run_stream(args: RunArgs, settings: Settings) -> Result<()> {
    let settings = match args.sample_every {
        Some(every) => settings
            .with_sample_every(every)
            .context("Invalid --sample-every")?,
        None => settings,
    };
    log::info!(
        "Replaying {} (similarity_threshold={}, sample_every={})",
        args.input
            .as_deref()
            .map_or_else(|| "stdin".to_string(), |p| p.display().to_string()),
        settings.engine.similarity_threshold(),
        settings.sample_every
    );

    let reader = source::open_input(args.input.as_deref()).await?;
    let options = ReplayOptions {
        read: ReadOptions {
            keep_empty: args.keep_empty,
            strict_apt: args.strict_apt,
        },
        limit: args.limit,
    };
    let outcome = driver::replay(reader, &settings, options).await?;

    let report = report::RunReport::new(
        &outcome.stats,
        outcome.skipped,
        outcome.engine.len(),
        &settings,
    );

    if let Some(path) = &args.out_json {
        write_json(path, &report).await?;
    }
    if let Some(path) = &args.dump_specs {
        write_json(path, outcome.engine.specs()).await?;
    }

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&report)?)?;
    } else {
        print_stdout(report::render_text(&report).trim_end())?;
    }
    Ok(())
}

fn run_distance(args: DistanceArgs, settings: Settings) -> Result<()> {
    let left: ContainerSpec =
        serde_json::from_str(&args.left).context("Invalid left spec JSON")?;
    let right: ContainerSpec =
        serde_json::from_str(&args.right).context("Invalid right spec JSON")?;
    let left = tokenize(&left);
    let right = tokenize(&right);

    let distance = jaccard_distance(&left, &right);
    let compatible = is_compatible(&left, &right);
    let output = DistanceOutput {
        distance,
        compatible,
        left_contains_right: right.is_subset(&left),
        right_contains_left: left.is_subset(&right),
        mergeable: compatible && settings.engine.admits(distance),
    };

    if args.json {
        print_stdout(&serde_json::to_string_pretty(&output)?)?;
    } else {
        print_stdout(&format!(
            "distance: {:.4}\ncompatible: {}\nmergeable: {}",
            output.distance, output.compatible, output.mergeable
        ))?;
    }
    Ok(())
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let body = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, body)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))
}
