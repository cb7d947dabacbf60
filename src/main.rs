//! Motion Sentry - Pointer Motion Anomaly Pipeline
//!
//! Replays captured pointer traces through gesture engines and submits
//! motion batches to a remote anomaly scoring service.

use motion_sentry::app::cli::{Cli, Commands, ConfigAction};
use motion_sentry::app::config::Config;
use motion_sentry::app::replay;
use motion_sentry::telemetry::{HttpSink, MemorySink, TelemetrySink};
use motion_sentry::time::MonoClock;
use motion_sentry::trace::Trace;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments first so we can use --verbose to set log level
    let cli = Cli::parse_args();

    // Initialize tracing (--verbose enables debug-level output)
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    // Initialize the monotonic clock origin
    MonoClock::init();

    // Load config
    let config = if let Some(path) = &cli.config {
        Config::load(path)?
    } else {
        Config::load_default()?
    };

    match cli.command {
        Commands::Replay {
            input,
            engine,
            dry_run,
        } => {
            run_replay(&input, engine.into(), dry_run, &config).await?;
        }
        Commands::Inspect { input } => {
            run_inspect(&input)?;
        }
        Commands::Init { force } => {
            run_init(force, &config)?;
        }
        Commands::Config { action } => {
            run_config(action, &config)?;
        }
    }

    Ok(())
}

async fn run_replay(
    input: &std::path::Path,
    kind: motion_sentry::engines::EngineKind,
    dry_run: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let trace = Trace::load(input)?;
    info!(
        name = %trace.metadata.name,
        events = trace.len(),
        "loaded trace"
    );

    let sink: Box<dyn TelemetrySink> = if dry_run {
        Box::new(MemorySink::new(0.0))
    } else {
        Box::new(HttpSink::new(
            config.sink.base_url.clone(),
            std::time::Duration::from_secs(config.sink.timeout_secs),
        )?)
    };

    let summary = replay::run(config, &trace, kind, sink.as_ref()).await?;

    println!("Replay of '{}' ({} engine)", trace.metadata.name, kind);
    println!("  events processed:  {}", summary.events_processed);
    println!("  batches submitted: {}", summary.batches_submitted);
    println!("  batches dropped:   {}", summary.batches_dropped);
    println!("  peak game score:   {}", summary.peak_game_score);
    match (summary.last_result, summary.bucket()) {
        (Some(score), Some(bucket)) => {
            println!("  anomaly score:     {:.4} ({})", score, bucket);
        }
        _ => println!("  anomaly score:     n/a (no batch scored)"),
    }

    Ok(())
}

fn run_inspect(input: &std::path::Path) -> anyhow::Result<()> {
    let trace = Trace::load(input)?;

    println!("Trace:    {}", trace.metadata.name);
    println!("ID:       {}", trace.metadata.id);
    println!("Format:   {}", trace.metadata.format_version);
    println!("Started:  {}", trace.metadata.started_at);
    if let Some(ended) = trace.metadata.ended_at {
        println!("Ended:    {}", ended);
    }
    println!("Events:   {}", trace.len());
    println!("Span:     {} ms", trace.span().as_millis());
    println!(
        "Surface:  {}x{} at ({}, {})",
        trace.surface.width, trace.surface.height, trace.surface.left, trace.surface.top
    );

    let motion = trace.events.iter().filter(|e| e.kind.is_motion()).count();
    let starts = trace.events.iter().filter(|e| e.kind.is_start()).count();
    let ends = trace
        .events
        .iter()
        .filter(|e| e.kind.is_termination())
        .count();
    println!("  motion events:      {}", motion);
    println!("  start events:       {}", starts);
    println!("  termination events: {}", ends);

    Ok(())
}

fn run_init(force: bool, config: &Config) -> anyhow::Result<()> {
    let path = Config::default_path();

    if path.exists() && !force {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }

    config.save(&path)?;
    println!("Config written to {}", path.display());
    Ok(())
}

fn run_config(action: ConfigAction, config: &Config) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            println!("{}", config.to_toml()?);
        }
        ConfigAction::Reset { force } => {
            if !force {
                println!("Pass --force to reset the config to defaults");
                return Ok(());
            }
            let defaults = Config::default();
            defaults.save_default()?;
            println!("Config reset to defaults at {}", Config::default_path().display());
        }
    }
    Ok(())
}
