//! GirlsHelp CLI
//!
//! Drives the core from a terminal: walks one help request through its
//! lifecycle in real time, or renders a fuzzy map batch.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gh_core::api::LifecycleSnapshot;
use gh_core::{
    ActorRole, CoreConfig, LifecycleManager, Point2, ProximityEngine, RequestStatus, Selection,
};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gh")]
#[command(about = "Help request lifecycle and fuzzy map simulator", long_about = None)]
struct Cli {
    /// Config file (JSON or YAML). Falls back to GH_CONFIG_PATH, then defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in preset, used when no config file is given
    #[arg(long, global = true, value_enum)]
    preset: Option<Preset>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Preset {
    Realistic,
    Quick,
    Deterministic,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a request and follow it until it is answered or cancelled
    Simulate {
        /// pad, tissue, safety or other
        #[arg(long, default_value = "pad")]
        kind: String,

        /// Optional free-text note
        #[arg(long, default_value = "")]
        note: String,

        /// Cancel after this many milliseconds
        #[arg(long)]
        cancel_after_ms: Option<u64>,

        /// Resolve as soon as someone answers
        #[arg(long, default_value = "false")]
        resolve: bool,

        /// Timer poll interval
        #[arg(long, default_value = "20")]
        poll_ms: u64,

        /// Print the final snapshot as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Generate one fuzzy map batch
    Map {
        /// Number of points (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Probability that a point is a seeker (default from config)
        #[arg(long)]
        role_ratio: Option<f64>,

        /// Seed for a reproducible batch
        #[arg(long)]
        seed: Option<u64>,

        /// Show the detail line for this point id
        #[arg(long)]
        select: Option<u32>,

        /// Print the batch as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref(), cli.preset)?;

    match cli.command {
        Commands::Simulate { kind, note, cancel_after_ms, resolve, poll_ms, json } => {
            simulate(&config, &kind, note, cancel_after_ms, resolve, poll_ms, json)
        }
        Commands::Map { count, role_ratio, seed, select, json } => {
            render_map(&config, count, role_ratio, seed, select, json)
        }
    }
}

fn load_config(path: Option<&PathBuf>, preset: Option<Preset>) -> Result<CoreConfig> {
    if let Some(path) = path {
        return CoreConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display()));
    }
    match preset {
        Some(Preset::Realistic) => Ok(CoreConfig::realistic()),
        Some(Preset::Quick) => Ok(CoreConfig::quick()),
        Some(Preset::Deterministic) => Ok(CoreConfig::deterministic()),
        None => CoreConfig::from_env_or_default().context("Failed to load config from environment"),
    }
}

fn simulate(
    config: &CoreConfig,
    kind: &str,
    note: String,
    cancel_after_ms: Option<u64>,
    resolve: bool,
    poll_ms: u64,
    json: bool,
) -> Result<()> {
    let mut manager = LifecycleManager::with_config(config.lifecycle.clone())
        .context("Invalid lifecycle config")?;
    manager.on_status_change(|change| match change.status {
        RequestStatus::Requesting => println!("📣 Calling nearby helpers..."),
        RequestStatus::Active => match &change.responder {
            Some(responder) => println!("💗 Someone responded ({})", responder.id),
            None => println!("💗 Someone responded"),
        },
        RequestStatus::Resolved => println!("✅ Help completed, thank you!"),
        RequestStatus::Idle => println!("   Back to idle"),
    });

    let request_id = manager.submit_str(kind, note).context("Failed to submit request")?;
    info!(request = %request_id, "Simulation started");

    let started = Instant::now();
    let cancel_after = cancel_after_ms.map(Duration::from_millis);
    let poll = Duration::from_millis(poll_ms.max(1));

    loop {
        if cancel_after.is_some_and(|after| started.elapsed() >= after) {
            manager.cancel().context("Failed to cancel request")?;
            break;
        }

        manager.poll();

        match manager.current_status() {
            RequestStatus::Active => {
                if resolve {
                    manager.resolve().context("Failed to resolve request")?;
                }
                break;
            }
            RequestStatus::Requesting if !manager.has_pending_search() => {
                warn!("Nobody answered, giving up");
                manager.cancel().context("Failed to cancel request")?;
                break;
            }
            RequestStatus::Idle | RequestStatus::Resolved => break,
            RequestStatus::Requesting => thread::sleep(poll),
        }
    }

    if json {
        let snapshot = LifecycleSnapshot::capture(&manager);
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn render_map(
    config: &CoreConfig,
    count: Option<usize>,
    role_ratio: Option<f64>,
    seed: Option<u64>,
    select: Option<u32>,
    json: bool,
) -> Result<()> {
    let proximity = config.proximity.clone();
    let count = count.unwrap_or(proximity.default_count);
    let role_ratio = role_ratio.unwrap_or(proximity.default_role_ratio);

    let mut engine = match seed {
        Some(seed) => ProximityEngine::with_seed(proximity, seed),
        None => ProximityEngine::new(proximity),
    }?;
    let batch = engine.generate_fuzzy_batch(Point2::ORIGIN, count, role_ratio)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&batch)?);
    } else {
        println!("🧭 You are here (fuzzy position)");
        for point in &batch {
            let marker = match point.role() {
                ActorRole::Helper => "🌸 helper",
                ActorRole::Seeker => "🆘 seeker",
            };
            let pos = point.fuzzy_position();
            println!(
                "  #{:<3} {:<10} ({:>7.1}, {:>7.1})  ~{} m",
                point.id(),
                marker,
                pos.x,
                pos.y,
                point.distance_estimate()
            );
        }
    }

    if let Some(id) = select {
        let mut selection = Selection::new();
        match selection.select(&batch, id) {
            Some(point) => println!("{}", point.describe()),
            None => warn!(id, "No such point in this batch"),
        }
    }
    Ok(())
}
