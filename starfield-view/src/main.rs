//! Application entry point for the starfield viewer.
//!
//! This binary parses the command line, sets up logging, loads an optional
//! JSON config, and delegates all per-frame work to [`StarfieldApp`].
//!
//! ```bash
//! starfield --seed 42 --config tuning.json --log-level debug
//! ```

mod painter;
mod viewer;

use anyhow::Context;
use clap::Parser;
use starfield_core::{Config, Viewport};
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use viewer::StarfieldApp;

#[derive(Parser, Debug)]
#[command(name = "starfield")]
#[command(version, about = "Animated constellation background", long_about = None)]
struct Cli {
    /// JSON file overriding any subset of the tuning constants
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// RNG seed; random if omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Window width
    #[arg(long, default_value = "1280")]
    width: f32,

    /// Window height
    #[arg(long, default_value = "800")]
    height: f32,
}

fn log_level(name: &str) -> Level {
    match name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Starts the native eframe application.
///
/// ### Returns
/// - `Ok(())` if the window ran to completion.
/// - `Err` if the config could not be loaded or eframe failed to create the
///   native window or event loop.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(&cli.log_level))
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cfg = match &cli.config {
        Some(path) => Config::from_json_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::default(),
    };
    let seed = cli.seed.unwrap_or_else(rand::random);
    info!(seed, version = env!("CARGO_PKG_VERSION"), "starting starfield");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Constellation")
            .with_inner_size([cli.width, cli.height]),
        ..Default::default()
    };
    let initial = Viewport::new(cli.width, cli.height);

    eframe::run_native(
        "Constellation",
        options,
        Box::new(move |_cc| Ok(Box::new(StarfieldApp::new(cfg, seed, initial)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))
}
