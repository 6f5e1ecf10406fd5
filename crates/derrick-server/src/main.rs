//! The derrickd daemon binary.
//!
//! Serves the read-only status board API over HTTP. Issue data comes from
//! the tracker CLI in the configured working directory; clients poll, the
//! daemon never pushes.

use clap::Parser;
use derrick::store::CliStore;
use derrick::town::FsTownStore;
use derrick_server::{AppState, serve};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Read-only status board daemon for an agent-town issue tracker.
#[derive(Parser, Debug)]
#[command(name = "derrickd", version, about)]
struct Args {
    /// HTTP server port
    #[arg(long, default_value_t = 7070)]
    port: u16,

    /// HTTP server host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Working directory the tracker CLI runs in
    #[arg(long, default_value = ".")]
    dir: PathBuf,

    /// Tracker CLI program (name on PATH or an absolute path)
    #[arg(long, default_value = "bd")]
    store_bin: String,

    /// Town workspace root (defaults to ~/gt)
    #[arg(long)]
    town: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=derrick=debug,derrick_server=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("derrick=info,derrick_server=info")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let town_root = args.town.unwrap_or_else(FsTownStore::default_root);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        dir = %args.dir.display(),
        store = %args.store_bin,
        town = %town_root.display(),
        "starting derrickd"
    );

    let store = CliStore::new(&args.dir).with_program(args.store_bin.as_str());
    let town = FsTownStore::new(town_root);
    let state = Arc::new(AppState::new(Box::new(store), Box::new(town)));

    serve(state, &args.host, args.port).await
}
