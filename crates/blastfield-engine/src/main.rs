//! # Blastfield
//!
//! Headless driver for particle explosions: explodes an image (or a
//! generated test card) on a canvas and writes the animation as PNG frames.
//!
//! Usage: `blastfield [config.toml]`. Set `BLASTFIELD_LOG_JSON=1` for JSON
//! log lines; `RUST_LOG` filters as usual.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(clippy::unwrap_used)]

mod app;
mod config;
mod timing;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::EngineConfig;

/// Main entry point.
fn main() -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("blastfield=info".parse()?);
    if std::env::var_os("BLASTFIELD_LOG_JSON").is_some() {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }

    info!("Blastfield starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let path = EngineConfig::config_path(std::env::args().skip(1));
    let mut config = EngineConfig::load_from(&path);
    config.validate();

    let summary = app::run(&config)?;
    info!(
        "Done: seed {}, {} particles, {} frames ({} written), explosion {}",
        summary.seed,
        summary.session.particles,
        summary.frames,
        summary.frames_written,
        if summary.completed { "completed" } else { "cut short" }
    );
    Ok(())
}
