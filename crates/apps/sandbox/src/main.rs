//! Landfall sandbox
//!
//! Generates terrain and runs a scripted walk across it without a window.
//! Use `--config <path>` to load a TOML file and `RUST_LOG` or `--log` to
//! control output.

use anyhow::Context;
use clap::Parser;
use sandbox::cli::Args;
use sandbox::config::SandboxConfig;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match args.config {
        Some(ref path) => SandboxConfig::load(path)?,
        None => SandboxConfig::default(),
    };
    let config = args.apply_to(config);

    let summary = sandbox::run(&config).context("Sandbox run failed")?;

    println!(
        "{} frames, {} launches, {} respawns, {} spheres lost, {} regenerations",
        summary.frames, summary.launches, summary.respawns, summary.parked, summary.regenerations
    );
    Ok(())
}
