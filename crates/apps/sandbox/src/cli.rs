//! Command line arguments

use clap::Parser;
use std::path::PathBuf;

use crate::config::SandboxConfig;

/// Headless terrain sandbox
///
/// Generates terrain, then walks a player across it while jumping and
/// throwing spheres, logging poses as it goes.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sandbox")]
#[command(about = "Headless terrain physics sandbox")]
pub struct Args {
    /// Load configuration from a TOML file
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, value_name = "FRAMES")]
    pub frames: Option<u64>,

    /// Noise seed for the initial terrain
    #[arg(long, short = 's')]
    pub seed: Option<u32>,

    /// Regenerate the terrain on this frame
    #[arg(long, value_name = "FRAME")]
    pub regenerate_at: Option<u64>,

    /// Seed used when regenerating
    #[arg(long, value_name = "SEED")]
    pub regenerate_seed: Option<u32>,

    /// Default log filter when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    /// Override file values with the flags that were given
    pub fn apply_to(&self, mut config: SandboxConfig) -> SandboxConfig {
        if let Some(frames) = self.frames {
            config.run.frames = frames;
        }
        if let Some(seed) = self.seed {
            config.run.seed = seed;
        }
        if let Some(frame) = self.regenerate_at {
            config.run.regenerate_at = Some(frame);
        }
        if let Some(seed) = self.regenerate_seed {
            config.run.regenerate_seed = Some(seed);
        }
        config
    }
}
