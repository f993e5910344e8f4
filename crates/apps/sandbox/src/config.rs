//! Sandbox configuration file
//!
//! A TOML document with optional `[terrain]`, `[simulation]` and `[run]`
//! tables. Missing tables and keys fall back to their defaults.

use std::path::Path;

use anyhow::Context;
use landfall_physics::SimulationConfig;
use landfall_terrain::TerrainConfig;
use serde::{Deserialize, Serialize};

/// Scripted run parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Number of frames to simulate
    pub frames: u64,
    /// Seconds per frame handed to the simulation
    pub frame_time: f32,
    /// Noise seed for the initial terrain
    pub seed: u32,
    /// Yaw change per frame in radians
    pub turn_rate: f32,
    /// Jump every N frames, 0 disables
    pub jump_every: u64,
    /// Throw a sphere every N frames, 0 disables
    pub launch_every: u64,
    /// Hold time of each throw in seconds
    pub launch_charge: f32,
    /// Regenerate the terrain on this frame
    pub regenerate_at: Option<u64>,
    /// Seed used for regeneration; defaults to `seed + 1`
    pub regenerate_seed: Option<u32>,
    /// Move the spawn capsule up onto the generated surface
    pub lift_spawn: bool,
    /// Log the player pose every N frames, 0 disables
    pub report_every: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_time: 1.0 / 60.0,
            seed: 1,
            turn_rate: 0.004,
            jump_every: 90,
            launch_every: 45,
            launch_charge: 0.5,
            regenerate_at: None,
            regenerate_seed: None,
            lift_spawn: true,
            report_every: 60,
        }
    }
}

impl RunConfig {
    pub fn regeneration_seed(&self) -> u32 {
        self.regenerate_seed.unwrap_or_else(|| self.seed.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    pub terrain: TerrainConfig,
    pub simulation: SimulationConfig,
    pub run: RunConfig,
}

impl SandboxConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("Failed to parse sandbox config")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Check every section before any terrain is generated
    pub fn validate(&self) -> anyhow::Result<()> {
        self.terrain.validate().context("Invalid [terrain] section")?;
        self.simulation
            .validate()
            .context("Invalid [simulation] section")?;
        anyhow::ensure!(
            self.run.frame_time.is_finite() && self.run.frame_time >= 0.0,
            "run.frame_time must be a non-negative number, got {}",
            self.run.frame_time
        );
        anyhow::ensure!(
            self.run.turn_rate.is_finite(),
            "run.turn_rate must be finite"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config = SandboxConfig::from_toml("").unwrap();
        assert_eq!(config, SandboxConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_sections() {
        let config = SandboxConfig::from_toml(
            r#"
            [terrain]
            area = 120.0
            resolution = 40
            flatten_threshold = 0.1
            flatness_strength = 0.3

            [simulation]
            sphere_count = 20

            [simulation.launch]
            base_impulse = 10.0

            [run]
            frames = 30
            regenerate_at = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.terrain.area, 120.0);
        assert_eq!(config.terrain.resolution, 40);
        assert_eq!(config.terrain.octaves, 5);
        assert_eq!(config.simulation.sphere_count, 20);
        assert_eq!(config.simulation.launch.base_impulse, 10.0);
        assert_eq!(config.run.frames, 30);
        assert_eq!(config.run.regenerate_at, Some(10));
        assert_eq!(config.run.regeneration_seed(), 2);
    }

    #[test]
    fn test_invalid_terrain_reported() {
        let config = SandboxConfig::from_toml("[terrain]\nresolution = 0\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("[terrain]"), "Got {err:#}");
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(SandboxConfig::from_toml("[run]\nframes = \"many\"\n").is_err());
    }

    #[test]
    fn test_sample_config_parses() {
        let text = include_str!("../config/sandbox.toml");
        let config = SandboxConfig::from_toml(text).unwrap();
        assert!(config.validate().is_ok());
    }
}
