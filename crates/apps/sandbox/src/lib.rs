//! Headless sandbox: generates terrain and drives a scripted player over it

pub mod cli;
pub mod config;
pub mod script;

use anyhow::Context;
use glam::Vec3;
use landfall_physics::{Capsule, Simulation, World};
use landfall_terrain::{SimplexField, TerrainMesh};

use crate::config::SandboxConfig;

/// Totals gathered over a run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub launches: u64,
    pub respawns: u64,
    pub parked: u64,
    pub regenerations: u64,
    /// Frames that ended with the player standing on the floor
    pub grounded_frames: u64,
    /// Player eye position after the last frame
    pub final_position: [f32; 3],
}

/// Run the scripted sequence described by `config.run`
pub fn run(config: &SandboxConfig) -> anyhow::Result<RunSummary> {
    config.validate()?;
    let run = &config.run;

    let mut sim_config = config.simulation.clone();
    let world = World::generate(
        &config.terrain,
        &SimplexField::new(run.seed),
        sim_config.octree,
    )
    .context("Failed to generate terrain")?;
    if run.lift_spawn {
        sim_config.player.spawn = lifted_spawn(world.mesh(), sim_config.player.spawn);
    }
    let mut sim = Simulation::from_world(sim_config, world).context("Failed to create simulation")?;

    tracing::info!(
        seed = run.seed,
        frames = run.frames,
        triangles = sim.mesh().triangle_count(),
        "Starting sandbox run"
    );

    let mut summary = RunSummary::default();
    for frame in 0..run.frames {
        if run.regenerate_at == Some(frame) {
            let seed = run.regeneration_seed();
            sim.regenerate(&config.terrain, &SimplexField::new(seed))
                .with_context(|| format!("Failed to regenerate terrain on frame {frame}"))?;
            summary.regenerations += 1;
        }

        let intents = script::intents_for(frame, run, sim.view());
        let report = sim.step(run.frame_time, &intents);

        summary.frames += 1;
        summary.launches += u64::from(report.launched.is_some());
        summary.respawns += u64::from(report.respawned);
        summary.parked += report.parked as u64;
        summary.grounded_frames += u64::from(sim.on_floor());

        if report.respawned {
            tracing::warn!(frame, "Player fell out of the world");
        }
        if run.report_every > 0 && frame % run.report_every == 0 {
            tracing::info!(
                frame,
                position = ?sim.view().position,
                velocity = ?sim.player_velocity(),
                on_floor = sim.on_floor(),
                mode = ?sim.mode(),
                active_spheres = sim.active_sphere_count(),
                "Frame"
            );
        }
    }

    summary.final_position = sim.view().position.to_array();
    tracing::info!(?summary, "Sandbox run finished");
    Ok(summary)
}

/// Raise `spawn` so its lower sphere clears the terrain cell beneath it
pub fn lifted_spawn(mesh: &TerrainMesh, mut spawn: Capsule) -> Capsule {
    let Some(ground) = mesh.cell_max_height(spawn.start.x, spawn.start.z) else {
        return spawn;
    };

    let lift = ground + spawn.radius - spawn.start.y;
    if lift > 0.0 {
        spawn.translate(Vec3::Y * lift);
        tracing::debug!(lift, ground, "Lifted spawn above terrain");
    }
    spawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunConfig;
    use landfall_terrain::{generate, ConstantField, TerrainConfig};

    fn short_run() -> SandboxConfig {
        SandboxConfig {
            terrain: TerrainConfig {
                area: 60.0,
                resolution: 20,
                ..TerrainConfig::default()
            },
            run: RunConfig {
                frames: 120,
                launch_every: 20,
                jump_every: 50,
                regenerate_at: Some(60),
                report_every: 0,
                ..RunConfig::default()
            },
            ..SandboxConfig::default()
        }
    }

    #[test]
    fn test_short_run() {
        let summary = run(&short_run()).unwrap();

        assert_eq!(summary.frames, 120);
        // Frames 20, 40, ..., 100
        assert_eq!(summary.launches, 5);
        assert_eq!(summary.regenerations, 1);
        assert!(summary.grounded_frames > 0);
        assert!(summary.final_position.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_run_is_deterministic() {
        let a = run(&short_run()).unwrap();
        let b = run(&short_run()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_lifted_spawn() {
        let config = TerrainConfig {
            area: 10.0,
            resolution: 5,
            octaves: 1,
            ..TerrainConfig::default()
        };
        // Floor at 0.1 * 10 * 2 = 2
        let mesh = generate(&config, &ConstantField(2.0)).unwrap();
        let spawn = Capsule::new(Vec3::new(0.0, 0.35, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.35);

        let lifted = lifted_spawn(&mesh, spawn);
        assert!((lifted.start.y - 2.35).abs() < 1e-5, "Got {:?}", lifted);
        assert!((lifted.end.y - 3.0).abs() < 1e-5);

        let high = Capsule::new(Vec3::new(0.0, 8.0, 0.0), Vec3::new(0.0, 8.65, 0.0), 0.35);
        assert_eq!(lifted_spawn(&mesh, high), high);

        let outside = Capsule::new(Vec3::new(50.0, 0.0, 0.0), Vec3::new(50.0, 0.65, 0.0), 0.35);
        assert_eq!(lifted_spawn(&mesh, outside), outside);
    }

    #[test]
    fn test_invalid_config_fails_before_running() {
        let mut config = short_run();
        config.simulation.substeps = 0;
        assert!(run(&config).is_err());
    }
}
