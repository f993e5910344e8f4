//! Frame-synchronous stepping of the player and spheres over the world
//!
//! Each [`Simulation::step`] processes per-frame input once, then splits the
//! clamped frame time into equal substeps. Every substep runs controls, the
//! player, each active sphere, sphere pairs and the out-of-bounds check, in
//! that order.

use std::time::Instant;

use glam::Vec3;
use landfall_terrain::{NoiseField, TerrainConfig, TerrainMesh};

use crate::body::{BodyPool, DynamicBody};
use crate::config::SimulationConfig;
use crate::controls::{ControlIntents, ControlMode, Launch, ViewPose};
use crate::error::Result;
use crate::resolver::{
    resolve_capsule_against_world, resolve_player_sphere, resolve_sphere_against_world,
    resolve_sphere_sphere,
};
use crate::shape::Capsule;
use crate::world::World;

/// What happened during one [`Simulation::step`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Frame time actually simulated after clamping
    pub simulated: f32,
    /// Length of each substep
    pub dt: f32,
    /// Pool index of the sphere launched this frame
    pub launched: Option<usize>,
    /// The player fell out of the world and was respawned
    pub respawned: bool,
    /// Spheres that fell out of the world and were parked
    pub parked: usize,
}

/// Player, spheres and the world they collide with
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimulationConfig,
    world: World,
    capsule: Capsule,
    player_velocity: Vec3,
    on_floor: bool,
    mode: ControlMode,
    view: ViewPose,
    bodies: BodyPool,
}

impl Simulation {
    /// Generate the world and place the player at its spawn capsule
    ///
    /// # Errors
    /// Fails if either configuration is invalid.
    pub fn new(
        config: SimulationConfig,
        terrain: &TerrainConfig,
        noise: &impl NoiseField,
    ) -> Result<Self> {
        config.validate()?;
        let world = World::generate(terrain, noise, config.octree)?;
        Ok(Self::with_world(config, world))
    }

    /// Use an already built world
    ///
    /// # Errors
    /// Fails if `config` is invalid.
    pub fn from_world(config: SimulationConfig, world: World) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_world(config, world))
    }

    fn with_world(config: SimulationConfig, world: World) -> Self {
        let capsule = config.player.spawn;
        let bodies = BodyPool::new(
            config.sphere_count,
            config.sphere_radius,
            config.parking_position,
        );

        tracing::debug!(
            spheres = config.sphere_count,
            substeps = config.substeps,
            gravity = config.gravity,
            "Created simulation"
        );

        Self {
            view: ViewPose::new(capsule.end),
            capsule,
            player_velocity: Vec3::ZERO,
            on_floor: false,
            mode: ControlMode::default(),
            bodies,
            world,
            config,
        }
    }

    /// Replace the world with one generated from new parameters
    ///
    /// The player and spheres keep their state. On error the current world
    /// stays in place.
    pub fn regenerate(&mut self, terrain: &TerrainConfig, noise: &impl NoiseField) -> Result<()> {
        let start = Instant::now();
        let world = World::generate(terrain, noise, self.config.octree)?;
        self.world = world;

        tracing::info!(
            area = terrain.area,
            resolution = terrain.resolution,
            elapsed_ms = start.elapsed().as_secs_f32() * 1000.0,
            "Regenerated world"
        );
        Ok(())
    }

    /// Advance by one rendered frame of `elapsed` seconds
    pub fn step(&mut self, elapsed: f32, intents: &ControlIntents) -> StepReport {
        let mut report = StepReport::default();

        self.view.look(intents.look);

        if intents.toggle_mode {
            self.mode = self.mode.toggled();
            self.player_velocity = Vec3::ZERO;
            tracing::debug!(mode = ?self.mode, "Switched control mode");
        }

        if let Some(launch) = intents.launch {
            report.launched = self.launch(launch);
        }

        let simulated = self.clamp_frame_time(elapsed);
        let dt = simulated / self.config.substeps as f32;
        report.simulated = simulated;
        report.dt = dt;

        for _ in 0..self.config.substeps {
            self.apply_controls(intents, dt);
            if self.mode == ControlMode::Simulated {
                self.update_player(dt);
            }
            self.update_spheres(dt);
            resolve_sphere_sphere(self.bodies.as_mut_slice());

            report.respawned |= self.respawn_if_out_of_bounds();
            report.parked += self.bodies.park_below(self.config.out_of_bounds_height);
        }

        report
    }

    fn clamp_frame_time(&self, elapsed: f32) -> f32 {
        if !elapsed.is_finite() {
            tracing::warn!(elapsed, "Non-finite frame time, skipping simulation");
            return 0.0;
        }
        elapsed.clamp(0.0, self.config.max_frame_time)
    }

    fn launch(&mut self, launch: Launch) -> Option<usize> {
        let direction = launch.direction.try_normalize()?;
        let launch_config = &self.config.launch;

        let position =
            self.capsule.end + direction * (self.capsule.radius * launch_config.spawn_offset);
        let speed = launch_config.impulse(launch.charge_secs);
        let velocity = direction * speed + self.player_velocity * launch_config.inherit_velocity;

        let index = self.bodies.launch_next(position, velocity)?;
        tracing::trace!(index, speed, ?position, "Launched sphere");
        Some(index)
    }

    fn apply_controls(&mut self, intents: &ControlIntents, dt: f32) {
        let (forward, right) = intents.move_axes();

        match self.mode {
            ControlMode::Simulated => {
                let player = &self.config.player;
                let acceleration = if self.on_floor {
                    player.ground_acceleration
                } else {
                    player.air_acceleration
                };
                let delta = dt * acceleration;

                self.player_velocity += self.view.horizontal_forward() * (forward * delta);
                self.player_velocity += self.view.horizontal_right() * (right * delta);

                if self.on_floor && intents.jump {
                    self.player_velocity.y = player.jump_speed;
                }
            }
            ControlMode::FreeFly => {
                let delta = dt * self.config.player.fly_speed;
                self.view.translate_local(
                    forward * delta,
                    right * delta,
                    intents.vertical_axis() * delta,
                );
            }
        }
    }

    fn update_player(&mut self, dt: f32) {
        let player = &self.config.player;
        let mut damping = player.ground_damping;

        if !self.on_floor {
            self.player_velocity.y -= self.config.gravity * dt;
            damping *= player.air_damping_factor;
        }
        self.player_velocity *= (-damping * dt).exp();

        self.capsule.translate(self.player_velocity * dt);
        self.on_floor = resolve_capsule_against_world(
            &self.world,
            &mut self.capsule,
            &mut self.player_velocity,
            self.config.floor_threshold,
        );

        self.view.position = self.capsule.end;
    }

    fn update_spheres(&mut self, dt: f32) {
        let config = &self.config;
        let damping = (-config.sphere_damping * dt).exp();

        for body in self.bodies.as_mut_slice() {
            if !body.is_active() {
                continue;
            }

            body.collider.translate(body.velocity * dt);
            resolve_sphere_against_world(
                &self.world,
                &mut body.collider,
                &mut body.velocity,
                config.sphere_restitution,
                config.gravity,
                dt,
            );
            body.velocity *= damping;

            resolve_player_sphere(
                &self.capsule,
                &mut self.player_velocity,
                &mut body.collider,
                &mut body.velocity,
            );
        }
    }

    fn respawn_if_out_of_bounds(&mut self) -> bool {
        if self.capsule.end.y > self.config.out_of_bounds_height {
            return false;
        }

        self.capsule = self.config.player.spawn;
        self.player_velocity = Vec3::ZERO;
        self.on_floor = false;
        self.view.position = self.capsule.end;
        self.view.reset_rotation();

        tracing::trace!(position = ?self.capsule.end, "Player out of bounds, respawned");
        true
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn mesh(&self) -> &TerrainMesh {
        self.world.mesh()
    }

    pub fn capsule(&self) -> &Capsule {
        &self.capsule
    }

    pub fn player_velocity(&self) -> Vec3 {
        self.player_velocity
    }

    pub fn on_floor(&self) -> bool {
        self.on_floor
    }

    pub fn mode(&self) -> ControlMode {
        self.mode
    }

    pub fn view(&self) -> &ViewPose {
        &self.view
    }

    pub fn bodies(&self) -> &[DynamicBody] {
        self.bodies.as_slice()
    }

    /// Index of the sphere the next launch will recycle
    /// Spheres currently in flight or resting on the terrain
    pub fn active_sphere_count(&self) -> usize {
        self.bodies.active_count()
    }

    pub fn next_launch_index(&self) -> usize {
        self.bodies.cursor()
    }
}
