//! Simulation tuning

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};
use crate::octree::OctreeConfig;
use crate::shape::Capsule;

/// Walking player parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Capsule the player starts in and is reset to when falling out
    pub spawn: Capsule,
    /// Velocity damping rate while on the floor
    pub ground_damping: f32,
    /// Multiplier on `ground_damping` while airborne
    pub air_damping_factor: f32,
    pub ground_acceleration: f32,
    pub air_acceleration: f32,
    /// Vertical speed set by a jump
    pub jump_speed: f32,
    /// Free-fly camera speed
    pub fly_speed: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Capsule::new(Vec3::new(0.0, 0.35, 0.0), Vec3::new(0.0, 1.0, 0.0), 0.35),
            ground_damping: 4.0,
            air_damping_factor: 0.1,
            ground_acceleration: 25.0,
            air_acceleration: 8.0,
            jump_speed: 15.0,
            fly_speed: 25.0,
        }
    }
}

/// Sphere throwing parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Speed of an uncharged throw
    pub base_impulse: f32,
    /// Extra speed approached as the charge grows
    pub charge_impulse: f32,
    /// Charge saturation rate per second
    pub charge_rate: f32,
    /// Multiplier on the player velocity added to the throw
    pub inherit_velocity: f32,
    /// Spawn distance ahead of the eye, in player radii
    pub spawn_offset: f32,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            base_impulse: 15.0,
            charge_impulse: 30.0,
            charge_rate: 1.0,
            inherit_velocity: 2.0,
            spawn_offset: 1.5,
        }
    }
}

impl LaunchConfig {
    /// Throw speed after holding for `charge_secs`
    pub fn impulse(&self, charge_secs: f32) -> f32 {
        let charge = charge_secs.max(0.0) * self.charge_rate;
        self.base_impulse + self.charge_impulse * (1.0 - (-charge).exp())
    }
}

/// Parameters of the stepping loop and its bodies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub gravity: f32,
    /// Size of the launchable sphere pool
    pub sphere_count: usize,
    pub sphere_radius: f32,
    pub substeps: u32,
    /// Longer frames are clamped to this many seconds
    pub max_frame_time: f32,
    /// Velocity damping rate of free spheres
    pub sphere_damping: f32,
    /// Scale on the reflected normal velocity of a bouncing sphere
    pub sphere_restitution: f32,
    /// Contact normals with a larger vertical component count as floor
    pub floor_threshold: f32,
    /// Anything at or below this height is out of bounds
    pub out_of_bounds_height: f32,
    /// Where unused spheres are kept
    pub parking_position: Vec3,
    pub player: PlayerConfig,
    pub launch: LaunchConfig,
    pub octree: OctreeConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gravity: 30.0,
            sphere_count: 100,
            sphere_radius: 0.2,
            substeps: 5,
            max_frame_time: 0.05,
            sphere_damping: 1.5,
            sphere_restitution: 1.5,
            floor_threshold: 1e-3,
            out_of_bounds_height: -25.0,
            parking_position: Vec3::new(0.0, -100.0, 0.0),
            player: PlayerConfig::default(),
            launch: LaunchConfig::default(),
            octree: OctreeConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.sphere_count == 0 {
            return Err(PhysicsError::InvalidConfig("sphere_count must be at least 1".into()));
        }
        if self.substeps == 0 {
            return Err(PhysicsError::InvalidConfig("substeps must be at least 1".into()));
        }
        if self.octree.triangles_per_leaf == 0 {
            return Err(PhysicsError::InvalidConfig(
                "octree.triangles_per_leaf must be at least 1".into(),
            ));
        }

        radius("sphere", self.sphere_radius)?;
        radius("player", self.player.spawn.radius)?;

        let player = &self.player;
        let launch = &self.launch;
        let scalars = [
            ("gravity", self.gravity),
            ("max_frame_time", self.max_frame_time),
            ("sphere_damping", self.sphere_damping),
            ("sphere_restitution", self.sphere_restitution),
            ("floor_threshold", self.floor_threshold),
            ("out_of_bounds_height", self.out_of_bounds_height),
            ("player.ground_damping", player.ground_damping),
            ("player.air_damping_factor", player.air_damping_factor),
            ("player.ground_acceleration", player.ground_acceleration),
            ("player.air_acceleration", player.air_acceleration),
            ("player.jump_speed", player.jump_speed),
            ("player.fly_speed", player.fly_speed),
            ("launch.base_impulse", launch.base_impulse),
            ("launch.charge_impulse", launch.charge_impulse),
            ("launch.charge_rate", launch.charge_rate),
            ("launch.inherit_velocity", launch.inherit_velocity),
            ("launch.spawn_offset", launch.spawn_offset),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(PhysicsError::InvalidConfig(format!("{field} is not finite: {value}")));
            }
        }

        let vectors = [
            ("parking_position", self.parking_position),
            ("player.spawn.start", player.spawn.start),
            ("player.spawn.end", player.spawn.end),
        ];
        for (field, value) in vectors {
            if !value.is_finite() {
                return Err(PhysicsError::InvalidConfig(format!("{field} is not finite: {value}")));
            }
        }

        if self.max_frame_time <= 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "max_frame_time must be > 0, got {}",
                self.max_frame_time
            )));
        }

        Ok(())
    }
}

fn radius(shape: &'static str, radius: f32) -> Result<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::InvalidRadius { shape, radius })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SimulationConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_impulse_curve() {
        let launch = LaunchConfig::default();
        assert_eq!(launch.impulse(0.0), 15.0);
        assert!((launch.impulse(1.0) - (15.0 + 30.0 * (1.0 - (-1.0f32).exp()))).abs() < 1e-5);
        assert!(launch.impulse(100.0) <= 45.0);
        assert!(launch.impulse(100.0) > 44.99);
        // Negative hold times are treated as uncharged
        assert_eq!(launch.impulse(-3.0), 15.0);
    }

    #[test]
    fn test_zero_pool_rejected() {
        let config = SimulationConfig {
            sphere_count: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.validate(), Err(PhysicsError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_substeps_rejected() {
        let config = SimulationConfig {
            substeps: 0,
            ..SimulationConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_radius_rejected() {
        let config = SimulationConfig {
            sphere_radius: -0.2,
            ..SimulationConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(PhysicsError::InvalidRadius {
                shape: "sphere",
                radius: -0.2
            })
        );

        let mut config = SimulationConfig::default();
        config.player.spawn.radius = 0.0;
        assert!(matches!(
            config.validate(),
            Err(PhysicsError::InvalidRadius { shape: "player", .. })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut config = SimulationConfig::default();
        config.launch.charge_rate = f32::INFINITY;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("launch.charge_rate"), "Got {}", err);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SimulationConfig = toml::from_str(
            r#"
            gravity = 9.81
            sphere_count = 12

            [player]
            jump_speed = 8.0
            "#,
        )
        .unwrap();

        assert_eq!(config.gravity, 9.81);
        assert_eq!(config.sphere_count, 12);
        assert_eq!(config.player.jump_speed, 8.0);
        assert_eq!(config.player.fly_speed, 25.0);
        assert_eq!(config.launch, LaunchConfig::default());
        assert_eq!(config.validate(), Ok(()));
    }
}
