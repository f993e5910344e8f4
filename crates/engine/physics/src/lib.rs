//! Collision and stepping for a walking player and thrown spheres on
//! procedurally generated terrain
//!
//! ```
//! use landfall_physics::{ControlIntents, Simulation, SimulationConfig};
//! use landfall_terrain::{SimplexField, TerrainConfig};
//!
//! let terrain = TerrainConfig {
//!     area: 50.0,
//!     resolution: 16,
//!     ..TerrainConfig::default()
//! };
//! let mut sim = Simulation::new(SimulationConfig::default(), &terrain, &SimplexField::new(3))?;
//!
//! sim.step(1.0 / 60.0, &ControlIntents::default());
//! assert!(sim.capsule().end.is_finite());
//! # Ok::<(), landfall_physics::PhysicsError>(())
//! ```

pub mod body;
pub mod collision;
pub mod config;
pub mod controls;
pub mod error;
pub mod octree;
pub mod resolver;
pub mod shape;
pub mod simulation;
pub mod world;

pub use body::{BodyPool, DynamicBody};
pub use collision::Aabb;
pub use config::{LaunchConfig, PlayerConfig, SimulationConfig};
pub use controls::{ControlIntents, ControlMode, Launch, ViewPose};
pub use error::{PhysicsError, Result};
pub use octree::{Octree, OctreeConfig};
pub use resolver::{
    resolve_capsule_against_world, resolve_player_sphere, resolve_sphere_against_world,
    resolve_sphere_sphere,
};
pub use shape::{Capsule, Contact, Sphere};
pub use simulation::{Simulation, StepReport};
pub use world::{SurfaceQuery, World};

// Re-export for convenience
pub use glam;
pub use landfall_terrain;
