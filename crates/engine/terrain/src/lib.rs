//! Procedural terrain for the landfall sandbox
//!
//! Builds a regular height-field triangle mesh from a [`NoiseField`] and a
//! [`TerrainConfig`]. The mesh is the static world surface that the physics
//! crate indexes for collision.
//!
//! # Usage
//!
//! ```
//! use landfall_terrain::{generate, SimplexField, TerrainConfig};
//!
//! let config = TerrainConfig {
//!     area: 100.0,
//!     resolution: 16,
//!     ..TerrainConfig::default()
//! };
//! let mesh = generate(&config, &SimplexField::new(7)).unwrap();
//! assert_eq!(mesh.vertex_count(), 17 * 17);
//! ```

mod config;
mod error;
mod generator;
mod mesh;
mod noise_field;

pub use config::{TerrainConfig, MAX_RESOLUTION};
pub use error::{Result, TerrainError};
pub use generator::{generate, layered_noise, remap_noise_value};
pub use mesh::{TerrainMesh, Triangle};
pub use noise_field::{ConstantField, NoiseField, SimplexField};

// Re-export for convenience
pub use glam;
