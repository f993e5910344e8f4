//! Error types for the physics crate

use landfall_terrain::TerrainError;

/// Errors raised while setting up or regenerating a simulation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// The terrain configuration was rejected
    #[error("Terrain configuration error: {0}")]
    Terrain(#[from] TerrainError),

    /// A radius was zero, negative or not finite
    #[error("Invalid radius for {shape}: {radius}")]
    InvalidRadius { shape: &'static str, radius: f32 },

    /// Invalid simulation configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for physics operations
pub type Result<T> = std::result::Result<T, PhysicsError>;
