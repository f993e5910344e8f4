//! Error types for terrain generation

/// Errors raised while validating a [`TerrainConfig`](crate::TerrainConfig)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TerrainError {
    /// Grid must have at least one subdivision per axis
    #[error("Invalid resolution {0}: must be at least 1")]
    InvalidResolution(u32),

    /// At least one noise octave is required
    #[error("Invalid octave count {0}: must be at least 1")]
    InvalidOctaves(u32),

    /// A parameter is NaN or infinite
    #[error("Parameter `{field}` must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    /// A parameter is outside its permitted range
    #[error("Parameter `{field}` is out of range: {value} ({expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// The normalisation amplitude of the layered noise sums to zero
    #[error("Total noise amplitude is zero; layered noise cannot be normalised")]
    ZeroAmplitude,
}

/// Result type for terrain operations
pub type Result<T> = std::result::Result<T, TerrainError>;
