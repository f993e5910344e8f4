//! Terrain generation parameters

use serde::{Deserialize, Serialize};

use crate::error::{Result, TerrainError};

/// Largest accepted grid subdivision count per axis
pub const MAX_RESOLUTION: u32 = 4096;

/// Parameters controlling height-field generation
///
/// Any change to these values requires regenerating the mesh and rebuilding
/// the collision index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Side length of the square terrain in world units
    pub area: f32,
    /// Grid subdivisions per axis
    pub resolution: u32,
    /// Number of noise octaves summed per vertex
    pub octaves: u32,
    /// Amplitude multiplier applied after each octave
    pub persistence: f64,
    /// Height scale relative to `area`
    pub scale: f32,
    /// Frequency of the first octave
    pub noise_frequency: f64,
    /// Frequency multiplier applied after each octave
    pub frequency_multiplier: f64,
    /// Amplitude of the first octave
    pub noise_amplitude: f64,
    /// Starting value of the normalisation accumulator
    pub noise_max_value: f64,
    /// Values below this are compressed toward it
    pub flatten_threshold: f64,
    /// 0 gives a flat plateau at the threshold, 1 leaves values unchanged
    pub flatness_strength: f64,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            area: 500.0,
            resolution: 150,
            octaves: 5,
            persistence: 0.5,
            scale: 0.1,
            noise_frequency: 0.4,
            frequency_multiplier: 2.0,
            noise_amplitude: 1.0,
            noise_max_value: 0.0,
            flatten_threshold: 0.0,
            flatness_strength: 0.0,
        }
    }
}

impl TerrainConfig {
    /// Total amplitude used to normalise the layered noise sum
    pub fn normalization(&self) -> f64 {
        let mut max_value = self.noise_max_value;
        let mut amplitude = self.noise_amplitude;
        for _ in 0..self.octaves {
            max_value += amplitude;
            amplitude *= self.persistence;
        }
        max_value
    }

    /// Multiplier from normalised noise to world height
    pub fn height_scale(&self) -> f64 {
        self.area as f64 * self.scale as f64
    }

    /// Check every field, returning the first violation found
    pub fn validate(&self) -> Result<()> {
        if self.resolution < 1 {
            return Err(TerrainError::InvalidResolution(self.resolution));
        }
        if self.resolution > MAX_RESOLUTION {
            return Err(TerrainError::OutOfRange {
                field: "resolution",
                value: self.resolution as f64,
                expected: "must be at most 4096",
            });
        }
        if self.octaves < 1 {
            return Err(TerrainError::InvalidOctaves(self.octaves));
        }

        let fields: [(&'static str, f64); 10] = [
            ("area", self.area as f64),
            ("persistence", self.persistence),
            ("scale", self.scale as f64),
            ("noise_frequency", self.noise_frequency),
            ("frequency_multiplier", self.frequency_multiplier),
            ("noise_amplitude", self.noise_amplitude),
            ("noise_max_value", self.noise_max_value),
            ("flatten_threshold", self.flatten_threshold),
            ("flatness_strength", self.flatness_strength),
            ("normalization", self.normalization()),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(TerrainError::NonFinite { field, value });
            }
        }

        positive("area", self.area as f64)?;
        positive("persistence", self.persistence)?;
        positive("noise_frequency", self.noise_frequency)?;
        positive("frequency_multiplier", self.frequency_multiplier)?;

        if self.scale < 0.0 {
            return Err(TerrainError::OutOfRange {
                field: "scale",
                value: self.scale as f64,
                expected: "must be >= 0",
            });
        }
        if !(0.0..=1.0).contains(&self.flatness_strength) {
            return Err(TerrainError::OutOfRange {
                field: "flatness_strength",
                value: self.flatness_strength,
                expected: "must be within [0, 1]",
            });
        }
        if self.height_scale() > f32::MAX as f64 {
            return Err(TerrainError::OutOfRange {
                field: "scale",
                value: self.scale as f64,
                expected: "area * scale must fit in f32",
            });
        }
        if self.normalization() == 0.0 {
            return Err(TerrainError::ZeroAmplitude);
        }

        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(TerrainError::OutOfRange {
            field,
            value,
            expected: "must be > 0",
        })
    }
}
