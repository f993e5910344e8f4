//! Height-field generation from layered noise

use std::time::Instant;

use crate::config::TerrainConfig;
use crate::error::{Result, TerrainError};
use crate::mesh::TerrainMesh;
use crate::noise_field::NoiseField;

/// Fractal sum of `config.octaves` noise samples, normalised by the total amplitude
///
/// Frequency starts at `noise_frequency` and is multiplied by
/// `frequency_multiplier` every octave; amplitude starts at
/// `noise_amplitude` and is multiplied by `persistence`.
pub fn layered_noise(x: f64, z: f64, noise: &impl NoiseField, config: &TerrainConfig) -> f64 {
    let mut total = 0.0;
    let mut frequency = config.noise_frequency;
    let mut amplitude = config.noise_amplitude;
    let mut max_value = config.noise_max_value;

    for _ in 0..config.octaves {
        total += noise.sample(x * frequency, z * frequency) * amplitude;

        max_value += amplitude;
        amplitude *= config.persistence;
        frequency *= config.frequency_multiplier;
    }

    total / max_value
}

/// Compress values below `threshold` toward it
///
/// `strength` 0 produces a flat plateau at the threshold, 1 leaves the value
/// unchanged. The threshold itself always maps to itself.
pub fn remap_noise_value(value: f64, threshold: f64, strength: f64) -> f64 {
    if value < threshold {
        threshold + (value - threshold) * strength
    } else {
        value
    }
}

/// Generate a terrain mesh
///
/// Fails with a configuration error before sampling any noise if `config`
/// is invalid, and with [`TerrainError::NonFinite`] if a sampled height is
/// NaN or infinite.
pub fn generate(config: &TerrainConfig, noise: &impl NoiseField) -> Result<TerrainMesh> {
    config.validate()?;

    let start = Instant::now();
    let row = config.resolution as usize + 1;
    let step = config.area as f64 / config.resolution as f64;
    let half = config.area as f64 / 2.0;
    // Noise coordinates are independent of world size
    let coord_scale = config.area as f64 / 10.0;
    let height_scale = config.height_scale();

    let mut heights = Vec::with_capacity(row * row);
    for iz in 0..row {
        for ix in 0..row {
            let x = -half + ix as f64 * step;
            let z = -half + iz as f64 * step;

            let value = layered_noise(x / coord_scale, z / coord_scale, noise, config);
            let value = remap_noise_value(value, config.flatten_threshold, config.flatness_strength);

            let height = (value * height_scale) as f32;
            if !height.is_finite() {
                return Err(TerrainError::NonFinite {
                    field: "height",
                    value: value * height_scale,
                });
            }
            heights.push(height);
        }
    }

    let mesh = TerrainMesh::from_heights(&heights, config.resolution, config.area);

    let (min, max) = mesh.bounds();
    tracing::debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        min_height = min.y,
        max_height = max.y,
        elapsed_ms = start.elapsed().as_secs_f32() * 1000.0,
        "Generated terrain"
    );

    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantField, SimplexField};

    fn example_config() -> TerrainConfig {
        TerrainConfig {
            area: 100.0,
            resolution: 10,
            octaves: 1,
            persistence: 1.0,
            noise_amplitude: 1.0,
            frequency_multiplier: 2.0,
            flatten_threshold: 0.0,
            flatness_strength: 0.0,
            ..TerrainConfig::default()
        }
    }

    #[test]
    fn test_constant_noise_gives_constant_height() {
        let config = example_config();
        let mesh = generate(&config, &ConstantField(0.5)).unwrap();
        let expected = (0.5 * (100.0 * config.scale as f64)) as f32;

        assert_eq!(mesh.vertex_count(), 121);
        for h in mesh.heights() {
            assert_eq!(h, expected, "Every vertex should sit at {}", expected);
        }
    }

    #[test]
    fn test_flatten_plateau() {
        let config = TerrainConfig {
            flatten_threshold: 0.3,
            flatness_strength: 0.0,
            ..example_config()
        };
        let mesh = generate(&config, &ConstantField(-0.4)).unwrap();
        let plateau = (0.3 * (100.0 * config.scale as f64)) as f32;

        for h in mesh.heights() {
            assert_eq!(h, plateau);
        }
    }

    #[test]
    fn test_remap_threshold_is_fixed_point() {
        for strength in [0.0, 0.25, 0.5, 1.0] {
            for threshold in [-0.7, 0.0, 0.3, 0.95] {
                assert_eq!(remap_noise_value(threshold, threshold, strength), threshold);
            }
        }
    }

    #[test]
    fn test_remap_below_threshold() {
        assert_eq!(remap_noise_value(0.1, 0.3, 0.0), 0.3);
        assert!((remap_noise_value(0.1, 0.3, 0.5) - 0.2).abs() < 1e-12);
        assert_eq!(remap_noise_value(0.1, 0.3, 1.0), 0.1);
        assert_eq!(remap_noise_value(0.8, 0.3, 0.0), 0.8);
    }

    #[test]
    fn test_layered_noise_normalises_constant_field() {
        let config = TerrainConfig {
            octaves: 5,
            persistence: 0.5,
            ..TerrainConfig::default()
        };
        let value = layered_noise(1.0, 2.0, &ConstantField(0.8), &config);
        assert!((value - 0.8).abs() < 1e-12, "Got {}", value);
    }

    #[test]
    fn test_layered_noise_frequencies() {
        let config = TerrainConfig {
            octaves: 3,
            noise_frequency: 1.0,
            frequency_multiplier: 2.0,
            persistence: 1.0,
            ..TerrainConfig::default()
        };
        // Returns the sampled x coordinate: 1, 2, 4 summed over 3 octaves
        let value = layered_noise(1.0, 0.0, &|x: f64, _z: f64| x, &config);
        assert!((value - 7.0 / 3.0).abs() < 1e-12, "Got {}", value);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let config = TerrainConfig {
            area: 200.0,
            resolution: 32,
            ..TerrainConfig::default()
        };
        let a = generate(&config, &SimplexField::new(11)).unwrap();
        let b = generate(&config, &SimplexField::new(11)).unwrap();

        let bits_a: Vec<u32> = a.heights().map(f32::to_bits).collect();
        let bits_b: Vec<u32> = b.heights().map(f32::to_bits).collect();
        assert_eq!(bits_a, bits_b);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TerrainConfig {
            resolution: 0,
            ..example_config()
        };
        let err = generate(&config, &ConstantField(0.0)).unwrap_err();
        assert_eq!(err, TerrainError::InvalidResolution(0));
    }

    #[test]
    fn test_nan_noise_is_rejected() {
        let err = generate(&example_config(), &|_x: f64, _z: f64| f64::NAN).unwrap_err();
        assert!(
            matches!(err, TerrainError::NonFinite { field: "height", .. }),
            "Got {:?}",
            err
        );
    }

    #[test]
    fn test_infinite_noise_is_rejected() {
        let err = generate(&example_config(), &ConstantField(f64::INFINITY)).unwrap_err();
        assert!(matches!(err, TerrainError::NonFinite { field: "height", .. }));
    }

    #[test]
    fn test_height_overflowing_f32_is_rejected() {
        // Height scale fits in f32 but the scaled sample does not
        let config = TerrainConfig {
            area: 1e30,
            scale: 1e8,
            ..example_config()
        };
        assert!(config.validate().is_ok());
        let err = generate(&config, &ConstantField(10.0)).unwrap_err();
        assert!(matches!(err, TerrainError::NonFinite { field: "height", .. }));
    }

    #[test]
    fn test_heights_are_finite() {
        let config = TerrainConfig {
            area: 50.0,
            resolution: 20,
            flatten_threshold: 0.2,
            flatness_strength: 0.3,
            ..TerrainConfig::default()
        };
        let mesh = generate(&config, &SimplexField::new(5)).unwrap();
        assert!(mesh.heights().all(f32::is_finite));
        assert!(mesh.normals().iter().all(|n| (n.length() - 1.0).abs() < 1e-5));
    }
}
