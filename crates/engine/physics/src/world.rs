//! Static terrain geometry and the collision queries made against it

use std::time::Instant;

use landfall_terrain::{generate, NoiseField, TerrainConfig, TerrainMesh};

use crate::error::Result;
use crate::octree::{Octree, OctreeConfig};
use crate::shape::{Capsule, Contact, Sphere};

/// Static world: the terrain mesh together with the octree built from it
///
/// The two are always replaced together. A `World` is never modified in
/// place; regeneration builds a new one and swaps it in.
#[derive(Debug, Clone)]
pub struct World {
    config: TerrainConfig,
    mesh: TerrainMesh,
    index: Octree,
}

impl World {
    /// Generate terrain and index it
    ///
    /// # Errors
    /// Returns a configuration error if `config` is invalid; no partial
    /// world is produced.
    pub fn generate(
        config: &TerrainConfig,
        noise: &impl NoiseField,
        octree: OctreeConfig,
    ) -> Result<Self> {
        let start = Instant::now();
        let mesh = generate(config, noise)?;
        let index = Octree::from_mesh(&mesh, octree);

        tracing::info!(
            area = config.area,
            resolution = config.resolution,
            triangles = index.triangle_count(),
            nodes = index.node_count(),
            elapsed_ms = start.elapsed().as_secs_f32() * 1000.0,
            "Generated world"
        );

        Ok(Self {
            config: config.clone(),
            mesh,
            index,
        })
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn mesh(&self) -> &TerrainMesh {
        &self.mesh
    }

    pub fn index(&self) -> &Octree {
        &self.index
    }
}

/// Static collision geometry that bodies are pushed out of
pub trait SurfaceQuery {
    /// Combined contact for a capsule, `None` when it touches nothing
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact>;

    /// Combined contact for a sphere, `None` when it touches nothing
    fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact>;
}

impl SurfaceQuery for Octree {
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact> {
        Octree::capsule_intersect(self, capsule)
    }

    fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact> {
        Octree::sphere_intersect(self, sphere)
    }
}

impl SurfaceQuery for World {
    fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact> {
        self.index.capsule_intersect(capsule)
    }

    fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact> {
        self.index.sphere_intersect(sphere)
    }
}
