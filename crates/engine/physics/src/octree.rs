//! Octree over static world triangles
//!
//! The tree is a loose partition: a triangle is referenced by every node
//! whose box overlaps the triangle's AABB, so one triangle may live in
//! several leaves. Nodes are stored in a flat arena and refer to triangles
//! by index into a single immutable triangle array.
//!
//! # Queries
//!
//! [`Octree::capsule_intersect`] and [`Octree::sphere_intersect`] gather
//! candidate triangles from leaves overlapping the shape's AABB, then test
//! them in ascending index order against a working copy of the shape. Every
//! contact immediately pushes the working copy out, and the query reports
//! the net displacement as a single [`Contact`].

use glam::Vec3;
use landfall_terrain::{TerrainMesh, Triangle};
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;
use crate::shape::{triangle_capsule_contact, triangle_sphere_contact, Capsule, Contact, Sphere};

/// Padding added around the triangle bounds so flat meshes get a non-empty root box
const ROOT_PADDING: f32 = 0.01;

/// Net displacements shorter than this are reported as no contact
const MIN_DISPLACEMENT: f32 = 1e-6;

/// Subdivision limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Nodes at this depth are never split (root is depth 0)
    pub max_depth: u32,
    /// Nodes holding more triangles than this are split
    pub triangles_per_leaf: usize,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            triangles_per_leaf: 8,
        }
    }
}

#[derive(Debug, Clone)]
struct OctreeNode {
    bounds: Aabb,
    /// Arena indices of non-empty children; empty for leaves
    children: Vec<u32>,
    /// Triangle indices; only populated on leaves
    triangles: Vec<u32>,
}

impl OctreeNode {
    fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Spatial index over the static world surface
#[derive(Debug, Clone)]
pub struct Octree {
    triangles: Vec<Triangle>,
    nodes: Vec<OctreeNode>,
    config: OctreeConfig,
    depth: u32,
}

impl Octree {
    /// Build with default subdivision limits
    pub fn build(triangles: Vec<Triangle>) -> Self {
        Self::with_config(triangles, OctreeConfig::default())
    }

    /// Index every triangle of a terrain mesh
    pub fn from_mesh(mesh: &TerrainMesh, config: OctreeConfig) -> Self {
        Self::with_config(mesh.triangles().collect(), config)
    }

    pub fn with_config(triangles: Vec<Triangle>, config: OctreeConfig) -> Self {
        let mut tree = Self {
            triangles,
            nodes: Vec::new(),
            config,
            depth: 0,
        };

        let Some(bounds) = Aabb::from_points(tree.triangles.iter().flat_map(|t| [t.a, t.b, t.c]))
        else {
            return tree;
        };

        // Degenerate triangles can never produce a contact
        let members: Vec<u32> = tree
            .triangles
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.is_degenerate())
            .map(|(i, _)| i as u32)
            .collect();
        let boxes: Vec<Aabb> = tree
            .triangles
            .iter()
            .map(|t| Aabb::new(t.min(), t.max()))
            .collect();

        tree.nodes.push(OctreeNode {
            bounds: bounds.inflated(ROOT_PADDING),
            children: Vec::new(),
            triangles: members,
        });
        tree.split(0, 0, &boxes);

        tracing::debug!(
            triangles = tree.triangles.len(),
            nodes = tree.nodes.len(),
            leaves = tree.leaf_count(),
            depth = tree.depth,
            "Built octree"
        );

        tree
    }

    fn split(&mut self, node: usize, depth: u32, boxes: &[Aabb]) {
        self.depth = self.depth.max(depth);

        if self.nodes[node].triangles.len() <= self.config.triangles_per_leaf
            || depth >= self.config.max_depth
        {
            return;
        }

        let bounds = self.nodes[node].bounds;
        let members = std::mem::take(&mut self.nodes[node].triangles);

        let mut children = Vec::with_capacity(8);
        for octant in 0..8 {
            let child_bounds = bounds.octant(octant);
            let inside: Vec<u32> = members
                .iter()
                .copied()
                .filter(|&i| boxes[i as usize].intersects(&child_bounds))
                .collect();
            if inside.is_empty() {
                continue;
            }

            children.push(self.nodes.len() as u32);
            self.nodes.push(OctreeNode {
                bounds: child_bounds,
                children: Vec::new(),
                triangles: inside,
            });
        }

        self.nodes[node].children = children.clone();
        for child in children {
            self.split(child as usize, depth + 1, boxes);
        }
    }

    /// Capsule against the world surface
    pub fn capsule_intersect(&self, capsule: &Capsule) -> Option<Contact> {
        let candidates = self.candidates(&capsule.aabb());
        if candidates.is_empty() {
            return None;
        }

        let mut working = *capsule;
        let mut hit = false;
        for index in candidates {
            if let Some(contact) = triangle_capsule_contact(&self.triangles[index as usize], &working) {
                working.translate(contact.correction());
                hit = true;
            }
        }

        if hit {
            contact_from_displacement(working.center() - capsule.center())
        } else {
            None
        }
    }

    /// Sphere against the world surface
    pub fn sphere_intersect(&self, sphere: &Sphere) -> Option<Contact> {
        let candidates = self.candidates(&sphere.aabb());
        if candidates.is_empty() {
            return None;
        }

        let mut working = *sphere;
        let mut hit = false;
        for index in candidates {
            if let Some(contact) = triangle_sphere_contact(&self.triangles[index as usize], &working) {
                working.translate(contact.correction());
                hit = true;
            }
        }

        if hit {
            contact_from_displacement(working.center - sphere.center)
        } else {
            None
        }
    }

    /// Sorted, de-duplicated indices of triangles in leaves overlapping `region`
    pub fn candidates(&self, region: &Aabb) -> Vec<u32> {
        let mut out = Vec::new();
        if self.nodes.is_empty() {
            return out;
        }

        let mut stack = vec![0usize];
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if !node.bounds.intersects(region) {
                continue;
            }
            if node.is_leaf() {
                out.extend_from_slice(&node.triangles);
            } else {
                stack.extend(node.children.iter().map(|&c| c as usize));
            }
        }

        out.sort_unstable();
        out.dedup();
        out
    }

    /// Root box, or `None` for an empty tree
    pub fn bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|n| n.bounds)
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Deepest level reached during the build
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn config(&self) -> OctreeConfig {
        self.config
    }
}

fn contact_from_displacement(displacement: Vec3) -> Option<Contact> {
    let depth = displacement.length();
    if depth > MIN_DISPLACEMENT && depth.is_finite() {
        Some(Contact {
            normal: displacement / depth,
            depth,
        })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use landfall_terrain::{generate, ConstantField, SimplexField, TerrainConfig};

    /// Flat square floor at `height`, `cells` quads per side, spanning [-half, half]
    fn flat_floor(cells: usize, half: f32, height: f32) -> Vec<Triangle> {
        let step = 2.0 * half / cells as f32;
        let mut tris = Vec::new();
        for iz in 0..cells {
            for ix in 0..cells {
                let x0 = -half + ix as f32 * step;
                let z0 = -half + iz as f32 * step;
                let v00 = Vec3::new(x0, height, z0);
                let v10 = Vec3::new(x0 + step, height, z0);
                let v01 = Vec3::new(x0, height, z0 + step);
                let v11 = Vec3::new(x0 + step, height, z0 + step);
                tris.push(Triangle::new(v00, v01, v10));
                tris.push(Triangle::new(v10, v01, v11));
            }
        }
        tris
    }

    #[test]
    fn test_empty_tree() {
        let tree = Octree::build(Vec::new());
        assert_eq!(tree.node_count(), 0);
        assert!(tree.bounds().is_none());
        assert!(tree.sphere_intersect(&Sphere::new(Vec3::ZERO, 1.0)).is_none());
    }

    #[test]
    fn test_build_splits_large_meshes() {
        let tree = Octree::build(flat_floor(16, 8.0, 0.0));
        assert_eq!(tree.triangle_count(), 512);
        assert!(tree.node_count() > 1);
        assert!(tree.depth() >= 1);
        assert!(tree.depth() <= OctreeConfig::default().max_depth);
    }

    #[test]
    fn test_small_mesh_stays_single_leaf() {
        let tree = Octree::build(flat_floor(2, 1.0, 0.0));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_every_triangle_reachable() {
        let tris = flat_floor(12, 6.0, 0.0);
        let tree = Octree::build(tris.clone());
        let everything = tree.bounds().unwrap();
        let all = tree.candidates(&everything);
        assert_eq!(all.len(), tris.len());
    }

    #[test]
    fn test_candidates_are_local() {
        let tree = Octree::build(flat_floor(16, 8.0, 0.0));
        let near = tree.candidates(&Aabb::around_sphere(Vec3::new(7.5, 0.0, 7.5), 0.2));
        assert!(!near.is_empty());
        assert!(near.len() < 64, "Query should prune distant leaves, got {}", near.len());
        assert!(near.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_sphere_on_floor() {
        let tree = Octree::build(flat_floor(16, 8.0, 1.0));
        let contact = tree
            .sphere_intersect(&Sphere::new(Vec3::new(0.3, 1.1, -0.4), 0.2))
            .unwrap();

        assert!((contact.normal - Vec3::Y).length() < 1e-5, "Got {:?}", contact.normal);
        assert!((contact.depth - 0.1).abs() < 1e-5, "Got {}", contact.depth);
    }

    #[test]
    fn test_sphere_on_shared_edge_corrects_once() {
        // Exactly above a grid vertex shared by six triangles
        let tree = Octree::build(flat_floor(16, 8.0, 0.0));
        let contact = tree
            .sphere_intersect(&Sphere::new(Vec3::new(1.0, 0.15, 1.0), 0.2))
            .unwrap();
        assert!((contact.depth - 0.05).abs() < 1e-5, "Got {}", contact.depth);
    }

    #[test]
    fn test_capsule_on_floor() {
        let tree = Octree::build(flat_floor(16, 8.0, 0.0));
        let capsule = Capsule::new(Vec3::new(0.2, 0.3, 0.2), Vec3::new(0.2, 0.95, 0.2), 0.35);
        let contact = tree.capsule_intersect(&capsule).unwrap();

        assert!((contact.normal - Vec3::Y).length() < 1e-5);
        assert!((contact.depth - 0.05).abs() < 1e-5, "Got {}", contact.depth);
    }

    #[test]
    fn test_shapes_outside_bounds_miss() {
        let tree = Octree::build(flat_floor(8, 4.0, 0.0));
        let bounds = tree.bounds().unwrap();

        let above = Sphere::new(Vec3::new(0.0, bounds.max.y + 5.0, 0.0), 1.0);
        let beside = Sphere::new(Vec3::new(bounds.max.x + 3.0, 0.0, 0.0), 1.0);
        let below = Capsule::new(Vec3::new(0.0, -10.0, 0.0), Vec3::new(0.0, -9.0, 0.0), 0.5);

        assert!(tree.sphere_intersect(&above).is_none());
        assert!(tree.sphere_intersect(&beside).is_none());
        assert!(tree.capsule_intersect(&below).is_none());
    }

    #[test]
    fn test_contacts_on_generated_terrain_are_unit() {
        let config = TerrainConfig {
            area: 60.0,
            resolution: 24,
            ..TerrainConfig::default()
        };
        let mesh = generate(&config, &SimplexField::new(9)).unwrap();
        let tree = Octree::from_mesh(&mesh, OctreeConfig::default());

        let mut contacts = 0;
        for (i, vertex) in mesh.positions().iter().enumerate().step_by(7) {
            let sphere = Sphere::new(*vertex + Vec3::Y * 0.1, 0.4);
            if let Some(c) = tree.sphere_intersect(&sphere) {
                contacts += 1;
                assert!((c.normal.length() - 1.0).abs() < 1e-4, "Vertex {} normal {:?}", i, c.normal);
                assert!(c.depth >= 0.0);
            }
            let capsule = Capsule::new(*vertex, *vertex + Vec3::Y * 0.65, 0.35);
            if let Some(c) = tree.capsule_intersect(&capsule) {
                assert!((c.normal.length() - 1.0).abs() < 1e-4);
                assert!(c.depth >= 0.0);
            }
        }
        assert!(contacts > 0);
    }

    #[test]
    fn test_from_flat_mesh() {
        let config = TerrainConfig {
            area: 20.0,
            resolution: 8,
            octaves: 1,
            ..TerrainConfig::default()
        };
        let mesh = generate(&config, &ConstantField(0.0)).unwrap();
        let tree = Octree::from_mesh(&mesh, OctreeConfig::default());
        assert_eq!(tree.triangle_count(), mesh.triangle_count());
    }
}
