//! Height-field mesh produced by the generator

use glam::Vec3;

/// Twice-area below which a triangle is treated as degenerate
const DEGENERATE_EPSILON: f32 = 1e-12;

/// A static world triangle
///
/// Vertices are ordered counter-clockwise when viewed from the side the
/// face normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub a: Vec3,
    pub b: Vec3,
    pub c: Vec3,
}

impl Triangle {
    pub fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self { a, b, c }
    }

    /// Unnormalised face normal; its length is twice the triangle area
    pub fn scaled_normal(&self) -> Vec3 {
        (self.b - self.a).cross(self.c - self.a)
    }

    /// Unit face normal, or `None` for a zero-area triangle
    pub fn normal(&self) -> Option<Vec3> {
        let n = self.scaled_normal();
        let len_sq = n.length_squared();
        if len_sq > DEGENERATE_EPSILON {
            Some(n / len_sq.sqrt())
        } else {
            None
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.normal().is_none()
    }

    pub fn min(&self) -> Vec3 {
        self.a.min(self.b).min(self.c)
    }

    pub fn max(&self) -> Vec3 {
        self.a.max(self.b).max(self.c)
    }
}

/// Indexed triangle mesh over a regular `(resolution + 1)²` vertex grid
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
    resolution: u32,
    area: f32,
}

impl TerrainMesh {
    /// Build a mesh from per-vertex heights laid out row by row along +Z
    ///
    /// `heights` must hold `(resolution + 1)²` values. The grid is centred on
    /// the origin and spans `area` along both X and Z.
    pub(crate) fn from_heights(heights: &[f32], resolution: u32, area: f32) -> Self {
        let row = resolution as usize + 1;
        debug_assert_eq!(heights.len(), row * row);

        let step = area / resolution as f32;
        let half = area / 2.0;

        let mut positions = Vec::with_capacity(row * row);
        for iz in 0..row {
            for ix in 0..row {
                let x = -half + ix as f32 * step;
                let z = -half + iz as f32 * step;
                positions.push(Vec3::new(x, heights[iz * row + ix], z));
            }
        }

        let cells = resolution as usize;
        let mut indices = Vec::with_capacity(cells * cells * 6);
        for iz in 0..cells {
            for ix in 0..cells {
                let v00 = (iz * row + ix) as u32;
                let v10 = v00 + 1;
                let v01 = v00 + row as u32;
                let v11 = v01 + 1;

                // Both triangles wind counter-clockwise seen from +Y
                indices.extend_from_slice(&[v00, v01, v10]);
                indices.extend_from_slice(&[v10, v01, v11]);
            }
        }

        let normals = vertex_normals(&positions, &indices);

        Self {
            positions,
            normals,
            indices,
            resolution,
            area,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Unit per-vertex normals, parallel to [`positions`](Self::positions)
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    pub fn area(&self) -> f32 {
        self.area
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Vertex heights in grid order
    pub fn heights(&self) -> impl Iterator<Item = f32> + '_ {
        self.positions.iter().map(|p| p.y)
    }

    /// Height of the grid vertex at column `ix`, row `iz`
    pub fn height_at(&self, ix: u32, iz: u32) -> Option<f32> {
        if ix > self.resolution || iz > self.resolution {
            return None;
        }
        let row = self.resolution as usize + 1;
        self.positions
            .get(iz as usize * row + ix as usize)
            .map(|p| p.y)
    }

    /// Highest corner of the grid cell under `(x, z)`, `None` outside the mesh
    pub fn cell_max_height(&self, x: f32, z: f32) -> Option<f32> {
        if self.resolution == 0 {
            return None;
        }
        let half = self.area / 2.0;
        let cell = self.area / self.resolution as f32;
        let (fx, fz) = ((x + half) / cell, (z + half) / cell);
        let span = 0.0..=self.resolution as f32;
        if !span.contains(&fx) || !span.contains(&fz) {
            return None;
        }

        // The far edge belongs to the last cell
        let last = self.resolution - 1;
        let ix = (fx as u32).min(last);
        let iz = (fz as u32).min(last);

        [(ix, iz), (ix + 1, iz), (ix, iz + 1), (ix + 1, iz + 1)]
            .into_iter()
            .filter_map(|(cx, cz)| self.height_at(cx, cz))
            .reduce(f32::max)
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            Triangle::new(
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            )
        })
    }

    /// Axis-aligned bounds as `(min, max)`
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.positions.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(min, max), p| (min.min(*p), max.max(*p)),
        )
    }
}

/// Area-weighted average of the face normals around each vertex
fn vertex_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut accum = vec![Vec3::ZERO; positions.len()];

    for tri in indices.chunks_exact(3) {
        let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let face = (positions[ib] - positions[ia]).cross(positions[ic] - positions[ia]);
        accum[ia] += face;
        accum[ib] += face;
        accum[ic] += face;
    }

    accum
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(resolution: u32, area: f32, height: f32) -> TerrainMesh {
        let row = resolution as usize + 1;
        TerrainMesh::from_heights(&vec![height; row * row], resolution, area)
    }

    #[test]
    fn test_grid_counts() {
        let mesh = flat(4, 10.0, 0.0);
        assert_eq!(mesh.vertex_count(), 25);
        assert_eq!(mesh.triangle_count(), 32);
        assert_eq!(mesh.normals().len(), 25);
    }

    #[test]
    fn test_grid_is_centred() {
        let (min, max) = flat(4, 10.0, 2.0).bounds();
        assert_eq!(min, Vec3::new(-5.0, 2.0, -5.0));
        assert_eq!(max, Vec3::new(5.0, 2.0, 5.0));
    }

    #[test]
    fn test_face_normals_point_up() {
        let mesh = flat(3, 6.0, 0.0);
        for tri in mesh.triangles() {
            let n = tri.normal().expect("flat grid triangles are not degenerate");
            assert!(
                (n - Vec3::Y).length() < 1e-6,
                "Face normal should be +Y, got {:?}",
                n
            );
        }
    }

    #[test]
    fn test_vertex_normals_unit_and_up_on_slope() {
        let resolution = 4;
        let row = resolution as usize + 1;
        let heights: Vec<f32> = (0..row * row).map(|i| (i % row) as f32 * 0.5).collect();
        let mesh = TerrainMesh::from_heights(&heights, resolution, 8.0);

        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < 1e-5, "Normal not unit: {:?}", n);
            assert!(n.y > 0.0, "Normal should face up: {:?}", n);
            assert!(n.x < 0.0, "Slope rising along +X should tilt normals toward -X: {:?}", n);
        }
    }

    #[test]
    fn test_degenerate_triangle_has_no_normal() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::X * 2.0);
        assert!(tri.is_degenerate());
        assert_eq!(tri.normal(), None);
    }

    #[test]
    fn test_cell_max_height() {
        let resolution = 4;
        let row = resolution as usize + 1;
        // Height equals the column index
        let heights: Vec<f32> = (0..row * row).map(|i| (i % row) as f32).collect();
        let mesh = TerrainMesh::from_heights(&heights, resolution, 8.0);

        assert_eq!(mesh.cell_max_height(-3.5, 0.0), Some(1.0));
        assert_eq!(mesh.cell_max_height(0.5, 0.5), Some(3.0));
        assert_eq!(mesh.cell_max_height(4.0, 4.0), Some(4.0));
        assert_eq!(mesh.cell_max_height(4.1, 0.0), None);
        assert_eq!(mesh.cell_max_height(0.0, f32::NAN), None);
    }

    #[test]
    fn test_height_at_bounds() {
        let mesh = flat(2, 4.0, 1.5);
        assert_eq!(mesh.height_at(2, 2), Some(1.5));
        assert_eq!(mesh.height_at(3, 0), None);
    }
}
