//! Collision shapes and narrow-phase triangle tests
//!
//! All tests are one-sided with respect to the triangle's face normal: a
//! contact always pushes the shape toward the front face. Degenerate
//! triangles never produce a contact.

use glam::Vec3;
use landfall_terrain::Triangle;
use serde::{Deserialize, Serialize};

use crate::collision::Aabb;

/// Squared segment length below which a capsule is treated as a sphere
const DEGENERATE_SEGMENT_SQ: f32 = 1e-12;

/// Distances below this cannot yield a reliable direction
const DIRECTION_EPSILON: f32 = 1e-6;

/// Separation of two overlapping shapes
///
/// `normal` is unit length and points away from the surface; moving the
/// shape by `normal * depth` resolves the overlap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub normal: Vec3,
    pub depth: f32,
}

impl Contact {
    /// Translation that removes the penetration
    pub fn correction(&self) -> Vec3 {
        self.normal * self.depth
    }
}

/// A sphere collider or query shape
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.center += offset;
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::around_sphere(self.center, self.radius)
    }
}

/// A swept sphere between `start` and `end`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    pub start: Vec3,
    pub end: Vec3,
    pub radius: f32,
}

impl Capsule {
    pub fn new(start: Vec3, end: Vec3, radius: f32) -> Self {
        Self { start, end, radius }
    }

    /// Midpoint of the axis
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.start += offset;
        self.end += offset;
    }

    /// True when the axis has (almost) zero length
    pub fn is_degenerate(&self) -> bool {
        (self.end - self.start).length_squared() < DEGENERATE_SEGMENT_SQ
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::new(
            self.start.min(self.end) - Vec3::splat(self.radius),
            self.start.max(self.end) + Vec3::splat(self.radius),
        )
    }
}

/// Whether `point`, projected onto the triangle's plane, lies inside it
pub fn triangle_contains_point(tri: &Triangle, point: Vec3) -> bool {
    let v0 = tri.c - tri.a;
    let v1 = tri.b - tri.a;
    let v2 = point - tri.a;

    let dot00 = v0.dot(v0);
    let dot01 = v0.dot(v1);
    let dot02 = v0.dot(v2);
    let dot11 = v1.dot(v1);
    let dot12 = v1.dot(v2);

    let denom = dot00 * dot11 - dot01 * dot01;
    if denom.abs() <= f32::EPSILON * dot00 * dot11 {
        return false;
    }

    let u = (dot11 * dot02 - dot01 * dot12) / denom;
    let v = (dot00 * dot12 - dot01 * dot02) / denom;

    u >= 0.0 && v >= 0.0 && u + v <= 1.0
}

/// Find closest point on a triangle to a given point.
pub fn closest_point_on_triangle(p: Vec3, tri: &Triangle) -> Vec3 {
    let (a, b, c) = (tri.a, tri.b, tri.c);

    // Vertex region outside A
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;
    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    // Vertex region outside B
    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    // Edge region of AB
    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    // Vertex region outside C
    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    // Edge region of AC
    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    // Edge region of BC
    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    // Inside face region
    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Closest points between segments `p1-q1` and `p2-q2`
///
/// Returns `(point_on_first, point_on_second)`. Zero-length segments are
/// handled as points.
pub fn closest_points_between_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.length_squared();
    let e = d2.length_squared();
    let f = d2.dot(r);

    if a <= DEGENERATE_SEGMENT_SQ && e <= DEGENERATE_SEGMENT_SQ {
        return (p1, p2);
    }

    let (s, t) = if a <= DEGENERATE_SEGMENT_SQ {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= DEGENERATE_SEGMENT_SQ {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;

            // Parallel segments pick an arbitrary s
            let mut s = if denom > 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;

            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Sphere against a single triangle
pub fn triangle_sphere_contact(tri: &Triangle, sphere: &Sphere) -> Option<Contact> {
    let normal = tri.normal()?;
    let radius = sphere.radius;

    let distance = normal.dot(sphere.center - tri.a);
    if distance.abs() >= radius {
        return None;
    }

    let projected = sphere.center - normal * distance;
    if triangle_contains_point(tri, projected) {
        return Some(Contact {
            normal,
            depth: radius - distance,
        });
    }

    let closest = closest_point_on_triangle(sphere.center, tri);
    let offset = sphere.center - closest;
    let dist_sq = offset.length_squared();
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    let direction = if dist > DIRECTION_EPSILON {
        offset / dist
    } else {
        normal
    };

    Some(Contact {
        normal: direction,
        depth: radius - dist,
    })
}

/// Capsule against a single triangle
///
/// A zero-length capsule is tested as a sphere at `start`.
pub fn triangle_capsule_contact(tri: &Triangle, capsule: &Capsule) -> Option<Contact> {
    if capsule.is_degenerate() {
        return triangle_sphere_contact(tri, &Sphere::new(capsule.start, capsule.radius));
    }

    let normal = tri.normal()?;
    let radius = capsule.radius;

    let d1 = normal.dot(capsule.start - tri.a) - radius;
    let d2 = normal.dot(capsule.end - tri.a) - radius;

    // Entirely in front of the plane, or entirely behind it
    if (d1 > 0.0 && d2 > 0.0) || (d1 < -radius && d2 < -radius) {
        return None;
    }

    let span = d1.abs() + d2.abs();
    let t = if span > DIRECTION_EPSILON {
        (d1 / span).abs()
    } else {
        0.0
    };
    let crossing = capsule.start.lerp(capsule.end, t);

    if triangle_contains_point(tri, crossing) {
        return Some(Contact {
            normal,
            depth: d1.min(d2).abs(),
        });
    }

    let radius_sq = radius * radius;
    for (edge_start, edge_end) in [(tri.a, tri.b), (tri.b, tri.c), (tri.c, tri.a)] {
        let (on_axis, on_edge) =
            closest_points_between_segments(capsule.start, capsule.end, edge_start, edge_end);
        let offset = on_axis - on_edge;
        let dist_sq = offset.length_squared();

        if dist_sq < radius_sq {
            let dist = dist_sq.sqrt();
            let direction = if dist > DIRECTION_EPSILON {
                offset / dist
            } else {
                normal
            };
            return Some(Contact {
                normal: direction,
                depth: radius - dist,
            });
        }
    }

    None
}
