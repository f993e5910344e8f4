//! Fixed pool of dynamic spheres

use glam::Vec3;

use crate::shape::Sphere;

/// A launchable sphere
///
/// Parked bodies sit at the parking position with zero velocity and are
/// skipped by integration and pair checks until launched.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicBody {
    pub index: usize,
    pub collider: Sphere,
    pub velocity: Vec3,
    active: bool,
}

impl DynamicBody {
    pub fn parked(index: usize, collider: Sphere) -> Self {
        Self {
            index,
            collider,
            velocity: Vec3::ZERO,
            active: false,
        }
    }

    pub fn launched(index: usize, collider: Sphere, velocity: Vec3) -> Self {
        Self {
            index,
            collider,
            velocity,
            active: true,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Move to `position` with `velocity` and start integrating
    pub fn launch(&mut self, position: Vec3, velocity: Vec3) {
        self.collider.center = position;
        self.velocity = velocity;
        self.active = true;
    }

    /// Stop integrating and move out of the way
    pub fn park(&mut self, position: Vec3) {
        self.collider.center = position;
        self.velocity = Vec3::ZERO;
        self.active = false;
    }
}

/// Bodies allocated once at startup and recycled round-robin
#[derive(Debug, Clone)]
pub struct BodyPool {
    bodies: Vec<DynamicBody>,
    cursor: usize,
    parking: Vec3,
}

impl BodyPool {
    pub fn new(count: usize, radius: f32, parking: Vec3) -> Self {
        let bodies = (0..count)
            .map(|i| DynamicBody::parked(i, Sphere::new(parking, radius)))
            .collect();
        Self {
            bodies,
            cursor: 0,
            parking,
        }
    }

    /// Relaunch the body under the cursor, advancing it with wrap-around
    ///
    /// Returns the index of the recycled body, or `None` for an empty pool.
    pub fn launch_next(&mut self, position: Vec3, velocity: Vec3) -> Option<usize> {
        if self.bodies.is_empty() {
            return None;
        }

        let index = self.cursor;
        self.bodies[index].launch(position, velocity);
        self.cursor = (self.cursor + 1) % self.bodies.len();
        Some(index)
    }

    /// Park every active body whose center is at or below `height`
    ///
    /// Returns how many bodies were parked.
    pub fn park_below(&mut self, height: f32) -> usize {
        let parking = self.parking;
        let mut parked = 0;
        for body in self.bodies.iter_mut() {
            if body.is_active() && body.collider.center.y <= height {
                body.park(parking);
                parked += 1;
            }
        }
        parked
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_active()).count()
    }

    pub fn as_slice(&self) -> &[DynamicBody] {
        &self.bodies
    }

    pub fn as_mut_slice(&mut self) -> &mut [DynamicBody] {
        &mut self.bodies
    }
}
