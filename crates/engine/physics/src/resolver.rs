//! Collision response
//!
//! World-vs-body rules query a [`SurfaceQuery`] and apply the returned
//! contact as a single positional correction. Body-vs-body rules exchange
//! the velocity components along the contact normal (elastic, equal mass)
//! and split the positional correction. Corrections are applied at once so
//! later checks in the same substep see the updated positions.

use glam::Vec3;

use crate::body::DynamicBody;
use crate::shape::{Capsule, Sphere};
use crate::world::SurfaceQuery;

/// Center distances below this cannot yield a separating normal
const COINCIDENT_EPSILON: f32 = 1e-6;

/// Push the player capsule out of the world surface
///
/// Returns whether the capsule is standing on the floor, i.e. the contact
/// normal's vertical component exceeds `floor_threshold`. Off the floor the
/// velocity component directed into the surface is removed; on the floor
/// downward velocity is clamped to zero so upward motion survives.
pub fn resolve_capsule_against_world(
    world: &impl SurfaceQuery,
    capsule: &mut Capsule,
    velocity: &mut Vec3,
    floor_threshold: f32,
) -> bool {
    let Some(contact) = world.capsule_intersect(capsule) else {
        return false;
    };

    let on_floor = contact.normal.y > floor_threshold;

    if on_floor {
        velocity.y = velocity.y.max(0.0);
    } else {
        let into_surface = contact.normal.dot(*velocity);
        if into_surface < 0.0 {
            *velocity -= contact.normal * into_surface;
        }
    }

    capsule.translate(contact.correction());
    on_floor
}

/// Bounce a free sphere off the world surface
///
/// On contact the inward velocity component is reflected, scaled by
/// `restitution` (values above 1 rebound), and the sphere is pushed out.
/// Without contact gravity is applied for this substep. Returns whether the
/// sphere touched the surface.
pub fn resolve_sphere_against_world(
    world: &impl SurfaceQuery,
    sphere: &mut Sphere,
    velocity: &mut Vec3,
    restitution: f32,
    gravity: f32,
    dt: f32,
) -> bool {
    match world.sphere_intersect(sphere) {
        Some(contact) => {
            let into_surface = contact.normal.dot(*velocity);
            if into_surface < 0.0 {
                *velocity -= contact.normal * (into_surface * restitution);
            }
            sphere.translate(contact.correction());
            true
        }
        None => {
            velocity.y -= gravity * dt;
            false
        }
    }
}

/// Collide the player capsule with one sphere
///
/// The capsule is approximated by spheres at its start, end and midpoint.
/// Every overlapping point applies its own velocity exchange and moves the
/// sphere by half the overlap.
pub fn resolve_player_sphere(
    capsule: &Capsule,
    player_velocity: &mut Vec3,
    sphere: &mut Sphere,
    sphere_velocity: &mut Vec3,
) {
    let reach = capsule.radius + sphere.radius;
    let reach_sq = reach * reach;

    for point in [capsule.start, capsule.end, capsule.center()] {
        let offset = point - sphere.center;
        let dist_sq = offset.length_squared();
        if dist_sq >= reach_sq {
            continue;
        }

        let dist = dist_sq.sqrt();
        if dist < COINCIDENT_EPSILON {
            continue;
        }

        let normal = offset / dist;
        exchange_normal_velocity(normal, player_velocity, sphere_velocity);

        let overlap = (reach - dist) / 2.0;
        sphere.translate(-normal * overlap);
    }
}

/// Collide every unordered pair of active bodies
pub fn resolve_sphere_sphere(bodies: &mut [DynamicBody]) {
    for i in 0..bodies.len() {
        let (head, tail) = bodies.split_at_mut(i + 1);
        let first = &mut head[i];
        if !first.is_active() {
            continue;
        }

        for second in tail.iter_mut().filter(|b| b.is_active()) {
            let offset = first.collider.center - second.collider.center;
            let reach = first.collider.radius + second.collider.radius;
            let dist_sq = offset.length_squared();
            if dist_sq >= reach * reach {
                continue;
            }

            let dist = dist_sq.sqrt();
            if dist < COINCIDENT_EPSILON {
                continue;
            }

            let normal = offset / dist;
            exchange_normal_velocity(normal, &mut first.velocity, &mut second.velocity);

            let overlap = (reach - dist) / 2.0;
            first.collider.translate(normal * overlap);
            second.collider.translate(-normal * overlap);
        }
    }
}

/// Swap the components of two velocities along `normal`
fn exchange_normal_velocity(normal: Vec3, a: &mut Vec3, b: &mut Vec3) {
    let along_a = normal * normal.dot(*a);
    let along_b = normal * normal.dot(*b);
    *a += along_b - along_a;
    *b += along_a - along_b;
}
