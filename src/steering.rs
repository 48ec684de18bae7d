/*
 * Steering Module
 *
 * The four steering rules. Each one returns a desired acceleration (target
 * velocity minus current velocity) clamped to `max_acceleration`, never a new
 * velocity:
 * 1. Separation: steer away from neighbors, closer ones weighted by 1/d^2
 * 2. Alignment: steer towards the summed heading of neighbors
 * 3. Cohesion: steer towards the center of mass of neighbors
 * 4. Boundary: steer back towards the origin once outside `boundary_radius`
 *
 * Separation, alignment and cohesion return zero for an empty neighbor set.
 */

use glam::Vec3;

use crate::boid::{Boid, Forces};
use crate::params::SimulationParams;

// Reynolds: Steering = Desired - Velocity, limited to the maximum acceleration
#[inline]
fn steer(boid: &Boid, desired_direction: Vec3, params: &SimulationParams) -> Vec3 {
    let desired = desired_direction.normalize_or_zero() * params.max_velocity;
    (desired - boid.velocity).clamp_length_max(params.max_acceleration)
}

pub fn separation(boid: &Boid, neighbor_indices: &[usize], boids: &[Boid], params: &SimulationParams) -> Vec3 {
    if neighbor_indices.is_empty() {
        return Vec3::ZERO;
    }

    let mut away = Vec3::ZERO;
    for &i in neighbor_indices {
        let diff = boid.position - boids[i].position;
        let distance_squared = diff.length_squared();
        if distance_squared > 0.0 {
            away += diff.normalize_or_zero() / distance_squared;
        }
    }

    steer(boid, away, params)
}

pub fn alignment(boid: &Boid, neighbor_indices: &[usize], boids: &[Boid], params: &SimulationParams) -> Vec3 {
    if neighbor_indices.is_empty() {
        return Vec3::ZERO;
    }

    let heading: Vec3 = neighbor_indices.iter().map(|&i| boids[i].velocity).sum();
    steer(boid, heading, params)
}

pub fn cohesion(boid: &Boid, neighbor_indices: &[usize], boids: &[Boid], params: &SimulationParams) -> Vec3 {
    if neighbor_indices.is_empty() {
        return Vec3::ZERO;
    }

    let sum: Vec3 = neighbor_indices.iter().map(|&i| boids[i].position).sum();
    let center_of_mass = sum / neighbor_indices.len() as f32;

    steer(boid, center_of_mass - boid.position, params)
}

/// Pull back towards the origin, zero while `|position| <= boundary_radius`.
///
/// Outside the boundary the force blends a weak correction (unit direction to the
/// origin scaled to `max_velocity`, clamped to `max_acceleration`) with a strong one
/// (the same direction scaled by the distance past the boundary). The blend factor
/// is `|excess| / boundary_radius^2` clamped to `[0, 1]`, and the result is clamped
/// to `max_acceleration` like every other rule.
pub fn boundary(boid: &Boid, params: &SimulationParams) -> Vec3 {
    let distance = boid.position.length();
    let radius = params.boundary_radius;
    if distance <= radius {
        return Vec3::ZERO;
    }

    let home = (-boid.position).normalize_or_zero();
    let excess = (distance - radius).abs();

    let weak = (home * params.max_velocity).clamp_length_max(params.max_acceleration);
    let strong = home * excess;
    let t = (excess / (radius * radius)).clamp(0.0, 1.0);

    weak.lerp(strong, t).clamp_length_max(params.max_acceleration)
}

/// Unweighted steering forces for one boid against the tick's snapshot.
pub fn compute_forces(
    boid: &Boid,
    neighbor_indices: &[usize],
    boids: &[Boid],
    params: &SimulationParams,
) -> Forces {
    Forces {
        separation: separation(boid, neighbor_indices, boids, params),
        alignment: alignment(boid, neighbor_indices, boids, params),
        cohesion: cohesion(boid, neighbor_indices, boids, params),
        boundary: boundary(boid, params),
    }
}

impl Forces {
    // Apply the per-rule multipliers
    pub fn weighted(&self, params: &SimulationParams) -> Forces {
        Forces {
            separation: self.separation * params.separation_weight,
            alignment: self.alignment * params.alignment_weight,
            cohesion: self.cohesion * params.cohesion_weight,
            boundary: self.boundary * params.boundary_weight,
        }
    }
}
