/*
 * Neighbor Query Module
 *
 * Finds the boids visible to a given boid: closer than the neighbor distance and
 * inside its field of view cone. The scan is exhaustive, O(n) per boid and O(n^2)
 * per tick, and runs against a read-only snapshot of the population.
 *
 * Visibility is not symmetric: a boid can see another that is behind it from the
 * other's point of view.
 */

use glam::Vec3;

use crate::boid::Boid;
use crate::params::SimulationParams;

/// Angle in degrees between `forward` and `offset`. Zero-length inputs give 0.
#[inline]
pub fn view_angle_degrees(forward: Vec3, offset: Vec3) -> f32 {
    let a = forward.normalize_or_zero();
    let b = offset.normalize_or_zero();
    if a == Vec3::ZERO || b == Vec3::ZERO {
        return 0.0;
    }
    a.dot(b).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Whether `other` is visible from `boid`.
///
/// Requires `0 < distance <= neighbor_distance` and a view angle strictly less than
/// half the field of view. The `distance > 0` guard excludes the boid itself and
/// any boid sitting exactly on top of it.
#[inline]
pub fn is_visible(boid: &Boid, other: &Boid, params: &SimulationParams) -> bool {
    let offset = other.position - boid.position;
    let distance = offset.length();

    distance > 0.0
        && distance <= params.neighbor_distance
        && view_angle_degrees(boid.facing(), offset) < params.field_of_view_degrees / 2.0
}

/// Indices of the boids visible to `boids[index]`, in index order.
pub fn neighbors(index: usize, boids: &[Boid], params: &SimulationParams) -> Vec<usize> {
    let mut result = Vec::new();
    neighbors_into(index, boids, params, &mut result);
    result
}

/// Same as [`neighbors`] but reuses the caller's buffer. The buffer is cleared first.
pub fn neighbors_into(index: usize, boids: &[Boid], params: &SimulationParams, out: &mut Vec<usize>) {
    out.clear();
    let boid = &boids[index];

    for (j, other) in boids.iter().enumerate() {
        if j != index && is_visible(boid, other, params) {
            out.push(j);
        }
    }
}
