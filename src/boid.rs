/*
 * Boid Module
 *
 * This module defines the Boid struct: the kinematic record of one agent
 * (position, velocity, acceleration) together with the neighbor set and the
 * force breakdown computed during its most recent tick.
 *
 * Boids never hold references to each other. Neighbors are indices into the
 * population slice and are recomputed every tick.
 */

use glam::{Mat3, Quat, Vec3};
use rand::Rng;
use std::f32::consts::TAU;

use crate::params::{SimulationParams, SpawnShape};

// Used as "forward" when a boid has no velocity to derive a heading from
pub const DEFAULT_FORWARD: Vec3 = Vec3::Z;
// Up reference for disambiguating roll when deriving orientation
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Weighted steering contributions applied to a boid during its last tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Forces {
    pub separation: Vec3,
    pub alignment: Vec3,
    pub cohesion: Vec3,
    pub boundary: Vec3,
}

impl Forces {
    // Sum of all four contributions, i.e. the acceleration for the tick
    #[inline]
    pub fn total(&self) -> Vec3 {
        self.separation + self.alignment + self.cohesion + self.boundary
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Boid {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub neighbors: Vec<usize>,
    pub forces: Forces,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec3::ZERO,
            neighbors: Vec::new(),
            forces: Forces::default(),
        }
    }

    /// Spawns a boid according to the spawn shape and radius in `params`.
    ///
    /// The initial velocity is a random unit vector and acceleration starts at zero.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, params: &SimulationParams) -> Self {
        let position = match params.spawn_shape {
            SpawnShape::Shell => random_unit_vector(rng) * params.spawn_radius,
            SpawnShape::Volume => random_in_unit_sphere(rng) * params.spawn_radius,
        };

        Self::new(position, random_unit_vector(rng))
    }

    /// Direction the boid is facing: its normalized velocity, or `DEFAULT_FORWARD`
    /// when it is not moving.
    #[inline]
    pub fn facing(&self) -> Vec3 {
        let forward = self.velocity.normalize_or_zero();
        if forward == Vec3::ZERO {
            DEFAULT_FORWARD
        } else {
            forward
        }
    }

    /// Rotation that maps `+Z` onto the facing direction with `WORLD_UP` as the roll
    /// reference. Derived on demand for presentation layers, never stored.
    pub fn orientation(&self) -> Quat {
        let forward = self.facing();
        let mut right = WORLD_UP.cross(forward);
        if right.length_squared() <= f32::EPSILON {
            // Facing straight up or down, any horizontal axis will do
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = forward.cross(right);

        Quat::from_mat3(&Mat3::from_cols(right, up, forward)).normalize()
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

// Uniform random direction on the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

// Uniform random point inside the unit ball
pub fn random_in_unit_sphere<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let radius = rng.gen::<f32>().cbrt();
    random_unit_vector(rng) * radius
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn facing_falls_back_to_default_forward() {
        let boid = Boid::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(boid.facing(), DEFAULT_FORWARD);

        let moving = Boid::new(Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0));
        assert!((moving.facing() - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn orientation_points_forward_along_velocity() {
        let boid = Boid::new(Vec3::ZERO, Vec3::new(1.0, 2.0, -0.5));
        let rotated = boid.orientation() * Vec3::Z;
        assert!((rotated - boid.facing()).length() < 1e-5);

        let vertical = Boid::new(Vec3::ZERO, Vec3::Y);
        let rotated = vertical.orientation() * Vec3::Z;
        assert!((rotated - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn spawn_respects_shape_and_radius() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut params = SimulationParams {
            spawn_radius: 10.0,
            ..SimulationParams::default()
        };

        for _ in 0..200 {
            let boid = Boid::spawn(&mut rng, &params);
            assert!((boid.position.length() - 10.0).abs() < 1e-3);
            assert!((boid.velocity.length() - 1.0).abs() < 1e-5);
            assert_eq!(boid.acceleration, Vec3::ZERO);
            assert!(boid.neighbors.is_empty());
        }

        params.spawn_shape = SpawnShape::Volume;
        for _ in 0..200 {
            let boid = Boid::spawn(&mut rng, &params);
            assert!(boid.position.length() <= 10.0 + 1e-3);
        }
    }
}
