/*
 * Physics Module
 *
 * This module handles the simulation step for the flock:
 * - spawning the initial population
 * - integrating the weighted steering forces into velocity and position
 * - advancing every boid by one tick against a consistent snapshot
 *
 * Every boid reads the population as it was at the start of the tick and writes
 * into a separate output buffer, so the processing order never affects results.
 * The per-boid pipeline in `simulate_boid` is shared with the parallel backend.
 */

use glam::Vec3;
use rand::Rng;
use tracing::debug;

use crate::boid::{Boid, Forces};
use crate::neighbors::neighbors_into;
use crate::params::SimulationParams;
use crate::steering::compute_forces;

/// Kinematic state produced by one integration step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Integrated {
    pub acceleration: Vec3,
    pub velocity: Vec3,
    pub position: Vec3,
}

/// Combines the weighted forces into acceleration and advances velocity and
/// position by one unit tick. Velocity is clamped to `max_velocity`.
#[inline]
pub fn integrate(boid: &Boid, weighted: &Forces, params: &SimulationParams) -> Integrated {
    let acceleration = weighted.total();
    let velocity = (boid.velocity + acceleration).clamp_length_max(params.max_velocity);
    let position = boid.position + velocity;

    Integrated {
        acceleration,
        velocity,
        position,
    }
}

/// Runs the full per-boid pipeline for `snapshot[index]` and writes the result
/// into `out`. `out.neighbors` is reused as scratch storage for the neighbor set.
pub fn simulate_boid(index: usize, snapshot: &[Boid], params: &SimulationParams, out: &mut Boid) {
    let boid = &snapshot[index];

    neighbors_into(index, snapshot, params, &mut out.neighbors);
    let forces = compute_forces(boid, &out.neighbors, snapshot, params).weighted(params);
    let next = integrate(boid, &forces, params);

    out.position = next.position;
    out.velocity = next.velocity;
    out.acceleration = next.acceleration;
    out.forces = forces;
}

// Spawn a fresh population using the thread-local generator
pub fn initialize(params: &SimulationParams) -> Vec<Boid> {
    initialize_with_rng(params, &mut rand::thread_rng())
}

/// Allocates `num_boids` boids (after coercing degenerate parameters) with
/// randomized positions and unit velocities drawn from `rng`.
pub fn initialize_with_rng<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> Vec<Boid> {
    let params = params.sanitized();
    debug!(
        num_boids = params.num_boids,
        spawn_radius = params.spawn_radius,
        "spawning flock"
    );

    (0..params.num_boids).map(|_| Boid::spawn(rng, &params)).collect()
}

/// Advances the population by one tick, returning the new state.
pub fn step(snapshot: &[Boid], params: &SimulationParams) -> Vec<Boid> {
    let mut next = snapshot.to_vec();
    step_into(snapshot, params, &mut next);
    next
}

/// Sequential tick into a caller-provided back buffer of the same length.
/// Degenerate parameters are coerced the same way `initialize` coerces them.
pub fn step_into(snapshot: &[Boid], params: &SimulationParams, out: &mut [Boid]) {
    assert_eq!(snapshot.len(), out.len(), "back buffer must match the population size");
    let params = params.coerced();
    let params: &SimulationParams = &params;

    for (index, boid) in out.iter_mut().enumerate() {
        simulate_boid(index, snapshot, params, boid);
    }
}
