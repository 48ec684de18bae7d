/*
 * Simulation Module
 *
 * Owns a flock, its parameters and the chosen execution backend. An external
 * driver calls `tick` once per step; there are no implicit lifecycle hooks.
 * Parameter edits made through `params_mut` take effect at the next tick.
 */

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::time::Instant;
use tracing::info;

use crate::boid::Boid;
use crate::debug::DebugInfo;
use crate::parallel::ParallelFlock;
use crate::params::SimulationParams;
use crate::physics::{initialize_with_rng, step_into};

// Populations at least this large use the parallel backend under `Backend::Auto`
pub const PARALLEL_THRESHOLD: usize = 2048;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Backend {
    Sequential,
    Parallel,
    #[default]
    Auto,
}

impl Backend {
    pub fn resolve(self, num_boids: usize) -> Backend {
        match self {
            Backend::Auto if num_boids >= PARALLEL_THRESHOLD => Backend::Parallel,
            Backend::Auto => Backend::Sequential,
            other => other,
        }
    }
}

enum Engine {
    Sequential {
        front: Vec<Boid>,
        back: Vec<Boid>,
        // Coerced copy of the params the last tick ran with, and its raw source
        applied: SimulationParams,
        source: SimulationParams,
    },
    Parallel(ParallelFlock),
}

pub struct Simulation {
    params: SimulationParams,
    requested: Backend,
    backend: Backend,
    engine: Engine,
    rng: StdRng,
    debug_info: DebugInfo,
}

impl Simulation {
    pub fn new(params: SimulationParams, backend: Backend) -> Self {
        Self::from_rng(params, backend, StdRng::from_entropy())
    }

    /// Seeded simulation: identical seeds and parameters give identical runs.
    pub fn with_seed(params: SimulationParams, backend: Backend, seed: u64) -> Self {
        Self::from_rng(params, backend, StdRng::seed_from_u64(seed))
    }

    fn from_rng(params: SimulationParams, requested: Backend, mut rng: StdRng) -> Self {
        let params = params.sanitized();
        let backend = requested.resolve(params.num_boids);
        let engine = build_engine(&params, backend, &mut rng);

        info!(num_boids = params.num_boids, ?backend, "simulation ready");

        let mut simulation = Self {
            params,
            requested,
            backend,
            engine,
            rng,
            debug_info: DebugInfo::default(),
        };
        simulation.refresh_debug_info();
        simulation
    }

    /// Advances the flock by exactly one tick.
    pub fn tick(&mut self) {
        let started = Instant::now();

        match &mut self.engine {
            Engine::Sequential {
                front,
                back,
                applied,
                source,
            } => {
                if *source != self.params {
                    *applied = self.params.sanitized();
                    *source = self.params.clone();
                }
                step_into(front, applied, back);
                std::mem::swap(front, back);
            }
            Engine::Parallel(flock) => flock.dispatch(&self.params),
        }

        // Diagnostics gathering is not part of the step time
        let step_time = started.elapsed();
        let tick = self.debug_info.tick + 1;
        self.refresh_debug_info();
        self.debug_info.tick = tick;
        self.debug_info.step_time = step_time;
    }

    // Re-spawn the whole flock with the current parameters
    pub fn reset(&mut self) {
        self.params = self.params.sanitized();
        self.backend = self.requested.resolve(self.params.num_boids);
        self.engine = build_engine(&self.params, self.backend, &mut self.rng);
        self.debug_info = DebugInfo::default();
        self.refresh_debug_info();
        info!(num_boids = self.params.num_boids, backend = ?self.backend, "simulation reset");
    }

    pub fn boids(&self) -> &[Boid] {
        match &self.engine {
            Engine::Sequential { front, .. } => front,
            Engine::Parallel(flock) => flock.boids(),
        }
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SimulationParams {
        &mut self.params
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn debug_info(&self) -> &DebugInfo {
        &self.debug_info
    }

    fn refresh_debug_info(&mut self) {
        let previous = std::mem::take(&mut self.debug_info);
        let mut info = DebugInfo::gather(self.boids(), &self.params);
        info.tick = previous.tick;
        info.step_time = previous.step_time;
        if let Engine::Parallel(flock) = &self.engine {
            info.chunk_size = Some(flock.chunk_size());
            info.param_uploads = flock.kernel().uploads();
        }
        self.debug_info = info;
    }
}

fn build_engine(params: &SimulationParams, backend: Backend, rng: &mut dyn RngCore) -> Engine {
    let boids = initialize_with_rng(params, rng);
    match backend {
        Backend::Parallel => Engine::Parallel(ParallelFlock::with_population(boids, params)),
        _ => {
            let back = boids.clone();
            Engine::Sequential {
                front: boids,
                back,
                applied: params.sanitized(),
                source: params.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn params() -> SimulationParams {
        SimulationParams {
            num_boids: 40,
            spawn_radius: 20.0,
            ..SimulationParams::default()
        }
    }

    #[test]
    fn auto_backend_depends_on_population() {
        assert_eq!(Backend::Auto.resolve(10), Backend::Sequential);
        assert_eq!(Backend::Auto.resolve(PARALLEL_THRESHOLD), Backend::Parallel);
        assert_eq!(Backend::Sequential.resolve(1_000_000), Backend::Sequential);
        assert_eq!(Backend::Parallel.resolve(1), Backend::Parallel);
    }

    #[test]
    fn backends_agree_for_the_same_seed() {
        let mut sequential = Simulation::with_seed(params(), Backend::Sequential, 99);
        let mut parallel = Simulation::with_seed(params(), Backend::Parallel, 99);
        assert_eq!(sequential.boids(), parallel.boids());

        for _ in 0..10 {
            sequential.tick();
            parallel.tick();
        }

        assert_eq!(sequential.boids(), parallel.boids());
        assert_eq!(sequential.debug_info().tick, 10);
        assert!(parallel.debug_info().chunk_size.is_some());
    }

    #[test]
    fn reset_applies_new_population_size() {
        let mut simulation = Simulation::with_seed(params(), Backend::Auto, 1);
        simulation.tick();
        simulation.params_mut().num_boids = 7;
        simulation.reset();

        assert_eq!(simulation.boids().len(), 7);
        assert_eq!(simulation.debug_info().tick, 0);
    }

    #[test]
    fn tick_records_step_time() {
        let mut simulation = Simulation::with_seed(params(), Backend::Sequential, 8);
        assert_eq!(simulation.debug_info().step_time, Duration::ZERO);

        simulation.tick();
        assert_eq!(simulation.debug_info().tick, 1);
        assert!(simulation.debug_info().step_time > Duration::ZERO);
        assert_eq!(simulation.debug_info().num_boids, 40);
    }

    #[test]
    fn degenerate_params_are_coerced() {
        let simulation = Simulation::with_seed(
            SimulationParams {
                num_boids: 0,
                ..params()
            },
            Backend::Auto,
            3,
        );
        assert_eq!(simulation.boids().len(), 1);
        assert_eq!(simulation.params().num_boids, 1);
    }
}
