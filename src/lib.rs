/*
 * Boid Flocking Simulation - Module Definitions
 *
 * This file defines the module structure for the flocking core. The two entry
 * points for a surrounding application are `initialize` and `step`; everything
 * else is the per-boid pipeline (neighbors -> steering -> integration) and the
 * backends that run it.
 */

// Re-export key components for easier access
pub use boid::{Boid, Forces};
pub use debug::DebugInfo;
pub use error::SimulationError;
pub use parallel::{KernelParams, ParallelFlock, ParamSync};
pub use params::{ParamField, SimulationParams, SpawnShape};
pub use physics::{initialize, initialize_with_rng, step, step_into};
pub use simulation::{Backend, Simulation};

// Define modules
pub mod boid;
pub mod debug;
pub mod error;
pub mod neighbors;
pub mod parallel;
pub mod params;
pub mod physics;
pub mod simulation;
pub mod steering;
