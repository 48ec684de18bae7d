/*
 * Parallel Backend Module
 *
 * Re-expresses the simulation step as a data-parallel kernel: every boid runs
 * the same per-boid pipeline as the sequential step, as an independent unit of
 * work that only reads the shared snapshot and writes its own output slot.
 *
 * The population lives in a pair of buffers owned by the backend. It is
 * uploaded once, advanced in place across ticks, and only read back by
 * diagnostics. Scalar parameters live in a separate kernel-side copy and are
 * pushed from the host only when they change.
 */

use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::boid::Boid;
use crate::params::{ParamField, ParamSnapshot, SimulationParams};
use crate::physics::{initialize_with_rng, simulate_boid};

/// Kernel-side copy of the scalar parameters read by every unit of work.
#[derive(Clone, Debug)]
pub struct KernelParams {
    params: SimulationParams,
    uploads: u64,
}

impl KernelParams {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            params: params.sanitized(),
            uploads: 0,
        }
    }

    #[inline]
    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    // Total number of individual values pushed since creation
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    /// Copies a single field from `host`. Returns false for fields that only
    /// matter when the population is created.
    pub fn upload(&mut self, field: ParamField, host: &SimulationParams) -> bool {
        let kernel = &mut self.params;
        match field {
            ParamField::NumBoids | ParamField::SpawnRadius => return false,
            ParamField::BoundaryRadius => kernel.boundary_radius = host.boundary_radius,
            ParamField::MaxVelocity => kernel.max_velocity = host.max_velocity,
            ParamField::MaxAcceleration => kernel.max_acceleration = host.max_acceleration,
            ParamField::NeighborDistance => kernel.neighbor_distance = host.neighbor_distance,
            ParamField::FieldOfView => kernel.field_of_view_degrees = host.field_of_view_degrees,
            ParamField::SeparationWeight => kernel.separation_weight = host.separation_weight,
            ParamField::AlignmentWeight => kernel.alignment_weight = host.alignment_weight,
            ParamField::CohesionWeight => kernel.cohesion_weight = host.cohesion_weight,
            ParamField::BoundaryWeight => kernel.boundary_weight = host.boundary_weight,
        }
        self.uploads += 1;
        true
    }
}

/// Host-side record of the parameters last pushed to the kernel.
#[derive(Clone, Debug)]
pub struct ParamSync {
    last_synced: ParamSnapshot,
}

impl ParamSync {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            last_synced: params.take_snapshot(),
        }
    }

    /// Pushes every field that changed since the last sync and returns the fields
    /// that were actually uploaded.
    pub fn sync(&mut self, host: &SimulationParams, kernel: &mut KernelParams) -> Vec<ParamField> {
        let changed = self.last_synced.changed_fields(host);
        if changed.is_empty() {
            return changed;
        }

        // Compare raw values so a degenerate host value is only coerced and
        // reported once
        self.last_synced = host.take_snapshot();
        let host = host.sanitized();

        let mut uploaded = Vec::with_capacity(changed.len());
        for field in changed {
            if kernel.upload(field, &host) {
                uploaded.push(field);
            } else {
                warn!(?field, "parameter only applies when the flock is spawned, ignoring until reset");
            }
        }

        if !uploaded.is_empty() {
            debug!(fields = ?uploaded, "pushed parameter changes to kernel");
        }
        uploaded
    }
}

// Chunk size that spreads the population evenly over the rayon pool
pub fn default_chunk_size(num_boids: usize) -> usize {
    std::cmp::max(num_boids / rayon::current_num_threads(), 1)
}

/// Advances every boid of `snapshot` by one tick into `out`, processing
/// `chunk_size` boids per parallel task.
pub fn step_parallel(snapshot: &[Boid], params: &SimulationParams, out: &mut [Boid], chunk_size: usize) {
    assert_eq!(snapshot.len(), out.len(), "back buffer must match the population size");
    let params = params.coerced();
    let params: &SimulationParams = &params;
    let chunk_size = chunk_size.max(1);

    out.par_chunks_mut(chunk_size)
        .enumerate()
        .for_each(|(chunk_idx, boid_chunk)| {
            for (i_in_chunk, boid) in boid_chunk.iter_mut().enumerate() {
                let i = chunk_idx * chunk_size + i_in_chunk;
                simulate_boid(i, snapshot, params, boid);
            }
        });
}

/// Double-buffered flock advanced by the parallel kernel.
pub struct ParallelFlock {
    front: Vec<Boid>,
    back: Vec<Boid>,
    kernel: KernelParams,
    sync: ParamSync,
    chunk_size: Option<usize>,
    ticks: u64,
}

impl ParallelFlock {
    pub fn new<R: Rng + ?Sized>(params: &SimulationParams, rng: &mut R) -> Self {
        Self::with_population(initialize_with_rng(params, rng), params)
    }

    /// Uploads an existing population. `params` becomes the synced baseline.
    pub fn with_population(boids: Vec<Boid>, params: &SimulationParams) -> Self {
        debug!(num_boids = boids.len(), "uploading population to parallel backend");
        let back = boids.clone();

        Self {
            front: boids,
            back,
            kernel: KernelParams::new(params),
            sync: ParamSync::new(params),
            chunk_size: None,
            ticks: 0,
        }
    }

    // Fix the number of boids handled by each parallel task
    pub fn set_chunk_size(&mut self, chunk_size: Option<usize>) {
        self.chunk_size = chunk_size.map(|size| size.max(1));
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size.unwrap_or_else(|| default_chunk_size(self.front.len()))
    }

    /// Syncs changed parameters, then advances every boid exactly one tick.
    pub fn dispatch(&mut self, host: &SimulationParams) {
        self.sync.sync(host, &mut self.kernel);

        let chunk_size = self.chunk_size();
        step_parallel(&self.front, self.kernel.params(), &mut self.back, chunk_size);
        std::mem::swap(&mut self.front, &mut self.back);
        self.ticks += 1;
    }

    /// Read-back of the current population for diagnostics and visualization.
    pub fn boids(&self) -> &[Boid] {
        &self.front
    }

    pub fn kernel(&self) -> &KernelParams {
        &self.kernel
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
