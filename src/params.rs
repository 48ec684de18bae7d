/*
 * Simulation Parameters Module
 *
 * This module defines the SimulationParams struct that contains every tunable
 * scalar shared by all boids. Parameters are read-only during a tick; edits made
 * between ticks take effect at the next tick boundary.
 *
 * It also provides the snapshot-based change detection used by the parallel
 * backend to push only modified values, and flat JSON persistence.
 */

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::SimulationError;

// Smallest radius a degenerate configuration is coerced to
pub const MIN_RADIUS: f32 = 1e-3;

/// How initial positions are distributed around the origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnShape {
    /// Random direction scaled to exactly `spawn_radius`.
    #[default]
    Shell,
    /// Uniformly distributed inside the ball of `spawn_radius`.
    Volume,
}

// Parameters for the simulation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub num_boids: usize,
    pub spawn_radius: f32,
    pub spawn_shape: SpawnShape,
    pub boundary_radius: f32,
    pub max_velocity: f32,
    pub max_acceleration: f32,
    pub neighbor_distance: f32,
    pub field_of_view_degrees: f32,
    // Force multipliers
    pub separation_weight: f32,
    pub alignment_weight: f32,
    pub cohesion_weight: f32,
    pub boundary_weight: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            num_boids: 150,
            spawn_radius: 1.0,
            spawn_shape: SpawnShape::Shell,
            boundary_radius: 100.0,
            max_velocity: 1.75,
            max_acceleration: 0.03,
            neighbor_distance: 50.0,
            field_of_view_degrees: 300.0,
            separation_weight: 1.5,
            alignment_weight: 1.0,
            cohesion_weight: 1.0,
            boundary_weight: 1.0,
        }
    }
}

/// Scalar fields that can change between ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamField {
    NumBoids,
    SpawnRadius,
    BoundaryRadius,
    MaxVelocity,
    MaxAcceleration,
    NeighborDistance,
    FieldOfView,
    SeparationWeight,
    AlignmentWeight,
    CohesionWeight,
    BoundaryWeight,
}

// A snapshot of parameter values used for change detection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSnapshot {
    num_boids: usize,
    spawn_radius: f32,
    boundary_radius: f32,
    max_velocity: f32,
    max_acceleration: f32,
    neighbor_distance: f32,
    field_of_view_degrees: f32,
    separation_weight: f32,
    alignment_weight: f32,
    cohesion_weight: f32,
    boundary_weight: f32,
}

impl ParamSnapshot {
    /// Fields whose value in `params` differs from this snapshot.
    pub fn changed_fields(&self, params: &SimulationParams) -> Vec<ParamField> {
        let checks = [
            (self.num_boids != params.num_boids, ParamField::NumBoids),
            (self.spawn_radius != params.spawn_radius, ParamField::SpawnRadius),
            (self.boundary_radius != params.boundary_radius, ParamField::BoundaryRadius),
            (self.max_velocity != params.max_velocity, ParamField::MaxVelocity),
            (self.max_acceleration != params.max_acceleration, ParamField::MaxAcceleration),
            (self.neighbor_distance != params.neighbor_distance, ParamField::NeighborDistance),
            (self.field_of_view_degrees != params.field_of_view_degrees, ParamField::FieldOfView),
            (self.separation_weight != params.separation_weight, ParamField::SeparationWeight),
            (self.alignment_weight != params.alignment_weight, ParamField::AlignmentWeight),
            (self.cohesion_weight != params.cohesion_weight, ParamField::CohesionWeight),
            (self.boundary_weight != params.boundary_weight, ParamField::BoundaryWeight),
        ];

        checks
            .into_iter()
            .filter_map(|(changed, field)| changed.then_some(field))
            .collect()
    }
}

impl SimulationParams {
    // Take a snapshot of current parameter values for change detection
    pub fn take_snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            num_boids: self.num_boids,
            spawn_radius: self.spawn_radius,
            boundary_radius: self.boundary_radius,
            max_velocity: self.max_velocity,
            max_acceleration: self.max_acceleration,
            neighbor_distance: self.neighbor_distance,
            field_of_view_degrees: self.field_of_view_degrees,
            separation_weight: self.separation_weight,
            alignment_weight: self.alignment_weight,
            cohesion_weight: self.cohesion_weight,
            boundary_weight: self.boundary_weight,
        }
    }

    /// Returns a copy with degenerate values coerced to the nearest valid value.
    ///
    /// Counts are forced to at least one, radii to at least `MIN_RADIUS`, limits and
    /// distances to be non-negative and the field of view into `[0, 360]`. Infinite
    /// radii and limits fall back to their defaults; an infinite neighbor distance is
    /// kept. Each coercion is logged; none of them is an error.
    pub fn sanitized(&self) -> Self {
        let mut params = self.clone();

        if params.num_boids < 1 {
            warn!(num_boids = params.num_boids, "boid count must be at least 1, using 1");
            params.num_boids = 1;
        }

        let defaults = SimulationParams::default();
        params.spawn_radius = coerce_radius("spawn_radius", params.spawn_radius, defaults.spawn_radius);
        params.boundary_radius =
            coerce_radius("boundary_radius", params.boundary_radius, defaults.boundary_radius);
        params.max_velocity = coerce_limit("max_velocity", params.max_velocity, defaults.max_velocity);
        params.max_acceleration =
            coerce_limit("max_acceleration", params.max_acceleration, defaults.max_acceleration);
        // +inf is allowed here and means every boid in the field of view is a neighbor
        params.neighbor_distance = coerce_non_negative("neighbor_distance", params.neighbor_distance);

        let fov = params.field_of_view_degrees;
        if !(0.0..=360.0).contains(&fov) {
            let clamped = if fov.is_nan() { 0.0 } else { fov.clamp(0.0, 360.0) };
            warn!(field_of_view_degrees = fov, clamped, "field of view out of range");
            params.field_of_view_degrees = clamped;
        }

        for (name, weight) in [
            ("separation_weight", &mut params.separation_weight),
            ("alignment_weight", &mut params.alignment_weight),
            ("cohesion_weight", &mut params.cohesion_weight),
            ("boundary_weight", &mut params.boundary_weight),
        ] {
            if !weight.is_finite() {
                warn!(param = name, "non-finite force multiplier, using 0");
                *weight = 0.0;
            }
        }

        params
    }

    /// True when `sanitized` would return these parameters unchanged.
    pub fn is_sanitized(&self) -> bool {
        let radius_ok = |r: f32| r.is_finite() && r >= MIN_RADIUS;
        let limit_ok = |v: f32| v.is_finite() && v >= 0.0;

        self.num_boids >= 1
            && radius_ok(self.spawn_radius)
            && radius_ok(self.boundary_radius)
            && limit_ok(self.max_velocity)
            && limit_ok(self.max_acceleration)
            && self.neighbor_distance >= 0.0
            && (0.0..=360.0).contains(&self.field_of_view_degrees)
            && [
                self.separation_weight,
                self.alignment_weight,
                self.cohesion_weight,
                self.boundary_weight,
            ]
            .iter()
            .all(|w| w.is_finite())
    }

    /// Borrows valid parameters as-is and only builds a coerced copy when needed.
    pub fn coerced(&self) -> Cow<'_, SimulationParams> {
        if self.is_sanitized() {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(self.sanitized())
        }
    }

    /// Loads a flat JSON parameter file. Missing keys take their default value.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let params: Self = serde_json::from_str(&text).map_err(|source| SimulationError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(params.sanitized())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SimulationError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|source| SimulationError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        fs::write(path, text).map_err(|source| SimulationError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

fn coerce_radius(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_infinite() && value > 0.0 {
        warn!(param = name, "infinite radius, using {}", fallback);
        return fallback;
    }
    if value >= MIN_RADIUS {
        return value;
    }
    warn!(param = name, value, "radius must be positive, using {}", MIN_RADIUS);
    MIN_RADIUS
}

fn coerce_limit(name: &str, value: f32, fallback: f32) -> f32 {
    if value.is_infinite() && value > 0.0 {
        warn!(param = name, "infinite limit, using {}", fallback);
        return fallback;
    }
    coerce_non_negative(name, value)
}

fn coerce_non_negative(name: &str, value: f32) -> f32 {
    if value >= 0.0 {
        return value;
    }
    warn!(param = name, value, "negative value, using 0");
    0.0
}
