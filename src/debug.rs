/*
 * Debug Information Module
 *
 * This module defines the DebugInfo struct: read-back statistics about the
 * flock for logging and external visualization. Gathering never mutates the
 * population.
 *
 * Includes metrics for:
 * - Tick count and last step duration
 * - Neighbor counts (mean and max)
 * - Speeds (mean and max) and the flock centroid
 * - Boids currently outside the boundary
 * - Parallel dispatch chunk size and parameter uploads
 */

use glam::Vec3;
use std::fmt;
use std::time::Duration;

use crate::boid::Boid;
use crate::params::SimulationParams;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DebugInfo {
    pub tick: u64,
    pub num_boids: usize,
    pub step_time: Duration,
    pub mean_neighbors: f32,
    pub max_neighbors: usize,
    pub mean_speed: f32,
    pub max_speed: f32,
    pub centroid: Vec3,
    pub outside_boundary: usize,
    pub chunk_size: Option<usize>,
    pub param_uploads: u64,
}

impl DebugInfo {
    /// Collects population statistics. Timing and backend fields are left at their
    /// defaults for the caller to fill in.
    pub fn gather(boids: &[Boid], params: &SimulationParams) -> Self {
        let mut info = DebugInfo {
            num_boids: boids.len(),
            ..DebugInfo::default()
        };
        if boids.is_empty() {
            return info;
        }

        let mut neighbor_total = 0usize;
        let mut speed_total = 0.0f32;
        let mut position_total = Vec3::ZERO;

        for boid in boids {
            let speed = boid.speed();
            neighbor_total += boid.neighbors.len();
            speed_total += speed;
            position_total += boid.position;

            info.max_neighbors = info.max_neighbors.max(boid.neighbors.len());
            info.max_speed = info.max_speed.max(speed);
            if boid.position.length() > params.boundary_radius {
                info.outside_boundary += 1;
            }
        }

        let n = boids.len() as f32;
        info.mean_neighbors = neighbor_total as f32 / n;
        info.mean_speed = speed_total / n;
        info.centroid = position_total / n;
        info
    }
}

impl fmt::Display for DebugInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tick {} | {} boids | step {:.2?} | neighbors {:.1} avg / {} max | speed {:.3} avg / {:.3} max | outside {}",
            self.tick,
            self.num_boids,
            self.step_time,
            self.mean_neighbors,
            self.max_neighbors,
            self.mean_speed,
            self.max_speed,
            self.outside_boundary,
        )?;
        if let Some(chunk_size) = self.chunk_size {
            write!(f, " | chunk {}", chunk_size)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gather_summarizes_population() {
        let params = SimulationParams::default();
        let mut boids = vec![
            Boid::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)),
            Boid::new(Vec3::new(-200.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0)),
        ];
        boids[0].neighbors = vec![1];

        let info = DebugInfo::gather(&boids, &params);
        assert_eq!(info.num_boids, 2);
        assert_eq!(info.max_neighbors, 1);
        assert!((info.mean_neighbors - 0.5).abs() < 1e-6);
        assert!((info.mean_speed - 0.75).abs() < 1e-6);
        assert_eq!(info.max_speed, 1.0);
        assert_eq!(info.centroid, Vec3::new(-95.0, 0.0, 0.0));
        assert_eq!(info.outside_boundary, 1);
    }

    #[test]
    fn gather_handles_empty_population() {
        let info = DebugInfo::gather(&[], &SimulationParams::default());
        assert_eq!(info, DebugInfo::default());
    }
}
