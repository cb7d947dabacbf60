//! Grid-Target Engine
//!
//! A fixed N×N grid of candidate target points, spaced and offset
//! proportionally to the capture surface so the layout is
//! resolution-independent. One point is the active target; arriving within
//! the arrival radius scores, relocates the target to a randomly chosen
//! different cell, and latches until the target index changes.

use super::GestureEngine;
use crate::geometry::{pick_different_index, Point};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Reference layout the proportions are derived from: a 3×3 grid with
/// 100 px spacing and 80 px edge offset on a 360 px surface.
const BASE_OFFSET_RATIO: f64 = 80.0 / 360.0;

/// Default grid dimension (N in N×N)
pub const DEFAULT_GRID_SIZE: usize = 3;
/// Default arrival radius, pixels
pub const DEFAULT_ARRIVAL_RADIUS: f64 = 20.0;

/// Target-acquisition engine over an N×N grid
#[derive(Debug)]
pub struct GridTargetEngine {
    grid_size: usize,
    arrival_radius: f64,
    /// Clamp bound; tracked positions never leave `[0, extent]`
    extent: f64,
    points: Vec<Point>,
    target_idx: usize,
    previous_idx: usize,
    /// Set on arrival, released when the target index changes
    arrival_pending: bool,
    tracked: Point,
    rng: StdRng,
}

impl GridTargetEngine {
    pub fn new(grid_size: usize, arrival_radius: f64, surface_extent: f64) -> Self {
        Self::with_rng(
            grid_size,
            arrival_radius,
            surface_extent,
            StdRng::from_entropy(),
        )
    }

    /// Deterministic construction for tests.
    pub fn with_seed(grid_size: usize, arrival_radius: f64, surface_extent: f64, seed: u64) -> Self {
        Self::with_rng(
            grid_size,
            arrival_radius,
            surface_extent,
            StdRng::seed_from_u64(seed),
        )
    }

    fn with_rng(grid_size: usize, arrival_radius: f64, surface_extent: f64, rng: StdRng) -> Self {
        assert!(grid_size >= 2, "grid needs at least two candidate targets");
        let center = grid_size * grid_size / 2;
        let mut engine = Self {
            grid_size,
            arrival_radius,
            extent: surface_extent,
            points: Vec::new(),
            target_idx: center,
            previous_idx: center,
            arrival_pending: false,
            tracked: Point::default(),
            rng,
        };
        engine.rebuild_points();
        engine.tracked = engine.points[center];
        engine
    }

    /// Recompute grid points from the current extent.
    fn rebuild_points(&mut self) {
        let offset = self.extent * BASE_OFFSET_RATIO;
        let spacing = (self.extent - 2.0 * offset) / (self.grid_size - 1) as f64;

        self.points.clear();
        for row in 0..self.grid_size {
            for col in 0..self.grid_size {
                self.points.push(Point::new(
                    col as f64 * spacing + offset,
                    row as f64 * spacing + offset,
                ));
            }
        }
    }

    /// Relocate the target to a uniformly chosen different cell.
    ///
    /// The index change is what releases the arrival latch.
    fn relocate_target(&mut self) {
        self.previous_idx = self.target_idx;
        self.target_idx = pick_different_index(&mut self.rng, self.points.len(), self.target_idx);
        self.arrival_pending = false;
    }

    pub fn target_index(&self) -> usize {
        self.target_idx
    }

    pub fn previous_index(&self) -> usize {
        self.previous_idx
    }

    pub fn target_point(&self) -> Point {
        self.points[self.target_idx]
    }

    /// Last tracked (clamped) position.
    pub fn tracked(&self) -> Point {
        self.tracked
    }

    pub fn grid_points(&self) -> &[Point] {
        &self.points
    }
}

impl GestureEngine for GridTargetEngine {
    fn on_arm(&mut self) {
        self.arrival_pending = false;
    }

    fn on_sample(&mut self, point: Point) -> u32 {
        // Never leaves the visible play area even if the pointer does
        self.tracked = point.clamped(self.extent);

        let distance = self.tracked.distance_to(self.points[self.target_idx]);
        if distance < self.arrival_radius && !self.arrival_pending {
            self.arrival_pending = true;
            self.relocate_target();
            return 1;
        }
        0
    }

    fn on_disarm(&mut self) {
        // Tracked position animates back to the center cell upstream
        let center = self.grid_size * self.grid_size / 2;
        self.tracked = self.points[center];
        self.arrival_pending = false;
    }

    fn resize(&mut self, surface_extent: f64) {
        self.extent = surface_extent;
        self.rebuild_points();
        self.tracked = self.tracked.clamped(surface_extent);
    }
}
