//! Geometry Utilities
//!
//! Pure helpers shared by the gesture engines: ring-angle mapping,
//! wrap-transition detection, Euclidean distance, axis clamping, and
//! non-repeating random index selection.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A 2D point in capture-surface coordinates (pixels).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Clamp both axes into `[0, max]`.
    pub fn clamped(&self, max: f64) -> Point {
        Point {
            x: self.x.clamp(0.0, max),
            y: self.y.clamp(0.0, max),
        }
    }
}

/// Map a vector from a ring's center to an angle in degrees.
///
/// Normalized to `[0, 360)` with 0° at 12 o'clock, increasing clockwise:
/// `(atan2(dy, dx) * 180/π + 90 + 360) mod 360`.
pub fn ring_angle_deg(dx: f64, dy: f64) -> f64 {
    (dy.atan2(dx).to_degrees() + 90.0 + 360.0) % 360.0
}

/// Detect a full-revolution wrap between two consecutive angles.
///
/// Fires when the previous angle sat above `high_deg` and the current angle
/// dropped below `low_deg` in the same update. The window tolerates sampling
/// gaps near the 0°/360° seam while jitter inside `[low_deg, high_deg]` can
/// never trigger it.
pub fn is_wrap_transition(previous_deg: f64, current_deg: f64, high_deg: f64, low_deg: f64) -> bool {
    previous_deg > high_deg && current_deg < low_deg
}

/// Pick a uniform random index in `[0, len)` that differs from `exclude`.
///
/// Rejection sampling: redraw until the pick differs. Correct and simple for
/// the small grids this crate uses.
pub fn pick_different_index<R: Rng>(rng: &mut R, len: usize, exclude: usize) -> usize {
    debug_assert!(len >= 2, "need at least two candidates to exclude one");
    loop {
        let pick = rng.gen_range(0..len);
        if pick != exclude {
            return pick;
        }
    }
}
