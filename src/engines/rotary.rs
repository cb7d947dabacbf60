//! Rotary (angle-unlock) Engine
//!
//! Maps pointer positions to an angle on a fixed circular track and counts
//! full clockwise revolutions. The wrap window (previous angle above the
//! high threshold, current angle below the low one) tolerates sampling gaps
//! near the 0°/360° seam while jitter inside the dead band never counts.

use super::GestureEngine;
use crate::geometry::{is_wrap_transition, ring_angle_deg, Point};

/// Default wrap window, degrees
pub const DEFAULT_WRAP_HIGH_DEG: f64 = 300.0;
pub const DEFAULT_WRAP_LOW_DEG: f64 = 60.0;

/// Revolution-counting ring engine
#[derive(Debug)]
pub struct RotaryEngine {
    /// Track center in surface-relative pixels
    center: Point,
    wrap_high_deg: f64,
    wrap_low_deg: f64,
    current_angle_deg: f64,
    last_angle_deg: f64,
}

impl RotaryEngine {
    pub fn new(surface_extent: f64) -> Self {
        Self {
            center: Point::new(surface_extent / 2.0, surface_extent / 2.0),
            wrap_high_deg: DEFAULT_WRAP_HIGH_DEG,
            wrap_low_deg: DEFAULT_WRAP_LOW_DEG,
            current_angle_deg: 0.0,
            last_angle_deg: 0.0,
        }
    }

    /// Override the wrap window (both in degrees).
    pub fn with_wrap_window(mut self, high_deg: f64, low_deg: f64) -> Self {
        self.wrap_high_deg = high_deg;
        self.wrap_low_deg = low_deg;
        self
    }

    /// Current handle angle, `[0, 360)`, 0° at 12 o'clock.
    pub fn current_angle_deg(&self) -> f64 {
        self.current_angle_deg
    }
}

impl GestureEngine for RotaryEngine {
    fn on_arm(&mut self) {
        self.current_angle_deg = 0.0;
        self.last_angle_deg = 0.0;
    }

    fn on_sample(&mut self, point: Point) -> u32 {
        let cur = ring_angle_deg(point.x - self.center.x, point.y - self.center.y);

        let completed = is_wrap_transition(
            self.last_angle_deg,
            cur,
            self.wrap_high_deg,
            self.wrap_low_deg,
        );

        self.last_angle_deg = cur;
        self.current_angle_deg = cur;

        completed as u32
    }

    fn on_disarm(&mut self) {
        // Handle animates back to the 0° rest position upstream; the state
        // resets here so the next pass starts clean
        self.current_angle_deg = 0.0;
        self.last_angle_deg = 0.0;
    }

    fn resize(&mut self, surface_extent: f64) {
        self.center = Point::new(surface_extent / 2.0, surface_extent / 2.0);
    }
}
