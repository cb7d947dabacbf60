//! Freehand Engine
//!
//! Signature-style capture: appends points into an ordered path with no
//! target geometry. Every segment beyond the first point contributes one
//! score unit. The path shares the session lifecycle with the sample
//! buffer: cleared together on disarm, never independently.

use super::GestureEngine;
use crate::geometry::Point;

/// Append-only path engine
#[derive(Debug, Default)]
pub struct FreehandEngine {
    path: Vec<Point>,
}

impl FreehandEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The ordered, session-scoped path recorded so far.
    pub fn path(&self) -> &[Point] {
        &self.path
    }
}

impl GestureEngine for FreehandEngine {
    fn on_arm(&mut self) {
        self.path.clear();
    }

    fn on_sample(&mut self, point: Point) -> u32 {
        self.path.push(point);
        // First point anchors the path; each later point closes a segment
        (self.path.len() > 1) as u32
    }

    fn on_disarm(&mut self) {
        self.path.clear();
    }
}
