//! Gesture Engines
//!
//! Three generators share one capability interface: each maps accepted
//! pointer samples onto its own scoring geometry. The session controller
//! owns the accumulated score; engines report per-sample contributions.

pub mod rotary;
pub mod grid;
pub mod freehand;

pub use freehand::FreehandEngine;
pub use grid::GridTargetEngine;
pub use rotary::RotaryEngine;

use crate::geometry::Point;
use serde::{Deserialize, Serialize};

/// Common contract for the gesture variants
pub trait GestureEngine {
    /// Capture session armed; reset per-session geometry.
    fn on_arm(&mut self);

    /// One accepted sample at a surface-relative position.
    /// Returns the score contribution of this sample.
    fn on_sample(&mut self, point: Point) -> u32;

    /// Capture session ended (any termination signal).
    fn on_disarm(&mut self);

    /// Capture surface resized; recompute resolution-dependent geometry.
    fn resize(&mut self, _surface_extent: f64) {}
}

/// Engine variant selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    /// Ring handle; score counts full revolutions
    Rotary,
    /// Target acquisition on an N×N grid
    GridTarget,
    /// Signature-style path capture
    Freehand,
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::Rotary => write!(f, "rotary"),
            EngineKind::GridTarget => write!(f, "grid-target"),
            EngineKind::Freehand => write!(f, "freehand"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&EngineKind::GridTarget).unwrap(),
            "\"grid_target\""
        );
        let kind: EngineKind = serde_json::from_str("\"rotary\"").unwrap();
        assert_eq!(kind, EngineKind::Rotary);
    }

    #[test]
    fn test_engine_kind_display() {
        assert_eq!(EngineKind::Rotary.to_string(), "rotary");
        assert_eq!(EngineKind::GridTarget.to_string(), "grid-target");
        assert_eq!(EngineKind::Freehand.to_string(), "freehand");
    }
}
