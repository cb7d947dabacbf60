//! Core types for motion capture
//!
//! Defines the pointer-event stream consumed by the session controller and
//! the sample/batch shapes handed to the telemetry sink.

use crate::geometry::Point;
use crate::time::Timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event kinds consumed from the capture surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Pointer moved while over the surface
    PointerMove,
    /// Primary button pressed
    PrimaryDown,
    /// Primary button released
    PrimaryUp,
    /// Pointer left the capture surface
    PointerLeave,
    /// Secondary button / context menu (default action suppressed upstream)
    ContextMenu,
    /// Touch sequence started
    TouchStart,
    /// Touch point moved
    TouchMove,
    /// Touch sequence ended
    TouchEnd,
    /// Touch sequence cancelled by the platform
    TouchCancel,
    /// Capture surface was resized
    Resize,
}

impl EventKind {
    /// Check if this event carries a trackable position.
    pub fn is_motion(&self) -> bool {
        matches!(self, EventKind::PointerMove | EventKind::TouchMove)
    }

    /// Check if this event begins a capture session.
    pub fn is_start(&self) -> bool {
        matches!(self, EventKind::PrimaryDown | EventKind::TouchStart)
    }

    /// Check if this event terminates a capture session.
    pub fn is_termination(&self) -> bool {
        matches!(
            self,
            EventKind::PrimaryUp
                | EventKind::PointerLeave
                | EventKind::ContextMenu
                | EventKind::TouchEnd
                | EventKind::TouchCancel
        )
    }
}

/// Raw event from the capture surface
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Monotonic timestamp of delivery
    pub timestamp: Timestamp,
    /// Event kind
    pub kind: EventKind,
    /// Position in surface-client coordinates. `None` models malformed
    /// input, e.g. a touch event delivered without a touch point.
    pub position: Option<Point>,
}

impl PointerEvent {
    /// Create a motion event at a position.
    pub fn motion(timestamp: Timestamp, x: f64, y: f64) -> Self {
        Self {
            timestamp,
            kind: EventKind::PointerMove,
            position: Some(Point::new(x, y)),
        }
    }

    /// Create a positionless event of the given kind.
    pub fn of_kind(timestamp: Timestamp, kind: EventKind) -> Self {
        Self {
            timestamp,
            kind,
            position: None,
        }
    }

    /// Create an event of a kind at a position.
    pub fn at(timestamp: Timestamp, kind: EventKind, x: f64, y: f64) -> Self {
        Self {
            timestamp,
            kind,
            position: Some(Point::new(x, y)),
        }
    }
}

/// Bounding box of the capture surface, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Integer pixel offset of a client-coordinate point relative to the
    /// surface origin.
    pub fn relative(&self, p: Point) -> (i32, i32) {
        (
            (p.x - self.left).round() as i32,
            (p.y - self.top).round() as i32,
        )
    }
}

impl Default for SurfaceRect {
    fn default() -> Self {
        Self::new(0.0, 0.0, 400.0, 400.0)
    }
}

/// One downsampled motion sample
///
/// Immutable once created; owned by the sampler until the batch hand-off.
/// Field names match the wire contract of the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionSample {
    /// Wall-clock capture time (ISO-8601 on the wire)
    pub timestamp: DateTime<Utc>,
    /// Pixel offset from the surface origin
    pub x: i32,
    pub y: i32,
    /// Seconds since the previous accepted sample
    #[serde(rename = "deltatime")]
    pub delta_time: f64,
}

/// An immutable, capacity-sized ordered sequence of motion samples.
///
/// Created only by the sampler when the buffer reaches capacity; serialized
/// as a bare JSON array per the sink contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Batch(Vec<MotionSample>);

impl Batch {
    pub(crate) fn from_samples(samples: Vec<MotionSample>) -> Self {
        Self(samples)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn samples(&self) -> &[MotionSample] {
        &self.0
    }
}
