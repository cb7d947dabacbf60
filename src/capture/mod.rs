//! Motion capture
//!
//! Pointer/touch event types and the tolerance-filtered, capacity-bounded
//! sampler that turns a raw event stream into batches of motion samples.

pub mod types;
pub mod sampler;

pub use types::{Batch, EventKind, MotionSample, PointerEvent, SurfaceRect};
pub use sampler::{MotionSampler, SampleOutcome};
