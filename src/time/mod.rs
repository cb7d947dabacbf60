//! Monotonic timing
//!
//! Timestamps drive sample delta computation, the idle timer, and the
//! post-send cooldown. Everything here is monotonic; wall-clock time is only
//! used for the ISO-8601 field on serialized samples.

pub mod clock;

pub use clock::{Duration, MonoClock, Timestamp};
