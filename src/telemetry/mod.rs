//! Batch submission to the remote anomaly scoring service.
//!
//! A flushed [`Batch`](crate::capture::Batch) is handed off exactly once;
//! there is no retry. A failed submission drops the batch and the session
//! returns to idle with its previous score intact.

mod sink;

pub use sink::{HttpSink, MemorySink, TelemetrySink};
