//! Capture session lifecycle
//!
//! The session controller is the single owner of capture state: it gates
//! whether motion is recorded, drives the active gesture engine and the
//! sampler, and guarantees exactly-once batch hand-off to the telemetry
//! sink.

pub mod controller;

pub use controller::{DisarmReason, Phase, SessionConfig, SessionController, TickOutcome};
