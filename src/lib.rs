//! # Motion Sentry
//!
//! Captures a user's pointer/touch motion during short interactive
//! challenges, downsamples it into fixed-size batches, and ships each batch
//! to a remote classifier that scores how "human" the motion looks. The
//! score is used to flag scripted or macro-driven input.
//!
//! ## Overview
//!
//! A capture session is owned by a [`session::SessionController`]: arming it
//! starts recording, every accepted pointer sample feeds both the active
//! gesture engine (scoring/geometry) and the bounded sampler, and the first
//! time the buffer reaches capacity the batch is handed off exactly once to
//! a [`telemetry::TelemetrySink`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use motion_sentry::capture::SurfaceRect;
//! use motion_sentry::engines::FreehandEngine;
//! use motion_sentry::session::{SessionConfig, SessionController};
//! use motion_sentry::time::{MonoClock, Timestamp};
//!
//! MonoClock::init();
//! let mut session = SessionController::new(
//!     SessionConfig::default(),
//!     SurfaceRect::default(),
//!     Box::new(FreehandEngine::new()),
//! );
//!
//! // ... feed pointer events via session.handle_event(event, Timestamp::now()) ...
//! ```
//!
//! ## Architecture
//!
//! - [`time`]: monotonic timestamps for delta computation and timers
//! - [`geometry`]: angle/distance/clamp helpers and target selection
//! - [`capture`]: pointer event types and the tolerance-filtered sampler
//! - [`engines`]: rotary, grid-target, and freehand gesture engines
//! - [`session`]: the capture lifecycle state machine
//! - [`telemetry`]: the scoring-service boundary
//! - [`trace`]: recorded pointer traces for offline replay
//! - [`app`]: CLI, configuration, and the replay driver
//!
//! ## Data Flow
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌─────────────┐   ┌───────────────┐
//! │  Pointer  │──▶│  Session   │──▶│  Sampler /  │──▶│  Telemetry    │
//! │  events   │   │ Controller │   │   Buffer    │   │  Sink (HTTP)  │
//! └───────────┘   └─────┬──────┘   └─────────────┘   └───────────────┘
//!                       │
//!                       ▼
//!                 ┌────────────┐
//!                 │  Gesture   │
//!                 │  Engine    │
//!                 └────────────┘
//! ```

pub mod time;
pub mod geometry;
pub mod capture;
pub mod engines;
pub mod session;
pub mod telemetry;
pub mod trace;
pub mod app;

// Re-export commonly used types
pub use capture::sampler::MotionSampler;
pub use capture::types::{Batch, EventKind, MotionSample, PointerEvent, SurfaceRect};
pub use engines::{EngineKind, GestureEngine};
pub use session::{Phase, SessionController};
pub use telemetry::TelemetrySink;
pub use time::{MonoClock, Timestamp};

/// Result type alias for motion-sentry
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for motion-sentry
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Session error: {0}")]
    Session(String),

    #[error("Sampler error: {0}")]
    Sampler(String),

    #[error("Telemetry sink error: {0}")]
    Sink(String),

    #[error("Trace error: {0}")]
    Trace(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
