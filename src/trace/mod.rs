//! Pointer trace persistence
//!
//! A trace is a recorded stream of pointer events plus the surface geometry
//! it was captured on, serialized as JSON. The `replay` command loads a
//! trace and drives it through the session pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::capture::{PointerEvent, SurfaceRect};

/// Current trace format version
pub const CURRENT_FORMAT_VERSION: &str = "1.0";

/// Trace metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceMetadata {
    /// Unique trace ID
    pub id: Uuid,
    /// Trace name
    pub name: String,
    /// Capture start time
    pub started_at: DateTime<Utc>,
    /// Capture end time
    pub ended_at: Option<DateTime<Utc>>,
    /// Total event count
    pub event_count: usize,
    /// Version of the trace format
    pub format_version: String,
}

impl TraceMetadata {
    pub fn new(name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            started_at: Utc::now(),
            ended_at: None,
            event_count: 0,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }

    /// Finalize the metadata with end time and event count.
    pub fn finalize(&mut self, event_count: usize) {
        self.ended_at = Some(Utc::now());
        self.event_count = event_count;
    }
}

impl Default for TraceMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            started_at: Utc::now(),
            ended_at: None,
            event_count: 0,
            format_version: CURRENT_FORMAT_VERSION.to_string(),
        }
    }
}

/// A complete recorded pointer trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Trace metadata
    pub metadata: TraceMetadata,
    /// Geometry of the surface the trace was captured on
    #[serde(default)]
    pub surface: SurfaceRect,
    /// Recorded events, in delivery order
    pub events: Vec<PointerEvent>,
}

impl Trace {
    /// Create a new empty trace.
    pub fn new(name: String, surface: SurfaceRect) -> Self {
        Self {
            metadata: TraceMetadata::new(name),
            surface,
            events: Vec::new(),
        }
    }

    /// Append an event to the trace.
    pub fn add_event(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    /// Finalize the trace metadata.
    pub fn finalize(&mut self) {
        self.metadata.finalize(self.events.len());
    }

    /// Save the trace to a file.
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a trace from a file.
    ///
    /// Logs a warning if the trace was saved with an unknown format version,
    /// but still attempts to deserialize it (forward-compatible via
    /// `#[serde(default)]`).
    pub fn load(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let trace: Trace = serde_json::from_str(&content)?;
        if trace.metadata.format_version != CURRENT_FORMAT_VERSION {
            tracing::warn!(
                name = %trace.metadata.name,
                found = %trace.metadata.format_version,
                expected = CURRENT_FORMAT_VERSION,
                "Trace has different format version; some fields may use default values"
            );
        }
        Ok(trace)
    }

    /// Get the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the trace is empty.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Duration between the first and last event.
    pub fn span(&self) -> crate::time::Duration {
        match (self.events.first(), self.events.last()) {
            (Some(first), Some(last)) => last.timestamp.duration_since(first.timestamp),
            _ => crate::time::Duration::ZERO,
        }
    }
}
