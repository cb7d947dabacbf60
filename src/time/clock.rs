//! Monotonic Clock Bridge
//!
//! Provides microsecond-precision timing against a process-local monotonic
//! origin. Raw microsecond counts are stored in plain `u64` wrappers so
//! timer math in the session controller never touches wall-clock time and
//! can be driven with synthetic values in tests.

use std::sync::OnceLock;
use std::time::Instant;

/// Global monotonic origin, initialized once at startup
static ORIGIN: OnceLock<Instant> = OnceLock::new();

/// Process-local monotonic clock
///
/// This struct provides:
/// - Microsecond precision timestamps
/// - Monotonic guarantees (time never goes backward)
/// - Cheap capture in hot paths (a single `Instant` subtraction)
#[derive(Debug, Clone, Copy)]
pub struct MonoClock;

impl MonoClock {
    /// Initialize the clock origin. Call once at startup.
    pub fn init() {
        ORIGIN.get_or_init(Instant::now);
    }

    /// Get current time in microseconds since the origin.
    #[inline]
    pub fn now_micros() -> u64 {
        let origin = ORIGIN.get_or_init(Instant::now);
        origin.elapsed().as_micros() as u64
    }

    /// Calculate elapsed time between two microsecond values.
    /// Returns 0 if end < start.
    #[inline]
    pub fn elapsed_micros(start: u64, end: u64) -> u64 {
        end.saturating_sub(start)
    }

    /// Check if two microsecond values maintain monotonicity.
    /// Returns true if t2 >= t1.
    #[inline]
    pub fn is_monotonic(t1: u64, t2: u64) -> bool {
        t2 >= t1
    }
}

/// A monotonic timestamp storing microseconds since the clock origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw microseconds.
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create a timestamp from milliseconds.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    /// Capture current timestamp.
    #[inline]
    pub fn now() -> Self {
        Self(MonoClock::now_micros())
    }

    /// Get the raw microsecond value.
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Convert to milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Calculate duration since another timestamp (saturating at zero).
    #[inline]
    pub fn duration_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_micros(self.0.saturating_sub(earlier.0))
    }

    /// Check if this timestamp is after another.
    #[inline]
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.0 > other.0
    }
}

impl std::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Self::Output {
        Timestamp(self.0.saturating_add(rhs.as_micros()))
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u64(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let micros = u64::deserialize(deserializer)?;
        Ok(Timestamp(micros))
    }
}

/// A duration in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(u64);

impl Duration {
    /// Create a duration from microseconds.
    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros)
    }

    /// Create a duration from milliseconds.
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis * 1_000)
    }

    /// Get raw microsecond count.
    #[inline]
    pub const fn as_micros(&self) -> u64 {
        self.0
    }

    /// Convert to milliseconds.
    #[inline]
    pub const fn as_millis(&self) -> u64 {
        self.0 / 1_000
    }

    /// Convert to seconds as f64.
    #[inline]
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Zero duration.
    pub const ZERO: Duration = Duration(0);
}

impl std::ops::Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl std::ops::Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        Duration(self.0.saturating_sub(rhs.0))
    }
}
