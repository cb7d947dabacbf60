//! Bounded Motion Sampler
//!
//! Converts the raw pointer-event stream into a capacity-bounded,
//! time-downsampled ordered sequence of motion samples. Events arriving
//! faster than the sampling tolerance are dropped, which both deduplicates
//! high-rate pointer events and bounds `deltatime` precision.
//!
//! The capacity check runs twice: before the append (defensive, the
//! controller should have disarmed already) and immediately after it, inside
//! the same synchronous step, so the capacity-reached signal fires exactly
//! once.

use crate::capture::types::{Batch, MotionSample, SurfaceRect};
use crate::geometry::Point;
use crate::time::{Duration, Timestamp};
use chrono::Utc;

/// Outcome of offering one raw event to the sampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Sample appended; `at_capacity` is true on the transition that filled
    /// the buffer
    Accepted { at_capacity: bool },
    /// Event arrived within the tolerance window of the previous sample
    BelowTolerance,
    /// Buffer already full
    AtCapacity,
    /// Event carried no usable position
    Malformed,
}

impl SampleOutcome {
    /// True for the single outcome that should trigger a flush.
    pub fn reached_capacity(&self) -> bool {
        matches!(self, SampleOutcome::Accepted { at_capacity: true })
    }
}

/// Tolerance-filtered, capacity-bounded sample buffer
#[derive(Debug)]
pub struct MotionSampler {
    samples: Vec<MotionSample>,
    capacity: usize,
    tolerance: Duration,
    /// Reference time for the next delta; the arm time until the first
    /// sample is accepted
    last_accepted: Timestamp,
}

impl MotionSampler {
    pub fn new(capacity: usize, tolerance: Duration) -> Self {
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            tolerance,
            last_accepted: Timestamp::default(),
        }
    }

    /// Clear the buffer and set the delta reference to the arm time.
    pub fn reset(&mut self, arm_time: Timestamp) {
        self.samples.clear();
        self.last_accepted = arm_time;
    }

    /// Offer a raw event position to the buffer.
    ///
    /// The caller gates on session phase; the sampler only enforces
    /// tolerance, capacity, and well-formedness.
    pub fn accept(
        &mut self,
        position: Option<Point>,
        surface: &SurfaceRect,
        now: Timestamp,
    ) -> SampleOutcome {
        let Some(position) = position else {
            return SampleOutcome::Malformed;
        };

        if self.samples.len() >= self.capacity {
            return SampleOutcome::AtCapacity;
        }

        let delta = now.duration_since(self.last_accepted);
        if delta < self.tolerance {
            return SampleOutcome::BelowTolerance;
        }

        let (x, y) = surface.relative(position);
        self.samples.push(MotionSample {
            timestamp: Utc::now(),
            x,
            y,
            delta_time: round_delta(delta.as_secs_f64()),
        });
        self.last_accepted = now;

        SampleOutcome::Accepted {
            at_capacity: self.samples.len() == self.capacity,
        }
    }

    /// Snapshot the buffer into a batch and clear it synchronously.
    ///
    /// The returned batch owns its samples; nothing can be appended to it
    /// afterwards.
    pub fn take_batch(&mut self) -> Batch {
        Batch::from_samples(std::mem::take(&mut self.samples))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn at_capacity(&self) -> bool {
        self.samples.len() >= self.capacity
    }
}

/// Round a delta to 4 decimal places, matching the wire precision.
fn round_delta(secs: f64) -> f64 {
    (secs * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn sampler(capacity: usize) -> MotionSampler {
        let mut s = MotionSampler::new(capacity, Duration::from_millis(1));
        s.reset(ms(0));
        s
    }

    #[test]
    fn test_accept_and_delta() {
        let mut s = sampler(10);
        let surface = SurfaceRect::default();

        let outcome = s.accept(Some(Point::new(10.0, 20.0)), &surface, ms(5));
        assert_eq!(outcome, SampleOutcome::Accepted { at_capacity: false });
        assert_eq!(s.len(), 1);

        let batch = s.take_batch();
        let sample = &batch.samples()[0];
        assert_eq!((sample.x, sample.y), (10, 20));
        // 5 ms since arm time
        assert!((sample.delta_time - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_tolerance_filter_drops_fast_events() {
        let mut s = MotionSampler::new(10, Duration::from_millis(1));
        s.reset(Timestamp::from_micros(0));
        let surface = SurfaceRect::default();

        // Two events 500us apart: only the first is accepted
        assert!(matches!(
            s.accept(Some(Point::new(1.0, 1.0)), &surface, Timestamp::from_micros(1_000)),
            SampleOutcome::Accepted { .. }
        ));
        assert_eq!(
            s.accept(Some(Point::new(2.0, 2.0)), &surface, Timestamp::from_micros(1_500)),
            SampleOutcome::BelowTolerance
        );
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_capacity_transition_fires_once() {
        let mut s = sampler(3);
        let surface = SurfaceRect::default();

        assert_eq!(
            s.accept(Some(Point::new(0.0, 0.0)), &surface, ms(10)),
            SampleOutcome::Accepted { at_capacity: false }
        );
        assert_eq!(
            s.accept(Some(Point::new(0.0, 0.0)), &surface, ms(20)),
            SampleOutcome::Accepted { at_capacity: false }
        );
        let third = s.accept(Some(Point::new(0.0, 0.0)), &surface, ms(30));
        assert!(third.reached_capacity());

        // Nothing past capacity, ever
        assert_eq!(
            s.accept(Some(Point::new(0.0, 0.0)), &surface, ms(40)),
            SampleOutcome::AtCapacity
        );
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_malformed_position_is_skipped() {
        let mut s = sampler(10);
        let surface = SurfaceRect::default();

        assert_eq!(s.accept(None, &surface, ms(10)), SampleOutcome::Malformed);
        assert!(s.is_empty());

        // Session continues: next well-formed event is accepted
        assert!(matches!(
            s.accept(Some(Point::new(1.0, 1.0)), &surface, ms(20)),
            SampleOutcome::Accepted { .. }
        ));
    }

    #[test]
    fn test_take_batch_clears_buffer() {
        let mut s = sampler(2);
        let surface = SurfaceRect::default();
        s.accept(Some(Point::new(1.0, 1.0)), &surface, ms(10));
        s.accept(Some(Point::new(2.0, 2.0)), &surface, ms(20));

        let batch = s.take_batch();
        assert_eq!(batch.len(), 2);
        assert!(s.is_empty());

        // New samples go into a fresh buffer, not the handed-off batch
        s.reset(ms(30));
        s.accept(Some(Point::new(3.0, 3.0)), &surface, ms(40));
        assert_eq!(batch.len(), 2);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn test_order_preserved() {
        let mut s = sampler(5);
        let surface = SurfaceRect::default();
        for i in 0..5u64 {
            s.accept(
                Some(Point::new(i as f64, 0.0)),
                &surface,
                ms(10 + i * 10),
            );
        }
        let batch = s.take_batch();
        let xs: Vec<i32> = batch.samples().iter().map(|m| m.x).collect();
        assert_eq!(xs, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_relative_offset_uses_surface_origin() {
        let mut s = sampler(1);
        let surface = SurfaceRect::new(100.0, 200.0, 400.0, 400.0);
        s.accept(Some(Point::new(150.0, 260.0)), &surface, ms(10));
        let batch = s.take_batch();
        assert_eq!((batch.samples()[0].x, batch.samples()[0].y), (50, 60));
    }

    #[test]
    fn test_delta_rounding() {
        assert_eq!(round_delta(0.12344999), 0.1234);
        assert_eq!(round_delta(0.12345001), 0.1235);
        assert_eq!(round_delta(0.0), 0.0);
    }

    #[test]
    fn test_reset_restores_reference_time() {
        let mut s = sampler(10);
        let surface = SurfaceRect::default();
        s.accept(Some(Point::new(1.0, 1.0)), &surface, ms(100));
        s.reset(ms(1_000));
        assert!(s.is_empty());

        s.accept(Some(Point::new(1.0, 1.0)), &surface, ms(1_050));
        let batch = s.take_batch();
        // Delta measured from the new arm time, not the stale sample
        assert!((batch.samples()[0].delta_time - 0.05).abs() < 1e-9);
    }
}
