//! Session Controller
//!
//! The state machine owning capture lifecycle: `Idle → Armed → {Idle
//! (aborted), Sending → Idle (completed)}`. All shared mutable state
//! (buffer, phase, score) lives here and is touched only from the single
//! event-processing context; handlers read through accessors instead of
//! mirrored copies.
//!
//! Termination signals (primary release, pointer leave, context menu, mode
//! switch, idle timeout) may race; the first one processed wins and
//! `disarm_and_clear` is idempotent, so duplicates are no-ops once idle.

use crate::capture::sampler::MotionSampler;
use crate::capture::types::{Batch, EventKind, PointerEvent, SurfaceRect};
use crate::engines::GestureEngine;
use crate::geometry::Point;
use crate::time::{Duration, Timestamp};
use tracing::{debug, error, info, warn};

/// Capture phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not capturing; `arm()` is allowed once any cooldown has elapsed
    Idle,
    /// Recording motion
    Armed,
    /// A batch is in flight; all new events are rejected, not queued
    Sending,
}

/// Why a session was disarmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisarmReason {
    PrimaryRelease,
    PointerLeave,
    ContextMenu,
    TouchEnd,
    TouchCancel,
    ModeSwitch,
    IdleTimeout,
}

/// Result of a timer tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing fired
    Noop,
    /// The idle timer expired and the session was disarmed
    IdleDisarmed,
}

/// Tunable session constants
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    /// Batch size; a flush fires when the buffer first reaches this length
    pub capacity: usize,
    /// Minimum elapsed time between two accepted samples
    pub tolerance: Duration,
    /// Disarm after this long with no accepted sample
    pub idle_timeout: Duration,
    /// Re-arming is blocked for this long after a sink response
    pub cooldown: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: 350,
            tolerance: Duration::from_millis(1),
            idle_timeout: Duration::from_millis(2000),
            cooldown: Duration::from_millis(800),
        }
    }
}

/// The capture-session state machine
pub struct SessionController {
    phase: Phase,
    score: u32,
    sampler: MotionSampler,
    engine: Box<dyn GestureEngine>,
    surface: SurfaceRect,
    config: SessionConfig,
    /// Re-entrancy guard for the flush routine, deliberately distinct from
    /// `phase`: a same-tick duplicate capacity signal must not flush twice
    flush_in_flight: bool,
    /// Last-write-wins idle deadline; restarted on every accepted sample
    idle_deadline: Option<Timestamp>,
    /// `arm()` is rejected until this deadline passes
    cooldown_until: Option<Timestamp>,
    /// Most recent anomaly score from the sink
    last_result: Option<f64>,
}

impl SessionController {
    pub fn new(
        config: SessionConfig,
        surface: SurfaceRect,
        engine: Box<dyn GestureEngine>,
    ) -> Self {
        Self {
            phase: Phase::Idle,
            score: 0,
            sampler: MotionSampler::new(config.capacity, config.tolerance),
            engine,
            surface,
            config,
            flush_in_flight: false,
            idle_deadline: None,
            cooldown_until: None,
            last_result: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Accumulated game score for the current session.
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn buffer_len(&self) -> usize {
        self.sampler.len()
    }

    /// Most recent anomaly score returned by the sink, if any.
    pub fn last_result(&self) -> Option<f64> {
        self.last_result
    }

    pub fn surface(&self) -> SurfaceRect {
        self.surface
    }

    /// Pending idle deadline while armed.
    pub fn idle_deadline(&self) -> Option<Timestamp> {
        self.idle_deadline
    }

    /// Whether `arm()` would currently succeed.
    pub fn can_arm(&self, now: Timestamp) -> bool {
        self.phase == Phase::Idle
            && !self.flush_in_flight
            && self.cooldown_until.map_or(true, |until| now >= until)
    }

    /// Begin a capture session.
    ///
    /// Allowed only from `Idle`, never while a send is in flight, and not
    /// before the post-send cooldown has elapsed. Clears any stale buffer,
    /// resets the score, and records `now` as the delta reference.
    pub fn arm(&mut self, now: Timestamp) -> bool {
        if !self.can_arm(now) {
            debug!(phase = ?self.phase, "arm rejected");
            return false;
        }

        self.sampler.reset(now);
        self.score = 0;
        self.engine.on_arm();
        self.idle_deadline = Some(now + self.config.idle_timeout);
        self.phase = Phase::Armed;
        info!("session armed");
        true
    }

    /// End the session and discard its buffer and score.
    ///
    /// Idempotent; no-op while `Sending` (there is no cancellation path once
    /// a hand-off has started).
    pub fn disarm_and_clear(&mut self, reason: DisarmReason, _now: Timestamp) {
        if self.phase == Phase::Sending {
            return;
        }
        let was_armed = self.phase == Phase::Armed;

        self.sampler.reset(Timestamp::default());
        self.score = 0;
        self.idle_deadline = None;
        self.engine.on_disarm();
        self.phase = Phase::Idle;

        if was_armed {
            info!(?reason, "session disarmed, buffer discarded");
        }
    }

    /// Process one capture-surface event.
    ///
    /// Returns a batch exactly when this event completed the buffer; the
    /// caller must hand it to the telemetry sink and then call
    /// [`complete_send`](Self::complete_send).
    pub fn handle_event(&mut self, event: PointerEvent, now: Timestamp) -> Option<Batch> {
        match event.kind {
            kind if kind.is_start() => {
                self.arm(now);
                None
            }
            kind if kind.is_motion() => self.handle_motion(event, now),
            EventKind::PrimaryUp => {
                self.disarm_and_clear(DisarmReason::PrimaryRelease, now);
                None
            }
            EventKind::PointerLeave => {
                self.disarm_and_clear(DisarmReason::PointerLeave, now);
                None
            }
            EventKind::ContextMenu => {
                self.disarm_and_clear(DisarmReason::ContextMenu, now);
                None
            }
            EventKind::TouchEnd => {
                self.disarm_and_clear(DisarmReason::TouchEnd, now);
                None
            }
            EventKind::TouchCancel => {
                self.disarm_and_clear(DisarmReason::TouchCancel, now);
                None
            }
            EventKind::Resize => {
                if let Some(size) = event.position {
                    self.surface.width = size.x;
                    self.surface.height = size.y;
                    self.engine.resize(size.x);
                }
                None
            }
            _ => None,
        }
    }

    fn handle_motion(&mut self, event: PointerEvent, now: Timestamp) -> Option<Batch> {
        if self.phase != Phase::Armed {
            // Not queued: a batch already in flight must never grow
            return None;
        }

        // The engine sees every well-formed motion event in surface-relative
        // coordinates; the tolerance filter only gates recording
        if let Some(p) = event.position {
            let rel = Point::new(p.x - self.surface.left, p.y - self.surface.top);
            self.score += self.engine.on_sample(rel);
        }

        let outcome = self.sampler.accept(event.position, &self.surface, now);
        if let crate::capture::sampler::SampleOutcome::Accepted { at_capacity } = outcome {
            // Restart, not accumulate: last accepted sample owns the deadline
            self.idle_deadline = Some(now + self.config.idle_timeout);
            if at_capacity {
                return self.flush(now);
            }
        }
        None
    }

    /// Check timers. Call on a coarse cadence (or with synthetic time in
    /// tests); an expired idle deadline disarms and clears.
    pub fn tick(&mut self, now: Timestamp) -> TickOutcome {
        if self.phase == Phase::Armed {
            if let Some(deadline) = self.idle_deadline {
                if now >= deadline {
                    self.disarm_and_clear(DisarmReason::IdleTimeout, now);
                    return TickOutcome::IdleDisarmed;
                }
            }
        }
        TickOutcome::Noop
    }

    /// Snapshot the full buffer as a batch and enter `Sending`.
    ///
    /// The buffer is cleared synchronously with the hand-off so new samples
    /// can never be appended to an already-sent batch.
    fn flush(&mut self, _now: Timestamp) -> Option<Batch> {
        if self.flush_in_flight {
            // Structurally impossible per the Armed-phase gate; a second
            // capacity signal while in flight is a programming error
            error!("re-entrant flush attempt suppressed");
            debug_assert!(false, "re-entrant flush");
            return None;
        }

        self.flush_in_flight = true;
        self.phase = Phase::Sending;
        self.idle_deadline = None;
        self.score = 0;
        self.engine.on_disarm();

        let batch = self.sampler.take_batch();
        info!(samples = batch.len(), "buffer full, batch handed off");
        Some(batch)
    }

    /// Record the sink's response (success or failure) and schedule the
    /// cooldown before the next `arm()` is allowed.
    pub fn complete_send(&mut self, outcome: crate::Result<f64>, now: Timestamp) {
        match outcome {
            Ok(result) => {
                self.last_result = Some(result);
                info!(score = result, "anomaly score recorded");
            }
            Err(e) => {
                // At-most-once delivery: the batch is gone, log and move on
                warn!(error = %e, "telemetry send failed, batch dropped");
            }
        }

        self.flush_in_flight = false;
        self.phase = Phase::Idle;
        self.cooldown_until = Some(now + self.config.cooldown);
    }

    /// Replace the gesture engine (mode switch). Always disarms first.
    pub fn switch_engine(&mut self, engine: Box<dyn GestureEngine>, now: Timestamp) {
        self.disarm_and_clear(DisarmReason::ModeSwitch, now);
        self.engine = engine;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::{FreehandEngine, GridTargetEngine};
    use crate::Error;

    fn ms(v: u64) -> Timestamp {
        Timestamp::from_millis(v)
    }

    fn config(capacity: usize) -> SessionConfig {
        SessionConfig {
            capacity,
            ..SessionConfig::default()
        }
    }

    fn controller(capacity: usize) -> SessionController {
        SessionController::new(
            config(capacity),
            SurfaceRect::default(),
            Box::new(FreehandEngine::new()),
        )
    }

    fn feed_motion(c: &mut SessionController, n: usize, start_ms: u64, step_ms: u64) -> Option<Batch> {
        for i in 0..n {
            let t = ms(start_ms + i as u64 * step_ms);
            let ev = PointerEvent::motion(t, i as f64, i as f64);
            if let Some(batch) = c.handle_event(ev, t) {
                return Some(batch);
            }
        }
        None
    }

    #[test]
    fn test_arm_only_from_idle() {
        let mut c = controller(10);
        assert!(c.arm(ms(0)));
        assert_eq!(c.phase(), Phase::Armed);
        assert!(!c.arm(ms(1)), "already armed");
    }

    #[test]
    fn test_motion_rejected_while_idle() {
        let mut c = controller(10);
        let ev = PointerEvent::motion(ms(5), 1.0, 1.0);
        assert!(c.handle_event(ev, ms(5)).is_none());
        assert_eq!(c.buffer_len(), 0);
    }

    #[test]
    fn test_disarm_is_idempotent_first_signal_wins() {
        let mut c = controller(10);
        c.arm(ms(0));
        feed_motion(&mut c, 3, 10, 10);
        assert_eq!(c.buffer_len(), 3);

        // Racing termination signals: up, leave, context menu
        c.handle_event(PointerEvent::of_kind(ms(50), EventKind::PrimaryUp), ms(50));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.buffer_len(), 0);

        c.handle_event(PointerEvent::of_kind(ms(51), EventKind::PointerLeave), ms(51));
        c.handle_event(PointerEvent::of_kind(ms(52), EventKind::ContextMenu), ms(52));
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_capacity_flush_fires_exactly_once() {
        let mut c = controller(5);
        c.arm(ms(0));
        let batch = feed_motion(&mut c, 5, 10, 10).expect("flush at capacity");
        assert_eq!(batch.len(), 5);
        assert_eq!(c.phase(), Phase::Sending);
        assert_eq!(c.buffer_len(), 0, "buffer cleared synchronously");

        // Further motion is rejected, not queued
        let ev = PointerEvent::motion(ms(100), 9.0, 9.0);
        assert!(c.handle_event(ev, ms(100)).is_none());
        assert_eq!(c.buffer_len(), 0);
    }

    #[test]
    fn test_no_second_batch_while_sending() {
        let mut c = controller(3);
        c.arm(ms(0));
        let first = feed_motion(&mut c, 3, 10, 10);
        assert!(first.is_some());

        // Re-arm is blocked while the send is in flight
        assert!(!c.arm(ms(100)));
        assert!(feed_motion(&mut c, 3, 200, 10).is_none());
    }

    #[test]
    fn test_cooldown_blocks_rearm_until_elapsed() {
        let mut c = controller(2);
        c.arm(ms(0));
        feed_motion(&mut c, 2, 10, 10).expect("flush");

        c.complete_send(Ok(0.42), ms(100));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.last_result(), Some(0.42));

        assert!(!c.arm(ms(200)), "still cooling down");
        assert!(c.arm(ms(900)), "cooldown elapsed (800ms)");
    }

    #[test]
    fn test_send_failure_still_reaches_idle() {
        let mut c = controller(2);
        c.arm(ms(0));
        feed_motion(&mut c, 2, 10, 10).expect("flush");

        c.complete_send(Err(Error::Sink("connection refused".into())), ms(100));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.last_result(), None, "score display unchanged for this batch");
        assert!(c.arm(ms(1000)), "UI never stuck after failure");
    }

    #[test]
    fn test_idle_timeout_disarms_and_clears() {
        let mut c = controller(50);
        c.arm(ms(0));
        feed_motion(&mut c, 3, 10, 10);
        assert_eq!(c.buffer_len(), 3);

        // No events until past the 2000ms timeout
        assert_eq!(c.tick(ms(1000)), TickOutcome::Noop);
        assert_eq!(c.tick(ms(2100)), TickOutcome::IdleDisarmed);
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.buffer_len(), 0);
        assert_eq!(c.score(), 0);
    }

    #[test]
    fn test_idle_timer_restarts_on_accepted_sample() {
        let mut c = controller(50);
        c.arm(ms(0));
        // Sample at 1900ms pushes the deadline to 3900ms
        feed_motion(&mut c, 1, 1900, 0);
        assert_eq!(c.tick(ms(2100)), TickOutcome::Noop);
        assert_eq!(c.tick(ms(3900)), TickOutcome::IdleDisarmed);
    }

    #[test]
    fn test_arm_resets_stale_state() {
        let mut c = controller(50);
        c.arm(ms(0));
        feed_motion(&mut c, 3, 10, 10);
        c.disarm_and_clear(DisarmReason::PrimaryRelease, ms(50));

        assert!(c.arm(ms(100)));
        assert_eq!(c.buffer_len(), 0);
        assert_eq!(c.score(), 0);
    }

    #[test]
    fn test_score_accumulates_from_engine() {
        let mut c = controller(50);
        c.arm(ms(0));
        // Freehand: +1 per segment beyond the first point
        feed_motion(&mut c, 4, 10, 10);
        assert_eq!(c.score(), 3);
    }

    #[test]
    fn test_grid_engine_scores_through_controller() {
        let engine = GridTargetEngine::with_seed(3, 20.0, 400.0, 7);
        let target = engine.target_point();
        let mut c = SessionController::new(
            config(50),
            SurfaceRect::new(0.0, 0.0, 400.0, 400.0),
            Box::new(engine),
        );
        c.arm(ms(0));
        let ev = PointerEvent::motion(ms(10), target.x, target.y);
        c.handle_event(ev, ms(10));
        assert_eq!(c.score(), 1);
    }

    #[test]
    fn test_malformed_event_skipped_session_continues() {
        let mut c = controller(10);
        c.arm(ms(0));
        // Touch event with no touch point
        let ev = PointerEvent::of_kind(ms(10), EventKind::TouchMove);
        c.handle_event(ev, ms(10));
        assert_eq!(c.buffer_len(), 0);
        assert_eq!(c.phase(), Phase::Armed);

        feed_motion(&mut c, 1, 20, 0);
        assert_eq!(c.buffer_len(), 1);
    }

    #[test]
    fn test_mode_switch_disarms() {
        let mut c = controller(10);
        c.arm(ms(0));
        feed_motion(&mut c, 2, 10, 10);

        c.switch_engine(Box::new(FreehandEngine::new()), ms(50));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.buffer_len(), 0);
    }

    #[test]
    fn test_resize_updates_surface() {
        let mut c = controller(10);
        let ev = PointerEvent::at(ms(0), EventKind::Resize, 720.0, 720.0);
        c.handle_event(ev, ms(0));
        assert_eq!(c.surface().width, 720.0);
    }

    #[test]
    fn test_touch_lifecycle() {
        let mut c = controller(10);
        c.handle_event(PointerEvent::of_kind(ms(0), EventKind::TouchStart), ms(0));
        assert_eq!(c.phase(), Phase::Armed);

        let ev = PointerEvent::at(ms(10), EventKind::TouchMove, 5.0, 5.0);
        c.handle_event(ev, ms(10));
        assert_eq!(c.buffer_len(), 1);

        c.handle_event(PointerEvent::of_kind(ms(20), EventKind::TouchCancel), ms(20));
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.buffer_len(), 0);
    }
}
