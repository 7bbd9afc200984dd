//! Time management for the game loop.
//!
//! [`Time`] measures real frame time; [`FixedStepIntegrator`] turns those
//! variable frame deltas into a whole number of constant physics ticks plus
//! an interpolation factor for rendering between the last two physics states.

use std::time::{Duration, Instant};

use crate::error::{ensure_within, ConfigError};

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time when the engine started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame.
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.elapsed = now - self.start_time;
        self.frame_count += 1;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get the delta time as a Duration.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get total elapsed time as Duration.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the current FPS (averaged over last frame).
    pub fn fps(&self) -> f32 {
        if self.delta.as_secs_f32() > 0.0 {
            1.0 / self.delta.as_secs_f32()
        } else {
            0.0
        }
    }
}

/// Largest f32 strictly below one.
const MIN_RATE_HZ: f32 = 1.0;
const MAX_RATE_HZ: f32 = 10_000.0;

const BELOW_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Fixed-timestep accumulator decoupling physics ticks from frame time.
///
/// Time is accumulated as whole nanoseconds, so frame deltas that sum to an
/// exact multiple of the tick produce exactly that many ticks and leave a
/// zero remainder.
#[derive(Debug, Clone)]
pub struct FixedStepIntegrator {
    tick: Duration,
    accumulator: Duration,
    interpolation_factor: f32,
    total_steps: u64,
}

impl FixedStepIntegrator {
    /// Integrator stepping at `hz` ticks per second.
    ///
    /// # Panics
    /// If `hz` is not strictly positive.
    pub fn with_rate(hz: f64) -> Self {
        if let Err(e) = Self::validate_rate(hz) {
            panic!("invalid physics rate: {e}");
        }
        Self::with_tick(Duration::from_secs_f64(1.0 / hz))
    }

    /// Integrator with an explicit tick duration.
    ///
    /// # Panics
    /// If `tick` is zero.
    pub fn with_tick(tick: Duration) -> Self {
        assert!(!tick.is_zero(), "physics tick must be longer than zero");
        Self {
            tick,
            accumulator: Duration::ZERO,
            interpolation_factor: 0.0,
            total_steps: 0,
        }
    }

    /// Rates outside [1, 10 000] Hz (or non-finite) are rejected; the tick
    /// must stay representable in whole nanoseconds.
    pub fn validate_rate(hz: f64) -> Result<(), ConfigError> {
        ensure_within("physics_hz", hz as f32, MIN_RATE_HZ, MAX_RATE_HZ)
    }

    /// Tick duration.
    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Tick duration in seconds, the `dt` every physics step receives.
    pub fn tick_seconds(&self) -> f32 {
        self.tick.as_secs_f32()
    }

    /// Leftover time not yet consumed by a tick, always `< tick`.
    pub fn accumulator(&self) -> Duration {
        self.accumulator
    }

    /// Progress in [0, 1) from the previous physics state to the current one.
    pub fn interpolation_factor(&self) -> f32 {
        self.interpolation_factor
    }

    /// Physics steps taken since construction.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Accumulate `frame` and call `step` with the tick length once per whole
    /// tick available. Returns how many steps ran.
    ///
    /// A long frame produces several catch-up steps rather than one large
    /// step; capping the frame length is the caller's job.
    pub fn advance<F>(&mut self, frame: Duration, mut step: F) -> u32
    where
        F: FnMut(f32),
    {
        self.accumulator += frame;
        let dt = self.tick_seconds();
        let mut steps = 0;
        while self.accumulator >= self.tick {
            step(dt);
            self.accumulator -= self.tick;
            steps += 1;
        }
        self.total_steps += u64::from(steps);

        let ratio = self.accumulator.as_secs_f64() / self.tick.as_secs_f64();
        self.interpolation_factor = (ratio as f32).clamp(0.0, BELOW_ONE);
        steps
    }

    /// [`advance`](Self::advance) with a frame length in seconds.
    /// Negative or non-finite deltas are treated as zero.
    pub fn advance_seconds<F>(&mut self, frame_seconds: f32, step: F) -> u32
    where
        F: FnMut(f32),
    {
        let frame = if frame_seconds.is_finite() && frame_seconds > 0.0 {
            Duration::from_secs_f32(frame_seconds)
        } else {
            Duration::ZERO
        };
        self.advance(frame, step)
    }

    /// Drop any accumulated time (e.g. after a pause).
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
        self.interpolation_factor = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1/60 s rounded to whole nanoseconds, as `with_rate(60.0)` builds it.
    fn tick() -> Duration {
        Duration::from_nanos(16_666_667)
    }

    #[test]
    fn zero_frame_leaves_state_unchanged() {
        let mut fixed = FixedStepIntegrator::with_tick(tick());
        let mut calls = 0;
        assert_eq!(fixed.advance(tick() / 2, |_| calls += 1), 0);
        let before = (fixed.accumulator(), fixed.interpolation_factor());
        assert_eq!(fixed.advance(Duration::ZERO, |_| calls += 1), 0);
        assert_eq!(calls, 0);
        assert_eq!((fixed.accumulator(), fixed.interpolation_factor()), before);
    }

    #[test]
    fn exact_multiples_step_k_times_with_zero_factor() {
        let tick = tick();
        let mut fixed = FixedStepIntegrator::with_tick(tick);
        let mut calls = 0;

        // 5 ticks split into uneven pieces: 0.5, 1.5, 2, 1 ticks. The odd
        // nanosecond of the halves goes to the second piece so they sum exactly.
        let half = tick / 2;
        let deltas = [half, tick + (tick - half), tick * 2, tick];
        for delta in deltas {
            fixed.advance(delta, |_| calls += 1);
        }

        assert_eq!(calls, 5);
        assert_eq!(fixed.total_steps(), 5);
        assert_eq!(fixed.accumulator(), Duration::ZERO);
        assert_eq!(fixed.interpolation_factor(), 0.0);
    }

    #[test]
    fn every_step_receives_the_tick_length() {
        let mut fixed = FixedStepIntegrator::with_rate(50.0);
        let mut seen = Vec::new();
        fixed.advance(Duration::from_millis(65), |dt| seen.push(dt));
        assert_eq!(seen.len(), 3);
        assert!(seen.iter().all(|&dt| (dt - 0.02).abs() < 1e-7));
        assert!((fixed.interpolation_factor() - 0.25).abs() < 1e-4);
    }

    #[test]
    fn large_frame_catches_up_with_many_steps() {
        let mut fixed = FixedStepIntegrator::with_rate(50.0);
        let steps = fixed.advance(Duration::from_secs(2), |_| {});
        assert_eq!(steps, 100);
        assert_eq!(fixed.interpolation_factor(), 0.0);

        let mut fixed = FixedStepIntegrator::with_rate(60.0);
        let frame = Duration::from_secs(2);
        let steps = fixed.advance(frame, |_| {});
        assert_eq!(u128::from(steps), frame.as_nanos() / fixed.tick().as_nanos());
        assert!(fixed.interpolation_factor() < 1.0);
    }

    #[test]
    fn factor_stays_below_one() {
        let tick = Duration::from_nanos(16_666_667);
        let mut fixed = FixedStepIntegrator::with_tick(tick);
        fixed.advance(tick - Duration::from_nanos(1), |_| {});
        let alpha = fixed.interpolation_factor();
        assert!((0.0..1.0).contains(&alpha));
    }

    #[test]
    fn negative_seconds_are_ignored() {
        let mut fixed = FixedStepIntegrator::with_rate(60.0);
        assert_eq!(fixed.advance_seconds(-1.0, |_| {}), 0);
        assert_eq!(fixed.advance_seconds(f32::NAN, |_| {}), 0);
        assert_eq!(fixed.accumulator(), Duration::ZERO);
    }

    #[test]
    #[should_panic]
    fn zero_rate_is_rejected() {
        let _ = FixedStepIntegrator::with_rate(0.0);
    }

    #[test]
    fn non_finite_and_extreme_rates_fail_validation() {
        assert!(FixedStepIntegrator::validate_rate(60.0).is_ok());
        assert!(FixedStepIntegrator::validate_rate(f64::INFINITY).is_err());
        assert!(FixedStepIntegrator::validate_rate(f64::NAN).is_err());
        assert!(FixedStepIntegrator::validate_rate(1e12).is_err());
    }

    #[test]
    fn frame_clock_counts_frames() {
        let mut time = Time::new();
        time.update();
        time.update();
        assert_eq!(time.frame_count(), 2);
        assert!(time.elapsed() >= time.delta());
    }
}
