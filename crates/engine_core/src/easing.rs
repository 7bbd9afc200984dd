//! Normalized-time easing curves.
//!
//! An [`Easing`] owns its own clock: `step(dt)` returns the curve value at the
//! current time and then advances the time by `dt / duration`.

use serde::{Deserialize, Serialize};

/// Shape of an easing curve over normalized time `t` in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EasingCurve {
    /// Always 1: the transition completes immediately.
    Instant,
    /// `t`, clamped to [0, 1].
    Linear,
    /// Exponential ease-in, ease-out.
    EaseInOutExpo,
    /// Alternates 1/0 `blinks` times, then settles at 0.
    SquareWave { blinks: u8 },
}

impl EasingCurve {
    /// Curve value at normalized time `t`.
    pub fn sample(self, t: f32) -> f32 {
        match self {
            EasingCurve::Instant => 1.0,
            EasingCurve::Linear => t.clamp(0.0, 1.0),
            EasingCurve::EaseInOutExpo => {
                if t <= 0.0 {
                    0.0
                } else if t >= 1.0 {
                    1.0
                } else if t < 0.5 {
                    0.5 * 2f32.powf(20.0 * t - 10.0)
                } else {
                    0.5 * (2.0 - 2f32.powf(-20.0 * t + 10.0))
                }
            }
            EasingCurve::SquareWave { blinks } => {
                if t >= 1.0 {
                    return 0.0;
                }
                // Each blink is an on half followed by an off half.
                let half = 1.0 / (2.0 * f32::from(blinks.max(1)));
                let segment = (t.max(0.0) / half).floor() as u32;
                if segment % 2 == 0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// A curve plus its running clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Easing {
    curve: EasingCurve,
    /// Seconds for `t` to go from 0 to 1.
    duration: f32,
    /// Normalized time.
    time: f32,
}

impl Easing {
    /// # Panics
    /// If `duration` is not strictly positive.
    pub fn new(curve: EasingCurve, duration: f32) -> Self {
        assert!(duration > 0.0, "easing duration must be > 0 (got {duration})");
        Self {
            curve,
            duration,
            time: 0.0,
        }
    }

    pub fn linear(duration: f32) -> Self {
        Self::new(EasingCurve::Linear, duration)
    }

    pub fn ease_in_out_expo(duration: f32) -> Self {
        Self::new(EasingCurve::EaseInOutExpo, duration)
    }

    /// # Panics
    /// If `blinks` is zero.
    pub fn square_wave(duration: f32, blinks: u8) -> Self {
        assert!(blinks >= 1, "square wave needs at least one blink");
        Self::new(EasingCurve::SquareWave { blinks }, duration)
    }

    pub fn curve(&self) -> EasingCurve {
        self.curve
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Normalized time elapsed.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Value at the current time.
    pub fn value(&self) -> f32 {
        self.curve.sample(self.time)
    }

    /// Return the value at the current time, then advance by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> f32 {
        let value = self.value();
        self.time += dt / self.duration;
        value
    }

    pub fn reset(&mut self) {
        self.time = 0.0;
    }

    pub fn reset_and_step(&mut self, dt: f32) -> f32 {
        self.reset();
        self.step(dt)
    }

    pub fn is_finished(&self) -> bool {
        self.time >= 1.0
    }
}
