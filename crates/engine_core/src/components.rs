//! Common components shared by the craft and the obstacles.

use crate::easing::Easing;

/// Hit points for damageable entities.
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount).max(0.0);
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    pub fn percentage(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(500.0)
    }
}

/// Remaining lifetime for temporary entities (obstacles, projectiles).
#[derive(Debug, Clone, Copy)]
pub struct Lifetime {
    pub remaining: f32,
}

impl Lifetime {
    pub fn new(seconds: f32) -> Self {
        Self { remaining: seconds }
    }

    /// Count down by `dt`. Returns true once expired.
    pub fn update(&mut self, dt: f32) -> bool {
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    pub fn is_expired(&self) -> bool {
        self.remaining <= 0.0
    }
}

/// Render-visibility flicker driven by a square wave, used after a hit.
#[derive(Debug, Clone)]
pub struct Blink {
    wave: Easing,
    running: bool,
}

impl Blink {
    /// # Panics
    /// If `duration <= 0` or `blinks == 0`.
    pub fn new(duration: f32, blinks: u8) -> Self {
        Self {
            wave: Easing::square_wave(duration, blinks),
            running: false,
        }
    }

    /// Restart the flicker from its first "on" phase.
    pub fn start(&mut self) {
        self.wave.reset();
        self.running = true;
    }

    pub fn update(&mut self, dt: f32) {
        if self.running {
            self.wave.step(dt);
            if self.wave.is_finished() {
                self.running = false;
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the entity should be drawn this frame.
    pub fn visible(&self) -> bool {
        !self.running || self.wave.value() > 0.5
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_clamps_at_zero() {
        let mut h = Health::new(100.0);
        h.take_damage(30.0);
        assert_eq!(h.current, 70.0);
        assert_eq!(h.percentage(), 0.7);
        h.take_damage(500.0);
        assert_eq!(h.current, 0.0);
        assert!(h.is_dead());
        assert_eq!(h.percentage(), 0.0);
    }

    #[test]
    fn lifetime_expires() {
        let mut l = Lifetime::new(1.0);
        assert!(!l.update(0.5));
        assert!(l.update(0.5));
        assert!(l.is_expired());
    }

    #[test]
    fn blink_toggles_then_settles_visible() {
        let mut b = Blink::new(1.0, 2);
        assert!(b.visible());
        b.start();
        assert!(b.visible());
        b.update(0.3); // second quarter: off
        assert!(!b.visible());
        b.update(0.25); // third quarter: on
        assert!(b.visible());
        b.update(0.25); // fourth quarter: off
        assert!(!b.visible());
        b.update(0.5);
        assert!(!b.is_running());
        assert!(b.visible());
    }
}
