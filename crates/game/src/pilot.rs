//! Scripted key presses for the headless run.

use input::{ElementState, KeyCode};

/// One scripted key event, `at` seconds into the script.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub at: f32,
    pub key: KeyCode,
    pub state: ElementState,
}

impl KeyEvent {
    const fn press(at: f32, key: KeyCode) -> Self {
        Self {
            at,
            key,
            state: ElementState::Pressed,
        }
    }

    const fn release(at: f32, key: KeyCode) -> Self {
        Self {
            at,
            key,
            state: ElementState::Released,
        }
    }
}

/// Replays a key timeline, looping it every `period` seconds.
#[derive(Debug, Clone)]
pub struct DemoPilot {
    script: Vec<KeyEvent>,
    period: f32,
    cursor: usize,
    /// Start time of the current loop.
    loop_start: f32,
}

impl DemoPilot {
    /// # Panics
    /// If `script` is not sorted by time or extends past `period`.
    pub fn new(script: Vec<KeyEvent>, period: f32) -> Self {
        assert!(period > 0.0, "pilot period must be > 0");
        assert!(
            script.windows(2).all(|w| w[0].at <= w[1].at),
            "pilot script must be sorted by time"
        );
        assert!(
            script.iter().all(|e| e.at >= 0.0 && e.at < period),
            "pilot script events must fall inside one period"
        );
        Self {
            script,
            period,
            cursor: 0,
            loop_start: 0.0,
        }
    }

    /// Throttle up, weave left and right, climb, dive, brake; every key is
    /// released before the loop restarts.
    pub fn scripted() -> Self {
        use KeyCode::*;
        Self::new(
            vec![
                KeyEvent::press(0.0, KeyW),
                KeyEvent::release(2.5, KeyW),
                KeyEvent::press(3.0, ArrowLeft),
                KeyEvent::release(3.6, ArrowLeft),
                KeyEvent::press(4.5, ArrowRight),
                KeyEvent::release(5.1, ArrowRight),
                KeyEvent::press(6.0, ArrowUp),
                KeyEvent::release(6.4, ArrowUp),
                KeyEvent::press(7.2, ArrowDown),
                KeyEvent::release(7.6, ArrowDown),
                KeyEvent::press(8.5, KeyS),
                KeyEvent::release(9.5, KeyS),
            ],
            12.0,
        )
    }

    /// Events due by `elapsed` seconds that have not been emitted yet.
    pub fn poll(&mut self, elapsed: f32) -> Vec<(KeyCode, ElementState)> {
        let mut due = Vec::new();
        if self.script.is_empty() {
            return due;
        }
        loop {
            match self.script.get(self.cursor) {
                Some(event) if self.loop_start + event.at <= elapsed => {
                    due.push((event.key, event.state));
                    self.cursor += 1;
                }
                Some(_) => break,
                None if self.loop_start + self.period <= elapsed => {
                    self.loop_start += self.period;
                    self.cursor = 0;
                }
                None => break,
            }
        }
        due
    }
}
