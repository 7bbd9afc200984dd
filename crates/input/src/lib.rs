//! Keyboard input and its mapping to pilot intents.
//!
//! The window layer forwards press/release events into [`InputState`]; the
//! simulation only ever sees the resulting [`PilotIntents`] snapshot.

use std::collections::{HashMap, HashSet};

/// One thing the pilot can ask the craft to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Accelerate,
    Decelerate,
    TurnLeft,
    TurnRight,
    PitchUp,
    PitchDown,
    Quit,
}

/// Latched "should-X" flags for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PilotIntents {
    pub accelerate: bool,
    pub decelerate: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub quit: bool,
}

impl PilotIntents {
    pub fn set(&mut self, intent: Intent, on: bool) {
        let flag = match intent {
            Intent::Accelerate => &mut self.accelerate,
            Intent::Decelerate => &mut self.decelerate,
            Intent::TurnLeft => &mut self.turn_left,
            Intent::TurnRight => &mut self.turn_right,
            Intent::PitchUp => &mut self.pitch_up,
            Intent::PitchDown => &mut self.pitch_down,
            Intent::Quit => &mut self.quit,
        };
        *flag = on;
    }

    pub fn is_set(&self, intent: Intent) -> bool {
        match intent {
            Intent::Accelerate => self.accelerate,
            Intent::Decelerate => self.decelerate,
            Intent::TurnLeft => self.turn_left,
            Intent::TurnRight => self.turn_right,
            Intent::PitchUp => self.pitch_up,
            Intent::PitchDown => self.pitch_down,
            Intent::Quit => self.quit,
        }
    }

    /// True if any flight intent (not quit) is set.
    pub fn any_flight(&self) -> bool {
        self.accelerate
            || self.decelerate
            || self.turn_left
            || self.turn_right
            || self.pitch_up
            || self.pitch_down
    }
}

/// Key to intent table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: HashMap<KeyCode, Intent>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
            .bind(KeyCode::KeyW, Intent::Accelerate)
            .bind(KeyCode::KeyS, Intent::Decelerate)
            .bind(KeyCode::ArrowLeft, Intent::TurnLeft)
            .bind(KeyCode::ArrowRight, Intent::TurnRight)
            .bind(KeyCode::ArrowUp, Intent::PitchUp)
            .bind(KeyCode::ArrowDown, Intent::PitchDown)
            .bind(KeyCode::Escape, Intent::Quit)
    }
}

impl KeyBindings {
    /// Empty table.
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(mut self, key: KeyCode, intent: Intent) -> Self {
        self.bindings.insert(key, intent);
        self
    }

    pub fn intent_for(&self, key: KeyCode) -> Option<Intent> {
        self.bindings.get(&key).copied()
    }

    /// Keys bound to `intent`.
    pub fn keys_for(&self, intent: Intent) -> impl Iterator<Item = KeyCode> + '_ {
        self.bindings
            .iter()
            .filter(move |(_, bound)| **bound == intent)
            .map(|(key, _)| *key)
    }
}

/// Manages input state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,
    bindings: KeyBindings,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bindings(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            ..Default::default()
        }
    }

    /// Clear per-frame state. Call at the start of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Whether any key bound to `intent` is held.
    pub fn is_intent_held(&self, intent: Intent) -> bool {
        self.bindings.keys_for(intent).any(|key| self.is_key_held(key))
    }

    /// Intent flags implied by the keys currently held.
    pub fn intents(&self) -> PilotIntents {
        let mut intents = PilotIntents::default();
        for key in &self.keys_held {
            if let Some(intent) = self.bindings.intent_for(*key) {
                intents.set(intent, true);
            }
        }
        intents
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_keys_map_to_intents() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed);
        let intents = input.intents();
        assert!(intents.accelerate);
        assert!(intents.turn_left);
        assert!(!intents.turn_right);
        assert!(!intents.quit);

        input.process_keyboard(KeyCode::KeyW, ElementState::Released);
        assert!(!input.intents().accelerate);
        assert!(input.intents().turn_left);
    }

    #[test]
    fn pressed_is_per_frame_but_held_persists() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        assert!(input.is_key_pressed(KeyCode::ArrowUp));
        input.begin_frame();
        assert!(!input.is_key_pressed(KeyCode::ArrowUp));
        assert!(input.is_key_held(KeyCode::ArrowUp));
        // Key repeat does not count as a new press.
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        assert!(!input.is_key_pressed(KeyCode::ArrowUp));
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Released);
        assert!(input.is_key_released(KeyCode::ArrowUp));
        assert!(!input.is_intent_held(Intent::PitchUp));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyZ, ElementState::Pressed);
        assert_eq!(input.intents(), PilotIntents::default());
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let bindings = KeyBindings::new().bind(KeyCode::Space, Intent::Accelerate);
        let mut input = InputState::with_bindings(bindings);
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        let intents = input.intents();
        assert!(intents.accelerate);
        assert!(intents.any_flight());
        assert!(input.is_intent_held(Intent::Accelerate));
    }

    #[test]
    fn escape_requests_quit() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::Escape, ElementState::Pressed);
        let intents = input.intents();
        assert!(intents.quit);
        assert!(!intents.any_flight());
        assert!(intents.is_set(Intent::Quit));
    }
}
