// src/input.rs
//! Keyboard state reduced to a per-frame pressed map
//!
//! Raw winit key events fold into a boolean map over an abstract [`KeyCode`]
//! so the engine never sees platform key types. Alt is tracked separately
//! from the modifier stream.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{self, ModifiersState, PhysicalKey};

/// Keys the demo reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    W,
    A,
    S,
    D,
    Q,
    E,
    Up,
    Down,
    Left,
    Right,
    Zero,
    One,
    Two,
    Escape,
}

/// Pressed-map sampled once per frame before the engine update
#[derive(Debug, Default)]
pub struct InputState {
    pressed: HashSet<KeyCode>,
    alt: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn alt_pressed(&self) -> bool {
        self.alt
    }

    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.pressed.insert(key);
        } else {
            self.pressed.remove(&key);
        }
    }

    /// Folds one winit keyboard event into the map; unmapped keys are ignored
    pub fn process_key_event(&mut self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        if let Some(key) = map_key(code) {
            self.set_key(key, event.state == ElementState::Pressed);
        }
    }

    pub fn process_modifiers(&mut self, modifiers: ModifiersState) {
        self.alt = modifiers.alt_key();
    }
}

fn map_key(code: keyboard::KeyCode) -> Option<KeyCode> {
    match code {
        keyboard::KeyCode::KeyW => Some(KeyCode::W),
        keyboard::KeyCode::KeyA => Some(KeyCode::A),
        keyboard::KeyCode::KeyS => Some(KeyCode::S),
        keyboard::KeyCode::KeyD => Some(KeyCode::D),
        keyboard::KeyCode::KeyQ => Some(KeyCode::Q),
        keyboard::KeyCode::KeyE => Some(KeyCode::E),
        keyboard::KeyCode::ArrowUp => Some(KeyCode::Up),
        keyboard::KeyCode::ArrowDown => Some(KeyCode::Down),
        keyboard::KeyCode::ArrowLeft => Some(KeyCode::Left),
        keyboard::KeyCode::ArrowRight => Some(KeyCode::Right),
        keyboard::KeyCode::Digit0 => Some(KeyCode::Zero),
        keyboard::KeyCode::Digit1 => Some(KeyCode::One),
        keyboard::KeyCode::Digit2 => Some(KeyCode::Two),
        keyboard::KeyCode::Escape => Some(KeyCode::Escape),
        _ => None,
    }
}
