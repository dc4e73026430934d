//! Keyboard state
//!
//! The page forwards `KeyboardEvent.code` strings; we keep the held set and
//! latch one-shot presses until the next frame polls them.

use std::collections::HashSet;

use crate::sim::{Movement, TickInput};

/// Keys the game listens to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
    Escape,
    Control,
}

impl Key {
    /// Map a `KeyboardEvent.code` value; unknown codes are ignored
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "KeyW" => Key::W,
            "KeyA" => Key::A,
            "KeyS" => Key::S,
            "KeyD" => Key::D,
            "ArrowUp" => Key::Up,
            "ArrowDown" => Key::Down,
            "ArrowLeft" => Key::Left,
            "ArrowRight" => Key::Right,
            "Space" => Key::Space,
            "Escape" => Key::Escape,
            "ControlLeft" | "ControlRight" => Key::Control,
            _ => return None,
        })
    }
}

/// Held keys plus latched presses
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashSet<Key>,
    fire: bool,
    pause: bool,
    toggle_debug: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A key went down. Auto-repeat calls this again, which re-arms fire.
    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Space => self.fire = true,
            Key::Escape => self.pause = true,
            // Ctrl+D is the overlay chord, not a step to the right
            Key::D if self.held.contains(&Key::Control) => {
                self.toggle_debug = true;
                return;
            }
            _ => {}
        }
        self.held.insert(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.held.remove(&key);
    }

    /// String-coded variants for the page glue
    pub fn key_down_code(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.key_down(key);
        }
    }

    pub fn key_up_code(&mut self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.key_up(key);
        }
    }

    /// Held directions, arrows folded onto WASD
    pub fn movement(&self) -> Movement {
        let any = |a: Key, b: Key| self.held.contains(&a) || self.held.contains(&b);
        Movement {
            forward: any(Key::W, Key::Up),
            back: any(Key::S, Key::Down),
            left: any(Key::A, Key::Left),
            right: any(Key::D, Key::Right),
        }
    }

    /// Build this frame's input and consume the latched presses
    pub fn take_tick_input(&mut self) -> TickInput {
        let input = TickInput {
            movement: self.movement(),
            fire: self.fire,
            pause: self.pause,
            toggle_debug: self.toggle_debug,
        };
        self.fire = false;
        self.pause = false;
        self.toggle_debug = false;
        input
    }

    /// Forget everything (window lost focus)
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
