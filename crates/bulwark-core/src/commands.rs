//! Per-frame input snapshot handed to the simulation by the input poller.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::enums::Key;

/// Everything the simulation reads from the input devices in one frame.
///
/// `*_pressed` fields are edges (went down this frame); `*_held` fields are
/// levels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Pointer position in screen pixels.
    pub pointer: DVec2,
    pub left_pressed: bool,
    pub left_held: bool,
    pub middle_held: bool,
    pub right_pressed: bool,
    /// Wheel notches scrolled this frame, positive away from the user.
    pub wheel: f64,
    pub keys_down: Vec<Key>,
    pub keys_held: Vec<Key>,
}

impl InputFrame {
    /// A frame with the pointer at `pointer` and nothing pressed.
    pub fn idle_at(pointer: DVec2) -> Self {
        Self {
            pointer,
            ..Default::default()
        }
    }

    /// A primary click at `pointer`.
    pub fn click_at(pointer: DVec2) -> Self {
        Self {
            pointer,
            left_pressed: true,
            left_held: true,
            ..Default::default()
        }
    }

    /// Typing `text`, one key-down event per character.
    pub fn typing(text: &str) -> Self {
        Self {
            keys_down: text.chars().map(Key::Char).collect(),
            ..Default::default()
        }
    }

    pub fn key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_held(&self, key: Key) -> bool {
        self.keys_held.contains(&key)
    }
}
