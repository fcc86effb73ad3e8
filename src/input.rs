use std::collections::HashSet;

use winit::event::{ElementState, WindowEvent};
use winit::keyboard::{Key, KeyCode, PhysicalKey};

/// Keyboard state for the current frame.
///
/// Physical keys are tracked as down / pressed / released. Characters produced by key
/// presses (auto-repeat included) are collected separately, so bindings like `+` work
/// independently of the keyboard layout.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    typed: Vec<char>,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the per-frame sets. Call after the frame has consumed them.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.typed.clear();
    }

    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                if let PhysicalKey::Code(key) = event.physical_key {
                    if pressed {
                        self.press(key, event.repeat);
                    } else {
                        self.release(key);
                    }
                }
                if pressed {
                    if let Key::Character(text) = &event.logical_key {
                        text.chars().for_each(|c| self.type_char(c));
                    }
                }
            }
            // Releases are lost while unfocused; forget held keys so Shift cannot stick.
            WindowEvent::Focused(false) => self.keys_down.clear(),
            _ => {}
        }
    }

    pub(crate) fn press(&mut self, key: KeyCode, repeat: bool) {
        if repeat || !self.keys_down.contains(&key) {
            self.keys_pressed.insert(key);
        }
        self.keys_down.insert(key);
    }

    pub(crate) fn release(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_released.insert(key);
    }

    pub(crate) fn type_char(&mut self, c: char) {
        self.typed.push(c);
    }

    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    pub fn shift_down(&self) -> bool {
        self.key_down(KeyCode::ShiftLeft) || self.key_down(KeyCode::ShiftRight)
    }

    /// Characters typed this frame, in order.
    pub fn typed(&self) -> &[char] {
        &self.typed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_is_reported_once_until_released() {
        let mut input = Input::new();
        input.press(KeyCode::ArrowUp, false);
        assert!(input.key_pressed(KeyCode::ArrowUp));

        input.begin_frame();
        input.press(KeyCode::ArrowUp, false);
        assert!(input.key_down(KeyCode::ArrowUp));
        assert!(!input.key_pressed(KeyCode::ArrowUp));

        input.release(KeyCode::ArrowUp);
        assert!(input.key_released(KeyCode::ArrowUp));
        assert!(!input.key_down(KeyCode::ArrowUp));
    }

    #[test]
    fn auto_repeat_counts_as_a_press() {
        let mut input = Input::new();
        input.press(KeyCode::ArrowRight, false);
        input.begin_frame();
        input.press(KeyCode::ArrowRight, true);
        assert!(input.key_pressed(KeyCode::ArrowRight));
    }

    #[test]
    fn typed_characters_reset_each_frame() {
        let mut input = Input::new();
        input.type_char('+');
        input.type_char('w');
        assert_eq!(input.typed(), &['+', 'w']);
        input.begin_frame();
        assert!(input.typed().is_empty());
    }

    #[test]
    fn either_shift_key_counts() {
        let mut input = Input::new();
        assert!(!input.shift_down());
        input.press(KeyCode::ShiftRight, false);
        assert!(input.shift_down());
    }
}
