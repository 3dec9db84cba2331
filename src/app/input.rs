use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Per-frame input state, fed from window events and cleared by
/// [`end_frame`](Input::end_frame).
#[derive(Default, Debug, Clone)]
pub struct Input {
    pub cursor_position: Vec2,
    /// Cursor movement accumulated since the last frame.
    pub cursor_delta: Vec2,
    pub scroll_delta: Vec2,
    pub screen_size: Vec2,
    pub mouse_buttons: HashSet<MouseButton>,

    pub keys_down: HashSet<KeyCode>,
    /// Keys that went down this frame. Auto-repeat does not count.
    pub keys_pressed: HashSet<KeyCode>,
}

impl Input {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn end_frame(&mut self) {
        self.cursor_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
        self.keys_pressed.clear();
    }

    pub fn handle_resize(&mut self, width: u32, height: u32) {
        self.screen_size = Vec2::new(width as f32, height as f32);
    }

    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        // The first event only establishes the position.
        if self.cursor_position != Vec2::ZERO {
            self.cursor_delta += new_pos - self.cursor_position;
        }
        self.cursor_position = new_pos;
    }

    pub fn handle_mouse_input(&mut self, state: ElementState, button: MouseButton) {
        match state {
            ElementState::Pressed => {
                self.mouse_buttons.insert(button);
            }
            ElementState::Released => {
                self.mouse_buttons.remove(&button);
            }
        }
    }

    pub fn handle_mouse_wheel(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(x, y) => {
                self.scroll_delta += Vec2::new(x, y);
            }
            MouseScrollDelta::PixelDelta(pos) => {
                self.scroll_delta += Vec2::new(pos.x as f32, pos.y as f32) * 0.1;
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyCode, state: ElementState, repeat: bool) {
        match state {
            ElementState::Pressed => {
                if !repeat && self.keys_down.insert(key) {
                    self.keys_pressed.insert(key);
                }
            }
            ElementState::Released => {
                self.keys_down.remove(&key);
            }
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    #[must_use]
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// `Space` or `M` went down this frame.
    #[must_use]
    pub fn music_toggle_pressed(&self) -> bool {
        self.is_key_pressed(KeyCode::Space) || self.is_key_pressed(KeyCode::KeyM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_press_lasts_one_frame() {
        let mut input = Input::new();
        input.handle_key(KeyCode::Space, ElementState::Pressed, false);
        assert!(input.music_toggle_pressed());

        input.end_frame();
        assert!(!input.music_toggle_pressed());
        assert!(input.keys_down.contains(&KeyCode::Space));
    }

    #[test]
    fn held_key_does_not_repeat() {
        let mut input = Input::new();
        input.handle_key(KeyCode::KeyM, ElementState::Pressed, false);
        input.end_frame();
        input.handle_key(KeyCode::KeyM, ElementState::Pressed, true);
        assert!(!input.music_toggle_pressed());

        input.handle_key(KeyCode::KeyM, ElementState::Released, false);
        input.handle_key(KeyCode::KeyM, ElementState::Pressed, false);
        assert!(input.music_toggle_pressed());
    }

    #[test]
    fn first_cursor_event_has_no_delta() {
        let mut input = Input::new();
        input.handle_cursor_move(100.0, 50.0);
        assert_eq!(input.cursor_delta, Vec2::ZERO);
        input.handle_cursor_move(110.0, 45.0);
        assert_eq!(input.cursor_delta, Vec2::new(10.0, -5.0));
    }
}
