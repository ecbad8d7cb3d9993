use std::collections::HashSet;
use winit::event::ElementState;

pub use winit::event::VirtualKeyCode as KeyCode;

/// Wheel travel reported per notch, in the units listeners expect.
pub const WHEEL_DELTA: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => MouseButton::Left,
            winit::event::MouseButton::Right => MouseButton::Right,
            winit::event::MouseButton::Middle => MouseButton::Middle,
            winit::event::MouseButton::Other(id) => MouseButton::Other(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEvent {
    pub key: KeyCode,
}

/// Relative mouse motion plus the buttons held while it happened.
#[derive(Debug, Clone, PartialEq)]
pub struct MouseEvent {
    pub rel_x: f32,
    pub rel_y: f32,
    pub rel_z: f32,
    buttons: HashSet<MouseButton>,
}

impl MouseEvent {
    pub fn new(rel_x: f32, rel_y: f32, rel_z: f32) -> Self {
        MouseEvent {
            rel_x,
            rel_y,
            rel_z,
            buttons: HashSet::new(),
        }
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }
}

/// Input waiting to be dispatched at the start of the next frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    KeyPressed(KeyCode),
    KeyReleased(KeyCode),
    MouseMoved { rel_x: f32, rel_y: f32, rel_z: f32 },
    MousePressed(MouseButton),
    MouseReleased(MouseButton),
}

impl InputEvent {
    pub fn key(key: KeyCode, state: ElementState) -> Self {
        match state {
            ElementState::Pressed => InputEvent::KeyPressed(key),
            ElementState::Released => InputEvent::KeyReleased(key),
        }
    }

    pub fn button(button: MouseButton, state: ElementState) -> Self {
        match state {
            ElementState::Pressed => InputEvent::MousePressed(button),
            ElementState::Released => InputEvent::MouseReleased(button),
        }
    }
}

/// Polled keyboard and mouse state.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    buttons: HashSet<MouseButton>,
}

impl InputState {
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }

    /// Folds an event into the held state. Returns false for repeats of a held key.
    pub(crate) fn apply(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::KeyPressed(key) => self.keys.insert(*key),
            InputEvent::KeyReleased(key) => self.keys.remove(key),
            InputEvent::MousePressed(button) => self.buttons.insert(*button),
            InputEvent::MouseReleased(button) => self.buttons.remove(button),
            InputEvent::MouseMoved { .. } => true,
        }
    }

    pub(crate) fn mouse_event(&self, rel_x: f32, rel_y: f32, rel_z: f32) -> MouseEvent {
        MouseEvent {
            rel_x,
            rel_y,
            rel_z,
            buttons: self.buttons.clone(),
        }
    }

    pub(crate) fn release_all(&mut self) {
        self.keys.clear();
        self.buttons.clear();
    }
}
