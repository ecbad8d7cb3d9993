//! Frame listeners the labs register on the `Root`.

pub mod camera;
pub mod characters;
pub mod lights;

pub use self::camera::{CameraInput, CameraPresets, OrbitCamera, RigInput};
pub use self::characters::{AnimationTicker, FishSwarm, KeyDriver, NinjaChaser, RouteWalker};
pub use self::lights::LightToggle;

use crate::error::ButaiError;
use crate::root::input::{KeyCode, KeyEvent};
use crate::root::listener::{FrameContext, FrameEvent, FrameListener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EscTrigger {
    Held,
    Released,
}

/// Ends the render loop on ESC.
#[derive(Debug, Clone)]
pub struct EscListener {
    trigger: EscTrigger,
    quit: bool,
}

impl EscListener {
    /// Quits on any frame that sees ESC held down.
    pub fn polled() -> Self {
        EscListener {
            trigger: EscTrigger::Held,
            quit: false,
        }
    }

    /// Quits on the frame after ESC is let go.
    pub fn on_release() -> Self {
        EscListener {
            trigger: EscTrigger::Released,
            quit: false,
        }
    }
}

impl FrameListener for EscListener {
    fn frame_started(&mut self, ctx: &mut FrameContext, _evt: &FrameEvent) -> Result<bool, ButaiError> {
        Ok(match self.trigger {
            EscTrigger::Held => !ctx.input.is_key_down(KeyCode::Escape),
            EscTrigger::Released => !self.quit,
        })
    }

    fn key_released(&mut self, _ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        if self.trigger == EscTrigger::Released && evt.key == KeyCode::Escape {
            log::info!("escape released, leaving the render loop");
            self.quit = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::root::input::InputEvent;
    use crate::root::Root;

    #[test]
    fn polled_escape_stops_while_held() {
        let mut root = Root::new(Config::default());
        root.add_frame_listener(EscListener::polled());
        assert!(root.step(0.016).unwrap());
        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        assert!(!root.step(0.016).unwrap());
    }

    #[test]
    fn release_escape_waits_for_key_up() {
        let mut root = Root::new(Config::default());
        root.add_frame_listener(EscListener::on_release());
        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        assert!(root.step(0.016).unwrap());
        root.inject(InputEvent::KeyReleased(KeyCode::Escape));
        assert!(!root.step(0.016).unwrap());
    }
}
