use super::{GameHandle, GameState, PlayState};
use crate::error::ButaiError;
use crate::root::input::{KeyCode, KeyEvent};
use crate::root::listener::FrameContext;
use crate::scene::node::CameraId;

/// Waits for Return to start playing; ESC leaves the game.
#[derive(Debug, Clone)]
pub struct TitleState {
    camera: CameraId,
}

impl TitleState {
    pub fn new(camera: CameraId) -> Self {
        TitleState { camera }
    }
}

impl GameState for TitleState {
    fn name(&self) -> &str {
        "Title"
    }

    fn enter(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        log::info!("title: press Return to play, Escape to quit");
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        Ok(())
    }

    fn key_pressed(
        &mut self,
        _ctx: &mut FrameContext,
        game: &mut GameHandle,
        evt: &KeyEvent,
    ) -> Result<(), ButaiError> {
        match evt.key {
            KeyCode::Return => game.change_state(PlayState::new(self.camera)),
            KeyCode::Escape => game.quit(),
            _ => {}
        }
        Ok(())
    }
}
