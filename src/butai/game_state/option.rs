use super::{GameHandle, GameState};
use crate::error::ButaiError;
use crate::root::input::{KeyCode, KeyEvent};
use crate::root::listener::FrameContext;

/// Sits on top of the play state until O or ESC pops it.
#[derive(Debug, Clone, Default)]
pub struct OptionState;

impl GameState for OptionState {
    fn name(&self) -> &str {
        "Option"
    }

    fn enter(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        log::info!("options open, game paused");
        Ok(())
    }

    fn exit(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        log::info!("options closed");
        Ok(())
    }

    fn key_pressed(
        &mut self,
        _ctx: &mut FrameContext,
        game: &mut GameHandle,
        evt: &KeyEvent,
    ) -> Result<(), ButaiError> {
        if matches!(evt.key, KeyCode::O | KeyCode::Escape) {
            game.pop_state();
        }
        Ok(())
    }
}
