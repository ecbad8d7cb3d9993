use crate::debug::fps::FrameStats;
use crate::error::ButaiError;
use crate::resources::ResourceGroupManager;
use crate::root::input::{InputState, KeyEvent, MouseButton, MouseEvent};
use crate::scene::SceneManager;

/// Timing handed to every listener once per frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameEvent {
    pub time_since_last_frame: f32,
    pub time_since_last_event: f32,
}

/// Everything a listener may touch while the frame is being built.
pub struct FrameContext<'a> {
    pub scene: &'a mut SceneManager,
    pub resources: &'a mut ResourceGroupManager,
    pub input: &'a InputState,
    pub stats: &'a FrameStats,
}

/// Per-frame callbacks plus buffered keyboard and mouse callbacks.
///
/// `frame_started`/`frame_ended` returning `Ok(false)` stops the render loop;
/// an error stops it too and is reported by `start_rendering`.
pub trait FrameListener {
    fn frame_started(
        &mut self,
        _ctx: &mut FrameContext,
        _evt: &FrameEvent,
    ) -> Result<bool, ButaiError> {
        Ok(true)
    }

    fn frame_ended(&mut self, _ctx: &mut FrameContext, _evt: &FrameEvent) -> Result<bool, ButaiError> {
        Ok(true)
    }

    fn key_pressed(&mut self, _ctx: &mut FrameContext, _evt: &KeyEvent) -> Result<(), ButaiError> {
        Ok(())
    }

    fn key_released(&mut self, _ctx: &mut FrameContext, _evt: &KeyEvent) -> Result<(), ButaiError> {
        Ok(())
    }

    fn mouse_moved(&mut self, _ctx: &mut FrameContext, _evt: &MouseEvent) -> Result<(), ButaiError> {
        Ok(())
    }

    fn mouse_pressed(
        &mut self,
        _ctx: &mut FrameContext,
        _evt: &MouseEvent,
        _button: MouseButton,
    ) -> Result<(), ButaiError> {
        Ok(())
    }

    fn mouse_released(
        &mut self,
        _ctx: &mut FrameContext,
        _evt: &MouseEvent,
        _button: MouseButton,
    ) -> Result<(), ButaiError> {
        Ok(())
    }
}
