//! Stack of game states driven by the frame loop: a title screen, the
//! play scene and an option overlay that pauses it.

pub mod option;
pub mod play;
pub mod title;

pub use self::option::OptionState;
pub use self::play::PlayState;
pub use self::title::TitleState;

use crate::error::ButaiError;
use crate::root::input::{KeyEvent, MouseButton, MouseEvent};
use crate::root::listener::{FrameContext, FrameEvent, FrameListener};
use std::collections::VecDeque;
use std::fmt;

/// One screen of the game. Every callback gets a `GameHandle` to request
/// transitions, which the manager applies once the callback returns.
pub trait GameState {
    fn name(&self) -> &str;

    fn enter(&mut self, ctx: &mut FrameContext, game: &mut GameHandle) -> Result<(), ButaiError>;

    fn exit(&mut self, ctx: &mut FrameContext, game: &mut GameHandle) -> Result<(), ButaiError>;

    fn pause(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        Ok(())
    }

    fn resume(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
        Ok(())
    }

    fn frame_started(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &FrameEvent,
    ) -> Result<bool, ButaiError> {
        Ok(true)
    }

    fn frame_ended(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &FrameEvent,
    ) -> Result<bool, ButaiError> {
        Ok(true)
    }

    fn key_pressed(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &KeyEvent,
    ) -> Result<(), ButaiError> {
        Ok(())
    }

    fn key_released(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &KeyEvent,
    ) -> Result<(), ButaiError> {
        Ok(())
    }

    fn mouse_moved(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &MouseEvent,
    ) -> Result<(), ButaiError> {
        Ok(())
    }

    fn mouse_pressed(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &MouseEvent,
        _button: MouseButton,
    ) -> Result<(), ButaiError> {
        Ok(())
    }

    fn mouse_released(
        &mut self,
        _ctx: &mut FrameContext,
        _game: &mut GameHandle,
        _evt: &MouseEvent,
        _button: MouseButton,
    ) -> Result<(), ButaiError> {
        Ok(())
    }
}

enum Transition {
    Change(Box<dyn GameState>),
    Push(Box<dyn GameState>),
    Pop,
    Quit,
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transition::Change(state) => write!(f, "Change({})", state.name()),
            Transition::Push(state) => write!(f, "Push({})", state.name()),
            Transition::Pop => f.write_str("Pop"),
            Transition::Quit => f.write_str("Quit"),
        }
    }
}

/// Transition requests collected during a state callback.
#[derive(Debug, Default)]
pub struct GameHandle {
    pending: VecDeque<Transition>,
}

impl GameHandle {
    /// Exits the current state and enters `state` in its place.
    pub fn change_state<S: GameState + 'static>(&mut self, state: S) {
        self.pending.push_back(Transition::Change(Box::new(state)));
    }

    /// Pauses the current state and enters `state` on top of it.
    pub fn push_state<S: GameState + 'static>(&mut self, state: S) {
        self.pending.push_back(Transition::Push(Box::new(state)));
    }

    /// Exits the current state and resumes the one below.
    pub fn pop_state(&mut self) {
        self.pending.push_back(Transition::Pop);
    }

    pub fn quit(&mut self) {
        self.pending.push_back(Transition::Quit);
    }
}

/// Frame listener owning the state stack. The initial state is entered on
/// the first callback; the loop stops once the stack is empty.
pub struct GameManager {
    stack: Vec<Box<dyn GameState>>,
    initial: Option<Box<dyn GameState>>,
    quit: bool,
}

impl GameManager {
    pub fn new<S: GameState + 'static>(initial: S) -> Self {
        log::trace!("instance of {}", std::any::type_name::<Self>());
        GameManager {
            stack: Vec::new(),
            initial: Some(Box::new(initial)),
            quit: false,
        }
    }

    /// Names of the states on the stack, bottom first.
    pub fn states(&self) -> Vec<&str> {
        self.stack.iter().map(|s| s.name()).collect()
    }

    fn running(&self) -> bool {
        !self.quit && !self.stack.is_empty()
    }

    fn start(&mut self, ctx: &mut FrameContext) -> Result<(), ButaiError> {
        if let Some(initial) = self.initial.take() {
            let mut game = GameHandle::default();
            game.pending.push_back(Transition::Push(initial));
            self.apply(ctx, game)?;
        }
        Ok(())
    }

    fn apply(&mut self, ctx: &mut FrameContext, mut game: GameHandle) -> Result<(), ButaiError> {
        while let Some(transition) = game.pending.pop_front() {
            log::debug!("game state transition {:?}", transition);
            match transition {
                Transition::Change(mut state) => {
                    if let Some(mut top) = self.stack.pop() {
                        top.exit(ctx, &mut game)?;
                    }
                    state.enter(ctx, &mut game)?;
                    self.stack.push(state);
                }
                Transition::Push(mut state) => {
                    if let Some(top) = self.stack.last_mut() {
                        top.pause(ctx, &mut game)?;
                    }
                    state.enter(ctx, &mut game)?;
                    self.stack.push(state);
                }
                Transition::Pop => {
                    if let Some(mut top) = self.stack.pop() {
                        top.exit(ctx, &mut game)?;
                    }
                    if let Some(top) = self.stack.last_mut() {
                        top.resume(ctx, &mut game)?;
                    }
                }
                Transition::Quit => {
                    self.quit = true;
                    while let Some(mut top) = self.stack.pop() {
                        top.exit(ctx, &mut game)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Runs `f` against the top state, then applies whatever it requested.
    fn with_top<T, F>(&mut self, ctx: &mut FrameContext, idle: T, f: F) -> Result<T, ButaiError>
    where
        F: FnOnce(&mut dyn GameState, &mut FrameContext, &mut GameHandle) -> Result<T, ButaiError>,
    {
        self.start(ctx)?;
        let mut game = GameHandle::default();
        let out = match self.stack.last_mut() {
            Some(top) => f(top.as_mut(), ctx, &mut game)?,
            None => idle,
        };
        self.apply(ctx, game)?;
        Ok(out)
    }
}

impl FrameListener for GameManager {
    fn frame_started(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        let keep = self.with_top(ctx, false, |s, ctx, game| s.frame_started(ctx, game, evt))?;
        Ok(keep && self.running())
    }

    fn frame_ended(&mut self, ctx: &mut FrameContext, evt: &FrameEvent) -> Result<bool, ButaiError> {
        let keep = self.with_top(ctx, false, |s, ctx, game| s.frame_ended(ctx, game, evt))?;
        Ok(keep && self.running())
    }

    fn key_pressed(&mut self, ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        self.with_top(ctx, (), |s, ctx, game| s.key_pressed(ctx, game, evt))
    }

    fn key_released(&mut self, ctx: &mut FrameContext, evt: &KeyEvent) -> Result<(), ButaiError> {
        self.with_top(ctx, (), |s, ctx, game| s.key_released(ctx, game, evt))
    }

    fn mouse_moved(&mut self, ctx: &mut FrameContext, evt: &MouseEvent) -> Result<(), ButaiError> {
        self.with_top(ctx, (), |s, ctx, game| s.mouse_moved(ctx, game, evt))
    }

    fn mouse_pressed(
        &mut self,
        ctx: &mut FrameContext,
        evt: &MouseEvent,
        button: MouseButton,
    ) -> Result<(), ButaiError> {
        self.with_top(ctx, (), |s, ctx, game| s.mouse_pressed(ctx, game, evt, button))
    }

    fn mouse_released(
        &mut self,
        ctx: &mut FrameContext,
        evt: &MouseEvent,
        button: MouseButton,
    ) -> Result<(), ButaiError> {
        self.with_top(ctx, (), |s, ctx, game| s.mouse_released(ctx, game, evt, button))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::root::input::{InputEvent, KeyCode};
    use crate::root::Root;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Journal = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        journal: Journal,
    }

    impl Probe {
        fn note(&self, what: &str) {
            self.journal
                .borrow_mut()
                .push(format!("{} {}", self.name, what));
        }
    }

    impl GameState for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn enter(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
            self.note("enter");
            Ok(())
        }

        fn exit(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
            self.note("exit");
            Ok(())
        }

        fn pause(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
            self.note("pause");
            Ok(())
        }

        fn resume(&mut self, _ctx: &mut FrameContext, _game: &mut GameHandle) -> Result<(), ButaiError> {
            self.note("resume");
            Ok(())
        }

        fn key_pressed(
            &mut self,
            _ctx: &mut FrameContext,
            game: &mut GameHandle,
            evt: &KeyEvent,
        ) -> Result<(), ButaiError> {
            let journal = self.journal.clone();
            match evt.key {
                KeyCode::C => game.change_state(Probe { name: "changed", journal }),
                KeyCode::P => game.push_state(Probe { name: "pushed", journal }),
                KeyCode::O => game.pop_state(),
                KeyCode::Q => game.quit(),
                _ => {}
            }
            Ok(())
        }
    }

    fn tap(root: &mut Root, key: KeyCode) -> bool {
        root.inject(InputEvent::KeyPressed(key));
        root.inject(InputEvent::KeyReleased(key));
        root.step(0.016).unwrap()
    }

    #[test]
    fn push_pauses_and_pop_resumes() {
        let journal = Journal::default();
        let mut root = Root::new(Config::default());
        root.add_frame_listener(GameManager::new(Probe {
            name: "title",
            journal: journal.clone(),
        }));
        assert!(root.step(0.016).unwrap());
        assert!(tap(&mut root, KeyCode::P));
        assert!(tap(&mut root, KeyCode::O));
        assert!(tap(&mut root, KeyCode::C));
        assert_eq!(
            *journal.borrow(),
            vec![
                "title enter",
                "title pause",
                "pushed enter",
                "pushed exit",
                "title resume",
                "title exit",
                "changed enter",
            ]
        );
    }

    #[test]
    fn empty_stack_stops_the_loop() {
        let journal = Journal::default();
        let mut root = Root::new(Config::default());
        root.add_frame_listener(GameManager::new(Probe {
            name: "title",
            journal: journal.clone(),
        }));
        assert!(root.step(0.016).unwrap());
        assert!(!tap(&mut root, KeyCode::O));
        assert_eq!(journal.borrow().last().map(String::as_str), Some("title exit"));
    }

    #[test]
    fn quit_exits_every_state() {
        let journal = Journal::default();
        let mut root = Root::new(Config::default());
        root.add_frame_listener(GameManager::new(Probe {
            name: "title",
            journal: journal.clone(),
        }));
        assert!(tap(&mut root, KeyCode::P));
        assert!(!tap(&mut root, KeyCode::Q));
        assert_eq!(
            journal.borrow()[journal.borrow().len() - 2..].to_vec(),
            vec!["pushed exit", "title exit"]
        );
    }
}
