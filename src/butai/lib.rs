//! Scene graph, input listeners and a vulkano deferred renderer for the
//! lecture labs: a render window, the professor and ninja scenes, walking
//! and chasing characters, a game state stack and switchable lights.

extern crate vulkano;

pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod figure;
pub mod frame;
pub mod game_state;
pub mod labs;
pub mod listeners;
pub mod locomotion;
pub mod math;
pub mod resources;
pub mod root;
pub mod scene;
pub mod setup;

pub use crate::error::{ButaiError, Result};
pub use crate::root::Root;
