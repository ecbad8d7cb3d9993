use butai::config::Config;
use butai::error::ButaiError;
use butai::labs::{
    game_framework, light, move_professor_ninja, professor_chase, professor_ninja, render_window,
    walking_professor,
};
use butai::root::input::{InputEvent, KeyCode};
use butai::Root;

type Setup = fn(&mut Root) -> Result<(), ButaiError>;

fn headless(title: &str, setup: Setup) -> Root {
    let mut root = Root::new(Config::default());
    root.create_window(title);
    setup(&mut root).unwrap();
    assert!(root.viewport().is_some(), "{} has no viewport", title);
    root
}

fn run_frames(root: &mut Root, frames: usize) {
    for _ in 0..frames {
        assert!(root.step(1.0 / 60.0).unwrap());
    }
}

#[test]
fn escape_press_stops_the_polled_labs() {
    let labs: &[(&str, Setup)] = &[
        (render_window::TITLE, render_window::setup),
        (professor_ninja::TITLE, professor_ninja::setup),
        (move_professor_ninja::TITLE, move_professor_ninja::setup),
        (walking_professor::TITLE, walking_professor::setup),
        (walking_professor::FIXED_TITLE, walking_professor::setup_fixed),
        (professor_chase::TITLE, professor_chase::setup),
    ];
    for (title, setup) in labs {
        let mut root = headless(title, *setup);
        run_frames(&mut root, 30);
        root.inject(InputEvent::KeyPressed(KeyCode::Escape));
        assert!(!root.step(1.0 / 60.0).unwrap(), "{} ignored escape", title);
    }
}

#[test]
fn light_lab_stops_on_escape_release() {
    let mut root = headless(light::TITLE, light::setup);
    run_frames(&mut root, 10);
    root.inject(InputEvent::KeyPressed(KeyCode::Escape));
    assert!(root.step(1.0 / 60.0).unwrap());
    root.inject(InputEvent::KeyReleased(KeyCode::Escape));
    assert!(!root.step(1.0 / 60.0).unwrap());
}

#[test]
fn game_framework_quits_from_the_title() {
    let mut root = headless(game_framework::TITLE, game_framework::setup);
    run_frames(&mut root, 5);
    root.inject(InputEvent::KeyPressed(KeyCode::Return));
    root.inject(InputEvent::KeyReleased(KeyCode::Return));
    run_frames(&mut root, 5);
    assert!(root.scene().has_scene_node("CameraHolder"));

    root.inject(InputEvent::KeyPressed(KeyCode::Escape));
    root.inject(InputEvent::KeyReleased(KeyCode::Escape));
    assert!(root.step(1.0 / 60.0).unwrap());
    root.inject(InputEvent::KeyPressed(KeyCode::Escape));
    root.inject(InputEvent::KeyReleased(KeyCode::Escape));
    assert!(!root.step(1.0 / 60.0).unwrap());
}

#[test]
fn rendering_without_a_viewport_is_refused() {
    let mut root = Root::new(Config::default());
    root.create_window(render_window::TITLE);
    assert!(root.start_rendering().is_err());
}
