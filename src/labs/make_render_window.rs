extern crate butai;

use butai::labs::render_window;

fn main() {
    if let Err(e) = butai::labs::run("make_render_window", render_window::TITLE, render_window::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
