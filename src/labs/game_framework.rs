extern crate butai;

use butai::labs::game_framework;

fn main() {
    if let Err(e) = butai::labs::run("game_framework", game_framework::TITLE, game_framework::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
