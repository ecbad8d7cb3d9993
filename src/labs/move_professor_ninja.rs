extern crate butai;

use butai::labs::move_professor_ninja;

fn main() {
    if let Err(e) = butai::labs::run("move_professor_ninja", move_professor_ninja::TITLE, move_professor_ninja::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
