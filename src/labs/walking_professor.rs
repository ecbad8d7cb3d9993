extern crate butai;

use butai::labs::walking_professor;

fn main() {
    if let Err(e) = butai::labs::run("walking_professor", walking_professor::TITLE, walking_professor::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
