extern crate butai;

use butai::labs::professor_ninja;

fn main() {
    if let Err(e) = butai::labs::run("professor_ninja", professor_ninja::TITLE, professor_ninja::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
