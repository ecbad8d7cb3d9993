extern crate butai;

use butai::labs::professor_chase;

fn main() {
    if let Err(e) = butai::labs::run("professor_chase", professor_chase::TITLE, professor_chase::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
