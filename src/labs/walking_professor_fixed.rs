extern crate butai;

use butai::labs::walking_professor;

fn main() {
    let result = butai::labs::run(
        "walking_professor_fixed",
        walking_professor::FIXED_TITLE,
        walking_professor::setup_fixed,
    );
    if let Err(e) = result {
        eprintln!("An exception has occured: {}", e);
    }
}
