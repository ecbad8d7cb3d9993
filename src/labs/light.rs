extern crate butai;

use butai::labs::light;

fn main() {
    if let Err(e) = butai::labs::run("light", light::TITLE, light::setup) {
        eprintln!("An exception has occured: {}", e);
    }
}
