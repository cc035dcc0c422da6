//! `hoverpick [OPTIONS.toml]`: open the picking demo window.

use std::path::Path;

use hoverpick::{options::Options, HoverPickError, Viewer};

fn run() -> Result<(), HoverPickError> {
    let options = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("loading options from {path}");
            Options::load(Path::new(&path))?
        }
        None => Options::default(),
    };
    Viewer::builder().with_options(options).build().run()
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
