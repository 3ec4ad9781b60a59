//! Star Wireframe
//!
//! Usage: `star-wireframe [config.json]`
//!
//! Without an argument the built-in defaults are used. Set `RUST_LOG=debug`
//! to see frame rate and line counts.

use std::env;
use std::process;

use star_wireframe::StarfieldConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match env::args().nth(1) {
        Some(path) => match StarfieldConfig::load(&path) {
            Ok(config) => {
                log::info!("Loaded config from {}", path);
                config
            }
            Err(e) => {
                log::error!("{}: {}", path, e);
                process::exit(1);
            }
        },
        None => StarfieldConfig::default(),
    };

    if let Err(e) = star_wireframe::run(config) {
        log::error!("{}", e);
        process::exit(1);
    }
}
