use std::env;
use std::process;

use houseview::{run, ViewerOptions};

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, name: &str, default: T) -> T {
    match args.get(index) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparseable {} argument {:?}", name, raw);
            default
        }),
        None => default,
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let defaults = ViewerOptions::default();
    let opts = ViewerOptions {
        width: parse_arg(&args, 1, "width", defaults.width),
        height: parse_arg(&args, 2, "height", defaults.height),
        // Accepted for command-line compatibility; nothing consumes it.
        step_size: parse_arg(&args, 3, "step size", defaults.step_size),
    };

    if let Err(err) = pollster::block_on(run(opts)) {
        log::error!("{:#}", err);
        eprintln!("{:#}", err);
        process::exit(-1);
    }
}
