mod cli;
mod config;
mod earnings;
mod model;
mod store;
mod sync;
mod timeline;

use std::process;

use config::Config;
use store::StateStore;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let root = StateStore::default_root().unwrap_or_else(|| {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    });

    let config = match Config::load(&root) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let store = match StateStore::new(root) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize the shift store: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, &store) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
