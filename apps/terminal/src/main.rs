//! # Depot Terminal Entry Point
//!
//! ## Usage
//! ```bash
//! depot                          # platform config dir, then DEPOT_* env
//! depot --config ./depot.toml    # explicit config file
//! ```
//!
//! Fatal startup errors (unreadable config, database unavailable, catalog
//! record missing an amount) are printed to stderr and exit non-zero.

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Depot POS Terminal");
                println!();
                println!("Usage: depot [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Configuration file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return ExitCode::SUCCESS;
            }
            other => {
                eprintln!("depot: unknown argument '{}'", other);
                return ExitCode::FAILURE;
            }
        }
        i += 1;
    }

    match depot_terminal::run(config_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("depot: {}", e);
            ExitCode::FAILURE
        }
    }
}
