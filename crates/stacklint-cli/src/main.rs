// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! stacklint command-line entry point.

use std::process;

use clap::Parser;
use stacklint_cli::{dispatch, load_config, output, Cli};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    output::init();

    let filter = EnvFilter::try_from_env("STACKLINT_LOG").unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cwd = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            process::exit(1);
        }
    };

    let config = match load_config(cli.config.as_deref(), &cwd) {
        Ok((config, path)) => {
            match path {
                Some(path) => debug!(path = %path.display(), "loaded config"),
                None => debug!("no config file found, using defaults"),
            }
            config
        }
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            process::exit(1);
        }
    };

    process::exit(dispatch(&cli, &config));
}
