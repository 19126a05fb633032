// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The `stacklint` command-line tool.

pub mod cli;
pub mod commands;
pub mod config;
pub mod files;
pub mod output;

pub use cli::{CheckArgs, Cli, Commands, Format};
pub use config::{load_config, Config, ConfigError};

/// Run a parsed command line against an already-loaded config.
pub fn dispatch(cli: &Cli, config: &Config) -> i32 {
    match &cli.command {
        Commands::Check(args) => commands::check::cmd_check(args, config),
        Commands::Explain { code } => commands::explain::cmd_explain(code),
        Commands::Lex { file, format } => commands::phase::cmd_lex(file, *format),
        Commands::Parse { file, format } => commands::phase::cmd_parse(file, *format),
    }
}
