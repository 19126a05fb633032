// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Command-line arguments.
//!
//! Kept apart from `main` so tests can drive [`Cli::try_parse_from`].

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// stacklint: find small heap arrays that could live on the stack.
#[derive(Parser, Debug)]
#[command(name = "stacklint", version)]
#[command(about = "Find small, non-escaping C# arrays that could use stackalloc", long_about = None)]
#[command(after_help = "\
CONFIGURATION:
  stacklint looks for stacklint.toml in the current directory and its
  parents. CLI flags override values from the file.

LOGGING:
  Set STACKLINT_LOG (e.g. STACKLINT_LOG=stacklint_analyzer=debug) or use -v.")]
pub struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Shorthand for -vv.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use this config file instead of searching for stacklint.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze C# files and report stack allocation candidates.
    Check(CheckArgs),
    /// Describe a rule or error code.
    Explain {
        /// Rule id (e.g. perf/small-array-on-stack) or error code (e.g. E0101).
        code: String,
    },
    /// Print the tokens of a file.
    Lex {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },
    /// Print the syntax tree of a file.
    Parse {
        file: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Human)]
        format: Format,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Files or directories; directories are searched for .cs files.
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t = Format::Human)]
    pub format: Format,

    /// Treat unsafe code as allowed.
    #[arg(long = "unsafe", conflicts_with = "no_unsafe")]
    pub allow_unsafe: bool,

    /// Treat unsafe code as disallowed, overriding the config file.
    #[arg(long = "no-unsafe")]
    pub no_unsafe: bool,

    /// Only run rules matching these patterns (e.g. perf/*).
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<String>,

    /// Skip rules matching these patterns.
    #[arg(long, value_delimiter = ',')]
    pub exclude: Vec<String>,

    /// Exit 0 even when files fail to parse.
    #[arg(long)]
    pub exit_zero: bool,

    /// Exit 1 when any warning is reported.
    #[arg(long)]
    pub deny_warnings: bool,
}

impl CheckArgs {
    /// The `--unsafe`/`--no-unsafe` override, if either was given.
    pub fn unsafe_override(&self) -> Option<bool> {
        match (self.allow_unsafe, self.no_unsafe) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Human,
    Json,
}

impl Cli {
    /// Default log filter from the verbosity flags.
    pub fn log_filter(&self) -> &'static str {
        let level = if self.debug { self.verbose.max(2) } else { self.verbose };
        match level {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
