// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `stacklint check`: analyze files and report stack allocation candidates.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use colored::Colorize;
use rayon::prelude::*;
use stacklint_analyzer::{analyze_source, AnalysisReport, AnalyzeOpts};
use stacklint_diagnostics::{to_json_report, Diagnostic, DiagnosticFormatter, DiagnosticReport, ToDiagnostic};
use thiserror::Error;
use tracing::{debug, info};

use crate::cli::{CheckArgs, Format};
use crate::config::{check_rule_pattern, Config, ConfigError};
use crate::files::{collect_sources, CollectError};
use crate::output;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("no .cs files found")]
    NoSources,
}

/// One analyzed file.
#[derive(Debug)]
pub struct CheckedFile {
    pub path: PathBuf,
    pub source: String,
    pub report: AnalysisReport,
}

impl CheckedFile {
    pub fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    /// Lex errors, parse errors, then findings.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        let report = &self.report;
        report
            .lex_errors
            .iter()
            .map(|e| e.to_diagnostic())
            .chain(report.parse_errors.iter().map(|e| e.to_diagnostic()))
            .chain(report.diagnostics.iter().map(|d| d.to_diagnostic()))
            .collect()
    }
}

/// A file that could not be read.
#[derive(Debug)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub error: io::Error,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub candidates: usize,
    pub warnings: usize,
    /// Unreadable files plus lex and parse errors.
    pub errors: usize,
}

impl Summary {
    pub fn of(checked: &[CheckedFile], failures: &[ReadFailure]) -> Self {
        Summary {
            files: checked.len() + failures.len(),
            candidates: checked.iter().map(|f| f.report.diagnostics.len()).sum(),
            warnings: checked.iter().map(|f| f.report.warning_count()).sum(),
            errors: failures.len() + checked.iter().map(|f| f.report.error_count()).sum::<usize>(),
        }
    }

    pub fn exit_code(&self, args: &CheckArgs) -> i32 {
        if self.errors > 0 && !args.exit_zero {
            1
        } else if self.warnings > 0 && args.deny_warnings {
            1
        } else {
            0
        }
    }
}

/// Analysis options: the config file first, then command-line overrides.
pub fn resolve_opts(args: &CheckArgs, config: &Config) -> Result<AnalyzeOpts, ConfigError> {
    for pattern in args.select.iter().chain(&args.exclude) {
        check_rule_pattern(pattern)?;
    }

    let mut opts = config.analyze_opts();
    if let Some(allow) = args.unsafe_override() {
        opts.compilation.allow_unsafe = allow;
    }
    if !args.select.is_empty() {
        opts.rules = args.select.clone();
    }
    opts.excludes.extend(args.exclude.iter().cloned());
    Ok(opts)
}

/// Read and analyze one file.
pub fn check_file(path: &Path, opts: &AnalyzeOpts) -> Result<CheckedFile, ReadFailure> {
    let source = fs::read_to_string(path).map_err(|error| ReadFailure {
        path: path.to_path_buf(),
        error,
    })?;
    let file = path.display().to_string();
    info!(file = %file, "checking");
    let report = analyze_source(&source, &file, opts);
    debug!(
        file = %file,
        candidates = report.diagnostics.len(),
        errors = report.error_count(),
        "checked"
    );
    Ok(CheckedFile { path: path.to_path_buf(), source, report })
}

/// Analyze files in parallel. Results keep the input order.
pub fn check_files(files: &[PathBuf], opts: &AnalyzeOpts) -> (Vec<CheckedFile>, Vec<ReadFailure>) {
    let results: Vec<_> = files.par_iter().map(|path| check_file(path, opts)).collect();

    let mut checked = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(file) => checked.push(file),
            Err(failure) => failures.push(failure),
        }
    }
    (checked, failures)
}

/// Resolve options, collect files and analyze them.
pub fn run(args: &CheckArgs, config: &Config) -> Result<(Vec<CheckedFile>, Vec<ReadFailure>), CheckError> {
    let opts = resolve_opts(args, config)?;
    if !opts.compilation.allow_unsafe {
        info!("unsafe code is not allowed; no candidates will be reported (use --unsafe)");
    }

    let files = collect_sources(&args.paths, config)?;
    if files.is_empty() {
        return Err(CheckError::NoSources);
    }
    info!(count = files.len(), "collected source files");
    Ok(check_files(&files, &opts))
}

/// JSON reports, one per analyzed file.
pub fn json_reports(checked: &[CheckedFile]) -> Vec<DiagnosticReport> {
    checked
        .iter()
        .map(|f| to_json_report(&f.diagnostics(), &f.source, &f.display_path()))
        .collect()
}

pub fn cmd_check(args: &CheckArgs, config: &Config) -> i32 {
    let (checked, failures) = match run(args, config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("{}: {}", output::error_label(), e);
            return 1;
        }
    };

    for failure in &failures {
        eprintln!(
            "{}: reading {}: {}",
            output::error_label(),
            output::file_path(&failure.path.display().to_string()),
            failure.error
        );
    }

    let summary = Summary::of(&checked, &failures);
    match args.format {
        Format::Human => print_human(&checked, &summary),
        Format::Json => {
            let reports = json_reports(&checked);
            match serde_json::to_string_pretty(&reports) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("{}: {}", output::error_label(), e);
                    return 1;
                }
            }
        }
    }

    summary.exit_code(args)
}

fn print_human(checked: &[CheckedFile], summary: &Summary) {
    for file in checked {
        let name = file.display_path();
        let formatter = DiagnosticFormatter::new(&file.source).with_file_name(&name);
        for diag in file.diagnostics() {
            eprintln!("{}", formatter.format(&diag));
        }
    }

    if summary.candidates == 0 && summary.errors == 0 {
        println!(
            "{} No stack allocation candidates in {} file(s)",
            "✓".green(),
            summary.files
        );
    } else {
        eprintln!(
            "{} {}, {} in {} file(s)",
            "✗".red(),
            output::finding_count(summary.candidates),
            output::error_count(summary.errors),
            summary.files
        );
    }
}
