// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal styling for CLI output.
//!
//! Respects NO_COLOR and FORCE_COLOR. Colors are disabled when output is piped.

use colored::{ColoredString, Colorize};

/// Initialize color support based on environment. Call once at startup.
pub fn init() {
    if std::env::var("NO_COLOR").is_ok() {
        colored::control::set_override(false);
    } else if std::env::var("FORCE_COLOR").is_ok() {
        colored::control::set_override(true);
    }
}

// === Error Output ===

pub fn error_label() -> ColoredString {
    "error".red().bold()
}

pub fn hint_label() -> ColoredString {
    "hint".cyan()
}

// === Status Output ===

pub fn banner_ok(phase: &str) -> String {
    format!(
        "{} {} {}",
        "===".dimmed(),
        format!("{} OK", phase).green().bold(),
        "===".dimmed()
    )
}

pub fn banner_fail(phase: &str, count: usize) -> String {
    let msg = if count == 1 {
        format!("{} FAILED: 1 error", phase)
    } else {
        format!("{} FAILED: {} errors", phase, count)
    };
    format!("{} {} {}", "===".dimmed(), msg.red().bold(), "===".dimmed())
}

pub fn file_path(path: &str) -> ColoredString {
    path.underline()
}

// === Check Summary ===

pub fn finding_count(n: usize) -> ColoredString {
    let text = plural(n, "candidate", "candidates");
    if n > 0 {
        text.yellow()
    } else {
        text.normal()
    }
}

pub fn error_count(n: usize) -> ColoredString {
    let text = plural(n, "error", "errors");
    if n > 0 {
        text.red()
    } else {
        text.normal()
    }
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("1 {}", one)
    } else {
        format!("{} {}", n, many)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_pluralize() {
        colored::control::set_override(false);
        assert_eq!(finding_count(1).to_string(), "1 candidate");
        assert_eq!(finding_count(3).to_string(), "3 candidates");
        assert_eq!(error_count(0).to_string(), "0 errors");
    }
}
