// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `stacklint explain`: describe a rule or error code.

use colored::Colorize;
use stacklint_diagnostics::{ErrorCodeRegistry, RuleRegistry};

use crate::output;

/// Explanation text for a rule id or error code.
pub fn explain(code: &str) -> Option<String> {
    if let Some(text) = RuleRegistry::default().explain(code) {
        return Some(text);
    }

    let registry = ErrorCodeRegistry::default();
    let info = registry.get(code)?;
    Some(format!(
        "{}: {}\ncategory: {}\n\nRun `stacklint check <file>` to see this error in context.",
        info.code, info.title, info.category
    ))
}

pub fn cmd_explain(code: &str) -> i32 {
    match explain(code) {
        Some(text) => {
            let mut lines = text.lines();
            if let Some(first) = lines.next() {
                println!("{}", first.bold());
            }
            for line in lines {
                println!("{}", line);
            }
            0
        }
        None => {
            eprintln!("{}: unknown rule or error code `{}`", output::error_label(), code);
            if let Some(suggestion) = RuleRegistry::default().suggest(code) {
                eprintln!("{}: {}", output::hint_label(), suggestion);
            } else {
                eprintln!();
                eprintln!("Error codes use the format E0NNN (e.g., E0101).");
                eprintln!("Rule ids look like perf/small-array-on-stack.");
            }
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explains_rule() {
        let text = explain("perf/small-array-on-stack").unwrap();
        assert!(text.starts_with("perf/small-array-on-stack: "));
        assert!(text.contains("stackalloc"));
    }

    #[test]
    fn explains_error_code() {
        let text = explain("E0101").unwrap();
        assert!(text.starts_with("E0101: "));
        assert!(text.contains("category: Syntax"));
    }

    #[test]
    fn unknown_code() {
        assert!(explain("E9999").is_none());
        assert_eq!(cmd_explain("perf/small-aray-on-stack"), 1);
    }
}
