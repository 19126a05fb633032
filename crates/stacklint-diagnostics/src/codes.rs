// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Code registries.
//!
//! Error codes (E0001, E0100, ...) cover lexer and parser failures; rule
//! ids cover analyzer findings. Both are used by `stacklint explain` and
//! to categorize JSON output.

use std::collections::HashMap;
use std::fmt;

use stacklint_analyzer::rules::{self, RuleDescriptor};

use crate::suggestions::did_you_mean;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Performance,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "Syntax"),
            ErrorCategory::Performance => write!(f, "Performance"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                // Lexer errors (E00xx)
                "E0001" => ("unexpected character", Syntax),
                "E0002" => ("unterminated string literal", Syntax),
                "E0003" => ("invalid escape sequence", Syntax),
                "E0004" => ("invalid number literal", Syntax),

                // Parser errors (E01xx)
                "E0100" => ("unexpected token", Syntax),
                "E0101" => ("expected token not found", Syntax),
                "E0102" => ("unsupported syntax", Syntax),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn get(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn all(&self) -> impl Iterator<Item = &ErrorCodeInfo> {
        self.codes.values()
    }

    /// Category of an error code or rule id.
    pub fn category_of(&self, code: &str) -> Option<ErrorCategory> {
        if let Some(info) = self.get(code) {
            return Some(info.category);
        }
        rules::find(code).map(|rule| match rule.category {
            "performance" => ErrorCategory::Performance,
            _ => ErrorCategory::Syntax,
        })
    }
}

/// Analyzer rules by id, for `stacklint explain`.
pub struct RuleRegistry {
    rules: &'static [RuleDescriptor],
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self { rules: rules::all_rules() }
    }
}

impl RuleRegistry {
    pub fn get(&self, id: &str) -> Option<&'static RuleDescriptor> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn all(&self) -> impl Iterator<Item = &'static RuleDescriptor> {
        self.rules.iter()
    }

    /// "did you mean ..." for an unknown id.
    pub fn suggest(&self, id: &str) -> Option<String> {
        did_you_mean(id, self.rules.iter().map(|r| r.id))
    }

    /// Long-form explanation of a rule.
    pub fn explain(&self, id: &str) -> Option<String> {
        let rule = self.get(id)?;
        let mut out = format!("{}: {}\n\n", rule.id, rule.title);
        out.push_str(&format!("category: {}\n", rule.category));
        out.push_str(&format!("default severity: {:?}\n\n", rule.default_severity).to_lowercase());
        out.push_str(rule.description);
        out.push_str("\n\nfix: ");
        out.push_str(rule.fix);
        out.push_str("\n\nexample:\n");
        for line in rule.example.lines() {
            out.push_str("    ");
            out.push_str(line.trim_start());
            out.push('\n');
        }
        Some(out)
    }
}
