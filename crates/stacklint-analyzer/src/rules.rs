// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rule descriptors and selection.

use crate::types::{AnalyzeOpts, Severity};

/// Static description of a rule.
#[derive(Debug, Clone, Copy)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub category: &'static str,
    pub default_severity: Severity,
    pub description: &'static str,
    pub fix: &'static str,
    pub example: &'static str,
}

/// Small, non-escaping array allocations.
pub const RULE: RuleDescriptor = RuleDescriptor {
    id: "perf/small-array-on-stack",
    title: "Small array can be allocated on the stack",
    category: "performance",
    default_severity: Severity::Warning,
    description: "An array of at most 1024 bytes whose size is known at compile time, \
                  created in a synchronous method outside any loop and never returned, \
                  passed to a call or constructor, or assigned elsewhere, can be \
                  allocated with `stackalloc` instead of on the heap.",
    fix: "use `stackalloc` and a `Span<T>` (requires unsafe code to be allowed)",
    example: "byte[] buffer = new byte[16];   // before\n\
              Span<byte> buffer = stackalloc byte[16];   // after",
};

/// All registered rules.
pub fn all_rules() -> &'static [RuleDescriptor] {
    &[RULE]
}

/// Look a rule up by id.
pub fn find(id: &str) -> Option<&'static RuleDescriptor> {
    all_rules().iter().find(|r| r.id == id)
}

/// The message for a finding on `allocation`.
pub fn message(allocation: &str) -> String {
    format!("Array '{}' can be allocated on the stack", allocation)
}

/// Severity for a rule after applying overrides.
pub fn severity_for(rule: &RuleDescriptor, opts: &AnalyzeOpts) -> Severity {
    opts.severity.get(rule.id).copied().unwrap_or(rule.default_severity)
}

/// Check if a rule should run based on include/exclude filters.
pub fn should_run(rule_id: &str, opts: &AnalyzeOpts) -> bool {
    // Exclude takes priority
    if opts.excludes.iter().any(|p| matches_rule(rule_id, p)) {
        return false;
    }

    // If no include filters, run all
    opts.rules.is_empty() || opts.rules.iter().any(|p| matches_rule(rule_id, p))
}

/// Match a rule ID against a pattern.
/// Supports: exact match, "category/*" for all rules in a category.
pub fn matches_rule(rule_id: &str, pattern: &str) -> bool {
    if pattern == rule_id {
        return true;
    }

    // "perf/*" matches "perf/small-array-on-stack"
    if let Some(prefix) = pattern.strip_suffix("/*") {
        if let Some(rule_prefix) = rule_id.split('/').next() {
            return rule_prefix == prefix;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pattern_matching() {
        assert!(matches_rule("perf/small-array-on-stack", "perf/small-array-on-stack"));
        assert!(matches_rule("perf/small-array-on-stack", "perf/*"));
        assert!(!matches_rule("perf/small-array-on-stack", "style/*"));
        assert!(!matches_rule("perf/small-array-on-stack", "perf"));
    }

    #[test]
    fn excludes_win_over_includes() {
        let opts = AnalyzeOpts {
            rules: vec!["perf/*".into()],
            excludes: vec![RULE.id.into()],
            ..Default::default()
        };
        assert!(!should_run(RULE.id, &opts));
        assert!(should_run(RULE.id, &AnalyzeOpts::default()));
    }

    #[test]
    fn severity_override() {
        let mut opts = AnalyzeOpts::default();
        assert_eq!(severity_for(&RULE, &opts), Severity::Warning);
        opts.severity.insert(RULE.id.into(), Severity::Note);
        assert_eq!(severity_for(&RULE, &opts), Severity::Note);
    }

    #[test]
    fn message_format() {
        assert_eq!(message("new byte[1]"), "Array 'new byte[1]' can be allocated on the stack");
    }
}
