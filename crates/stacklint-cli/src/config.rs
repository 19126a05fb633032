// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! `stacklint.toml` loading.
//!
//! ```toml
//! [compilation]
//! allow_unsafe = true
//!
//! [rules]
//! exclude = ["perf/small-array-on-stack"]
//!
//! [rules.severity]
//! "perf/small-array-on-stack" = "note"
//!
//! [files]
//! exclude = ["generated"]
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use stacklint_analyzer::rules;
use stacklint_analyzer::{AnalyzeOpts, Severity};
use thiserror::Error;

pub const CONFIG_FILE_NAME: &str = "stacklint.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown rule `{0}` in config")]
    UnknownRule(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub compilation: CompilationConfig,
    #[serde(default)]
    pub rules: RulesConfig,
    #[serde(default)]
    pub files: FilesConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompilationConfig {
    /// Unset means the compiler default (unsafe code not allowed).
    pub allow_unsafe: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RulesConfig {
    /// Only run rules matching these patterns.
    #[serde(default)]
    pub select: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub severity: HashMap<String, Severity>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilesConfig {
    /// Path components (directory or file names) to skip.
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl Config {
    pub fn parse(s: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Every rule pattern must name a known rule or category.
    fn validate(&self) -> Result<(), ConfigError> {
        let patterns = self
            .rules
            .select
            .iter()
            .chain(&self.rules.exclude)
            .chain(self.rules.severity.keys());
        patterns.map(String::as_str).try_for_each(check_rule_pattern)
    }

    /// Analysis options from the file, before CLI overrides.
    pub fn analyze_opts(&self) -> AnalyzeOpts {
        let mut opts = AnalyzeOpts {
            rules: self.rules.select.clone(),
            excludes: self.rules.exclude.clone(),
            severity: self.rules.severity.clone(),
            ..Default::default()
        };
        if let Some(allow) = self.compilation.allow_unsafe {
            opts.compilation.allow_unsafe = allow;
        }
        opts
    }

    /// Whether `path` falls under a `[files] exclude` entry.
    pub fn is_excluded(&self, path: &Path) -> bool {
        path.components().any(|c| {
            let c = c.as_os_str();
            self.files.exclude.iter().any(|e| c == e.as_str())
        })
    }
}

/// Fails unless `pattern` selects at least one known rule.
pub fn check_rule_pattern(pattern: &str) -> Result<(), ConfigError> {
    let known = rules::all_rules()
        .iter()
        .any(|r| rules::matches_rule(r.id, pattern));
    if known {
        Ok(())
    } else {
        Err(ConfigError::UnknownRule(pattern.to_string()))
    }
}

/// Find `stacklint.toml` in `start_dir` or the nearest parent that has one.
pub fn discover_config(start_dir: &Path) -> Option<PathBuf> {
    start_dir
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

/// Load the config at `explicit`, or the discovered one, or the default.
pub fn load_config(explicit: Option<&Path>, start_dir: &Path) -> Result<(Config, Option<PathBuf>), ConfigError> {
    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => discover_config(start_dir),
    };
    match path {
        Some(path) => Ok((Config::load(&path)?, Some(path))),
        None => Ok((Config::default(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Result<Config, ConfigError> {
        Config::parse(s, Path::new(CONFIG_FILE_NAME))
    }

    #[test]
    fn empty_config_is_default() {
        let config = parse("").unwrap();
        let opts = config.analyze_opts();
        assert!(!opts.compilation.allow_unsafe);
        assert!(opts.excludes.is_empty());
    }

    #[test]
    fn full_config() {
        let config = parse(
            r#"
[compilation]
allow_unsafe = true

[rules]
exclude = ["perf/*"]

[rules.severity]
"perf/small-array-on-stack" = "note"

[files]
exclude = ["generated"]
"#,
        )
        .unwrap();

        let opts = config.analyze_opts();
        assert!(opts.compilation.allow_unsafe);
        assert_eq!(opts.excludes, vec!["perf/*".to_string()]);
        assert_eq!(opts.severity.get("perf/small-array-on-stack"), Some(&Severity::Note));
        assert!(config.is_excluded(Path::new("src/generated/Big.cs")));
        assert!(!config.is_excluded(Path::new("src/Buffers.cs")));
    }

    #[test]
    fn unknown_key_rejected() {
        let err = parse("[compilation]\nallow_unsafe = true\noptimize = true\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("stacklint.toml"));
    }

    #[test]
    fn unknown_rule_rejected() {
        let err = parse("[rules]\nexclude = [\"style/naming\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule(ref r) if r == "style/naming"));
    }

    #[test]
    fn invalid_severity_rejected() {
        let err = parse("[rules.severity]\n\"perf/small-array-on-stack\" = \"fatal\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn discover_walks_up() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = tmp.path().join("src").join("core");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_config(&nested), Some(tmp.path().join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn explicit_path_wins() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let other = tmp.path().join("other.toml");
        std::fs::write(&other, "[compilation]\nallow_unsafe = true\n").unwrap();

        let (config, path) = load_config(Some(&other), tmp.path()).unwrap();
        assert_eq!(path, Some(other));
        assert_eq!(config.compilation.allow_unsafe, Some(true));
    }

    #[test]
    fn missing_explicit_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config(Some(&tmp.path().join("nope.toml")), tmp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
