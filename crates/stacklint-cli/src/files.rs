// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::config::Config;

pub const SOURCE_EXTENSION: &str = "cs";

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("no such file or directory: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read directory {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Expand `paths` into the C# files to check.
///
/// Files named on the command line are always kept. Directories are searched
/// recursively for `.cs` files, skipping anything the config excludes.
/// The result is sorted and free of duplicates.
pub fn collect_sources(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>, CollectError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            walk(path, config, &mut files)?;
        } else {
            return Err(CollectError::NotFound(path.clone()));
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

fn walk(dir: &Path, config: &Config, files: &mut Vec<PathBuf>) -> Result<(), CollectError> {
    let io_err = |source| CollectError::Io { path: dir.to_path_buf(), source };
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if config.is_excluded(&path) {
            debug!(path = %path.display(), "excluded by config");
            continue;
        }
        if path.is_dir() {
            walk(&path, config, files)?;
        } else if path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
            files.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "class C { }").unwrap();
    }

    #[test]
    fn walks_directories_for_cs_files() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("b.cs"));
        touch(&tmp.path().join("src/a.cs"));
        touch(&tmp.path().join("src/notes.txt"));

        let files = collect_sources(&[tmp.path().to_path_buf()], &Config::default()).unwrap();
        assert_eq!(files, vec![tmp.path().join("b.cs"), tmp.path().join("src/a.cs")]);
    }

    #[test]
    fn config_excludes_directories() {
        let tmp = tempfile::tempdir().unwrap();
        touch(&tmp.path().join("src/a.cs"));
        touch(&tmp.path().join("generated/big.cs"));

        let config = Config::parse("[files]\nexclude = [\"generated\"]\n", Path::new("stacklint.toml")).unwrap();
        let files = collect_sources(&[tmp.path().to_path_buf()], &config).unwrap();
        assert_eq!(files, vec![tmp.path().join("src/a.cs")]);
    }

    #[test]
    fn explicit_files_kept_and_deduplicated() {
        let tmp = tempfile::tempdir().unwrap();
        let script = tmp.path().join("script.csx");
        touch(&script);

        let files = collect_sources(&[script.clone(), script.clone()], &Config::default()).unwrap();
        assert_eq!(files, vec![script]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let err = collect_sources(&[tmp.path().join("missing")], &Config::default()).unwrap_err();
        assert!(matches!(err, CollectError::NotFound(_)));
    }
}
