//! Policy directory loading.
//!
//! Walks a directory tree, parses every file whose name ends with the
//! configured suffix and collects the results. A bad file never stops the
//! walk; its failure is recorded and reported alongside the parsed policies.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::model::Policy;
use crate::parser::{ParseError, parse_policy};

/// Default policy file suffix.
pub const DEFAULT_SUFFIX: &str = ".policy";

// =============================================================================
// Errors
// =============================================================================

/// Errors produced while loading a policy directory.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The root directory could not be read.
    #[error("Failed to read policy directory {}: {source}", .path.display())]
    Io {
        /// Root directory.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// One or more policy files failed to load.
    #[error("{} policy file(s) failed to load: {}", .0.len(), join_failures(.0))]
    Files(Vec<FileFailure>),
}

/// Why a single file failed to load.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// The file (or a directory entry) could not be read.
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not a valid policy document.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A file that failed to load.
#[derive(Debug)]
pub struct FileFailure {
    /// Path of the file.
    pub path: PathBuf,
    /// What went wrong.
    pub error: FileError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

fn join_failures(failures: &[FileFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

// =============================================================================
// Loaded Policies
// =============================================================================

/// Result of loading a directory.
#[derive(Debug, Default)]
pub struct LoadedPolicies {
    /// Parsed policies paired with the file they came from, in walk order.
    pub policies: Vec<(PathBuf, Policy)>,
    /// Files that failed to load, in walk order.
    pub failures: Vec<FileFailure>,
}

impl LoadedPolicies {
    /// The aggregated failure error, if any file failed.
    pub fn error(&mut self) -> Option<LoaderError> {
        if self.failures.is_empty() {
            None
        } else {
            Some(LoaderError::Files(std::mem::take(&mut self.failures)))
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Load every policy file under `dir` whose name ends with `suffix`.
///
/// The walk is recursive and sorted by file name. An empty `suffix` selects
/// every file.
///
/// # Errors
///
/// Returns [`LoaderError::Io`] if `dir` does not exist or is not a directory.
/// Per-file failures are reported through [`LoadedPolicies::failures`].
pub fn load_all(dir: impl AsRef<Path>, suffix: &str) -> Result<LoadedPolicies, LoaderError> {
    let dir = dir.as_ref();
    let metadata = std::fs::metadata(dir).map_err(|source| LoaderError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    if !metadata.is_dir() {
        return Err(LoaderError::Io {
            path: dir.to_path_buf(),
            source: std::io::Error::other("not a directory"),
        });
    }

    let mut loaded = LoadedPolicies::default();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let path = err
                    .path()
                    .map_or_else(|| dir.to_path_buf(), Path::to_path_buf);
                warn!(path = %path.display(), error = %err, "Skipping unreadable entry");
                loaded.failures.push(FileFailure {
                    path,
                    error: FileError::Read(err.into()),
                });
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_suffix(entry.path(), suffix) {
            continue;
        }

        let path = entry.into_path();
        match load_file(&path) {
            Ok(policy) => {
                debug!(path = %path.display(), policy_id = %policy.id(), "Loaded policy");
                loaded.policies.push((path, policy));
            }
            Err(error) => {
                warn!(path = %path.display(), error = %error, "Failed to load policy file");
                loaded.failures.push(FileFailure { path, error });
            }
        }
    }

    info!(
        dir = %dir.display(),
        loaded = loaded.policies.len(),
        failed = loaded.failures.len(),
        "Policy directory loaded"
    );
    Ok(loaded)
}

/// Read and parse one policy file.
///
/// # Errors
///
/// Returns [`FileError`] if the file cannot be read or parsed.
pub fn load_file(path: impl AsRef<Path>) -> Result<Policy, FileError> {
    let text = std::fs::read_to_string(path)?;
    Ok(parse_policy(&text)?)
}

fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_suffix() {
        assert!(has_suffix(Path::new("/a/b/crm.policy"), ".policy"));
        assert!(!has_suffix(Path::new("/a/b/crm.policy.bak"), ".policy"));
        assert!(has_suffix(Path::new("/a/b/anything"), ""));
    }

    #[test]
    fn test_missing_dir_is_io_error() {
        let err = load_all("/definitely/not/here", DEFAULT_SUFFIX).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
        assert!(err.to_string().contains("/definitely/not/here"));
    }

    #[test]
    fn test_files_error_lists_every_failure() {
        let err = LoaderError::Files(vec![
            FileFailure {
                path: PathBuf::from("a.policy"),
                error: FileError::Parse(ParseError::MissingRoot),
            },
            FileFailure {
                path: PathBuf::from("b.policy"),
                error: FileError::Read(std::io::Error::other("denied")),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 policy file(s)"));
        assert!(msg.contains("a.policy"));
        assert!(msg.contains("b.policy: read failed: denied"));
    }

    #[test]
    fn test_error_drains_failures() {
        let mut loaded = LoadedPolicies {
            policies: Vec::new(),
            failures: vec![FileFailure {
                path: PathBuf::from("x.policy"),
                error: FileError::Parse(ParseError::MissingRoot),
            }],
        };
        assert!(matches!(loaded.error(), Some(LoaderError::Files(f)) if f.len() == 1));
        assert!(loaded.error().is_none());
    }
}
