//! Policy engine error types.
//!
//! Errors are grouped the way callers have to react to them: parse and
//! registration failures are local to one document or policy, evaluation
//! failures are local to one `apply` call and must be treated as a deny.

use std::fmt;

use crate::loader::LoaderError;
use crate::pattern::PatternError;

/// Errors that can occur while loading, registering or evaluating policies.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    /// A policy's match pattern could not be compiled.
    #[error("Invalid match pattern in policy '{policy_id}': {source}")]
    Pattern {
        /// ID of the offending policy.
        policy_id: String,
        /// Underlying pattern error.
        #[source]
        source: PatternError,
    },

    /// The request could not be serialized into a match event.
    #[error("Failed to serialize request: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Loading a policy directory failed.
    #[error(transparent)]
    Load(#[from] LoaderError),
}

impl PolicyError {
    /// Creates a new `Pattern` error.
    #[must_use]
    pub fn pattern(policy_id: impl Into<String>, source: PatternError) -> Self {
        Self::Pattern {
            policy_id: policy_id.into(),
            source,
        }
    }

    /// Returns the error category for logging and caller decisions.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Pattern { .. } => ErrorCategory::Registration,
            Self::Serialization(_) => ErrorCategory::Evaluation,
            Self::Load(LoaderError::Io { .. }) => ErrorCategory::Io,
            Self::Load(LoaderError::Files(_)) => ErrorCategory::Parse,
        }
    }

    /// Returns `true` if the error happened while answering a request.
    ///
    /// Evaluation errors must be treated as a denied authorization.
    #[must_use]
    pub fn is_evaluation_error(&self) -> bool {
        self.category() == ErrorCategory::Evaluation
    }
}

/// Category of a policy engine error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// One or more policy files are unreadable or malformed.
    Parse,
    /// Policy could not be registered (malformed match pattern).
    Registration,
    /// Request evaluation failed.
    Evaluation,
    /// The policy directory itself could not be read.
    Io,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse => write!(f, "parse"),
            Self::Registration => write!(f, "registration"),
            Self::Evaluation => write!(f, "evaluation"),
            Self::Io => write!(f, "io"),
        }
    }
}

/// Type alias for policy engine results.
pub type PolicyResult<T> = Result<T, PolicyError>;

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::loader::{FileError, FileFailure};
    use crate::parser::ParseError;

    #[test]
    fn test_file_failures_are_parse_errors() {
        let err = PolicyError::from(LoaderError::Files(vec![FileFailure {
            path: PathBuf::from("/etc/warden/crm.policy"),
            error: FileError::Parse(ParseError::UnexpectedEof {
                section: "manifest".to_string(),
            }),
        }]));
        let msg = err.to_string();
        assert!(msg.contains("/etc/warden/crm.policy"));
        assert!(msg.contains("unexpected eof, manifest not closed"));
        assert_eq!(err.category(), ErrorCategory::Parse);
        assert!(!err.is_evaluation_error());
    }

    #[test]
    fn test_unreadable_directory_is_io_error() {
        let err = PolicyError::from(LoaderError::Io {
            path: PathBuf::from("/etc/warden"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(err.category(), ErrorCategory::Io);
        assert_eq!(err.category().to_string(), "io");
        assert!(err.to_string().contains("/etc/warden"));
    }

    #[test]
    fn test_serialization_is_evaluation_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = PolicyError::from(json_err);
        assert!(err.is_evaluation_error());
        assert_eq!(err.category().to_string(), "evaluation");
    }

    #[test]
    fn test_pattern_error_is_registration() {
        let err = PolicyError::pattern("p1", PatternError::RootNotObject);
        assert_eq!(err.category(), ErrorCategory::Registration);
        assert!(err.to_string().contains("'p1'"));
    }
}
