//! # warden-policy
//!
//! Declarative authorization policy engine.
//!
//! Policies are written in a small tag-based document format, bound to route
//! templates and selected per request by a structural JSON pattern. For each
//! request the engine resolves every matching policy into one verdict: a
//! forced response, a redirect, or a merged set of granted rights.
//!
//! ## Modules
//!
//! - [`lexer`] - Tokenizer for policy documents
//! - [`parser`] - Policy document parser
//! - [`model`] - Policy, request and verdict types
//! - [`pattern`] - Structural JSON pattern compilation and matching
//! - [`index`] - Concurrently readable per-route pattern index
//! - [`resolve`] - Conflict resolution across matched policies
//! - [`manager`] - Registration and evaluation
//! - [`loader`] - Policy directory loading
//! - [`config`] - Engine configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod index;
pub mod lexer;
pub mod loader;
pub mod manager;
pub mod model;
pub mod parser;
pub mod pattern;
pub mod resolve;

pub use config::{ConfigError, EngineConfig, LoggingConfig};
pub use error::{ErrorCategory, PolicyError, PolicyResult};
pub use index::PatternIndex;
pub use loader::{DEFAULT_SUFFIX, FileError, FileFailure, LoadedPolicies, LoaderError, load_all};
pub use manager::{LoadReport, ManagerConfig, ManagerStats, POLICY_LOG_TARGET, PolicyManager};
pub use model::{
    ContextRequest, ForcedResponse, HttpRequest, LogDirective, Manifest, Policy, PolicyLogging,
    PolicyRights, ResponseType, RightResponse, RightsRequest, UserRightRequest,
};
pub use parser::{ParseError, parse_policy};
pub use pattern::{Pattern, PatternError};
pub use resolve::resolve;
