//! Policy registration and evaluation.
//!
//! [`PolicyManager`] owns one [`PatternIndex`] per route. Registration
//! compiles a policy's match pattern once and inserts it into the index of
//! every route it lists; evaluation serializes the request, collects the
//! policies whose pattern matches and resolves them into a verdict.
//!
//! # Example
//!
//! ```
//! use warden_policy::{PolicyManager, RightsRequest, parse_policy};
//!
//! let policy = parse_policy(r#"
//!     <policy>
//!       <manifest><id>crm-read</id><priority>10</priority></manifest>
//!       <paths><path>/api/v1/crm/{id}</path></paths>
//!       <effects><allow>"crm:read"</allow></effects>
//!     </policy>
//! "#).unwrap();
//!
//! let manager = PolicyManager::new();
//! manager.add_policy(policy).unwrap();
//!
//! let verdict = manager.apply("/api/v1/crm/{id}", &RightsRequest::default()).unwrap();
//! assert!(verdict.has_right("crm:read"));
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{PolicyError, PolicyResult};
use crate::index::PatternIndex;
use crate::loader::{FileFailure, load_all};
use crate::model::{LogDirective, Policy, ResponseType, RightResponse, RightsRequest};
use crate::pattern::Pattern;
use crate::resolve::resolve;

/// Tracing target for policy log directives.
pub const POLICY_LOG_TARGET: &str = "warden::policy_log";

/// Manager behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagerConfig {
    /// Emit matched policies' log directives after each verdict.
    pub emit_policy_logs: bool,
    /// Skip bad files and policies in [`PolicyManager::load_directory`]
    /// instead of aborting.
    pub skip_invalid_policies: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            emit_policy_logs: false,
            skip_invalid_policies: true,
        }
    }
}

/// Registration counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStats {
    /// Routes with at least one registration.
    pub routes: usize,
    /// Route registrations (a policy on three routes counts three times).
    pub registrations: usize,
    /// Distinct policy IDs.
    pub policies: usize,
}

/// Outcome of [`PolicyManager::load_directory`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// IDs of the policies registered, in load order.
    pub registered: Vec<String>,
    /// Files that could not be read or parsed.
    pub file_failures: Vec<FileFailure>,
    /// Parsed policies that could not be registered.
    pub rejected: Vec<(PathBuf, PolicyError)>,
}

impl LoadReport {
    /// Returns `true` if nothing was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.file_failures.is_empty() && self.rejected.is_empty()
    }
}

/// Registers policies per route and answers authorization requests.
///
/// All operations take `&self` and are safe to call from many threads at
/// once; evaluation always sees a consistent snapshot of each route.
#[derive(Debug, Default)]
pub struct PolicyManager {
    routes: DashMap<String, Arc<PatternIndex<Policy>>>,
    config: ManagerConfig,
}

impl PolicyManager {
    /// Create an empty manager with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager with the given settings.
    #[must_use]
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            routes: DashMap::new(),
            config,
        }
    }

    /// The manager's settings.
    #[must_use]
    pub fn config(&self) -> ManagerConfig {
        self.config
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a policy on every route it lists.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Pattern`] if the match pattern does not compile.
    /// Nothing is registered in that case.
    pub fn add_policy(&self, policy: Policy) -> PolicyResult<()> {
        let pattern = compile(&policy)?;
        self.register(Arc::new(policy), Arc::new(pattern));
        Ok(())
    }

    /// Remove every registration of `id` across all routes.
    ///
    /// Returns the number of route registrations removed. Routes left empty
    /// are dropped.
    pub fn remove_policy(&self, id: &str) -> usize {
        let removed: usize = self
            .routes
            .iter()
            .map(|entry| entry.value().remove(id))
            .sum();
        if removed > 0 {
            self.routes.retain(|_, index| !index.is_empty());
            debug!(policy_id = %id, removed, "Policy removed");
        }
        removed
    }

    /// Replace every registration of the policy's ID with the given policy.
    ///
    /// Returns the number of route registrations removed. Requests evaluated
    /// between the removal and the new registration see neither version.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Pattern`] if the new match pattern does not
    /// compile. The existing registrations are kept in that case.
    pub fn replace_policy(&self, policy: Policy) -> PolicyResult<usize> {
        let pattern = compile(&policy)?;
        let removed = self.remove_policy(policy.id());
        self.register(Arc::new(policy), Arc::new(pattern));
        Ok(removed)
    }

    fn register(&self, policy: Arc<Policy>, pattern: Arc<Pattern>) {
        if policy.routes.is_empty() {
            warn!(policy_id = %policy.id(), "Policy has no routes and will never match");
            return;
        }
        if self.routes.iter().any(|entry| entry.value().contains(policy.id())) {
            warn!(policy_id = %policy.id(), "Duplicate policy ID registered");
        }

        for route in &policy.routes {
            // Insert under the entry guard so a concurrent `remove_policy`
            // cannot drop the index between lookup and insert.
            self.routes.entry(route.clone()).or_default().insert(
                policy.id(),
                Arc::clone(&pattern),
                Arc::clone(&policy),
            );
        }

        debug!(
            policy_id = %policy.id(),
            priority = policy.priority(),
            routes = policy.routes.len(),
            "Policy registered"
        );
    }

    /// Load a policy directory and register everything in it.
    ///
    /// With `skip_invalid_policies` set, unreadable files, parse failures and
    /// uncompilable patterns are logged and reported in the [`LoadReport`].
    /// Otherwise any failure aborts the load before a single policy is
    /// registered.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Load`] if the directory cannot be read, or (when
    /// not skipping) if any file failed; returns [`PolicyError::Pattern`] for
    /// the first uncompilable pattern when not skipping.
    pub fn load_directory(&self, dir: impl AsRef<Path>, suffix: &str) -> PolicyResult<LoadReport> {
        let mut loaded = load_all(dir, suffix)?;
        if !self.config.skip_invalid_policies {
            if let Some(err) = loaded.error() {
                return Err(err.into());
            }
        }

        let mut report = LoadReport {
            file_failures: std::mem::take(&mut loaded.failures),
            ..Default::default()
        };
        let mut compiled = Vec::with_capacity(loaded.policies.len());
        for (path, policy) in loaded.policies {
            match compile(&policy) {
                Ok(pattern) => compiled.push((policy, pattern)),
                Err(err) if self.config.skip_invalid_policies => {
                    warn!(path = %path.display(), error = %err, "Skipping policy");
                    report.rejected.push((path, err));
                }
                Err(err) => return Err(err),
            }
        }

        for (policy, pattern) in compiled {
            report.registered.push(policy.id().to_string());
            self.register(Arc::new(policy), Arc::new(pattern));
        }

        info!(
            registered = report.registered.len(),
            skipped = report.file_failures.len() + report.rejected.len(),
            routes = self.routes.len(),
            "Policies registered"
        );
        Ok(report)
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate a request against the policies registered on `route`.
    ///
    /// An unknown route, or a route where no policy matches, yields the
    /// neutral verdict.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyError::Serialization`] if the request cannot be
    /// serialized. Callers must treat any error as a denial.
    pub fn apply(&self, route: &str, request: &RightsRequest) -> PolicyResult<RightResponse> {
        let Some(index) = self.index(route) else {
            debug!(route, "No policies registered for route");
            return Ok(RightResponse::neutral());
        };
        let event = serde_json::to_value(request)?;
        Ok(self.evaluate(route, &index, &event))
    }

    /// Evaluate an already-serialized event against `route`.
    #[must_use]
    pub fn apply_event(&self, route: &str, event: &Value) -> RightResponse {
        match self.index(route) {
            Some(index) => self.evaluate(route, &index, event),
            None => {
                debug!(route, "No policies registered for route");
                RightResponse::neutral()
            }
        }
    }

    fn index(&self, route: &str) -> Option<Arc<PatternIndex<Policy>>> {
        self.routes.get(route).map(|entry| Arc::clone(entry.value()))
    }

    fn evaluate(&self, route: &str, index: &PatternIndex<Policy>, event: &Value) -> RightResponse {
        let matched = index.matches(event);
        let verdict = resolve(&matched);

        debug!(
            route,
            matched = matched.len(),
            verdict = verdict
                .response_type
                .map_or_else(|| "neutral".to_string(), |t| t.to_string()),
            "Request evaluated"
        );

        if self.config.emit_policy_logs {
            emit_policy_logs(route, &matched, &verdict);
        }
        verdict
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Registered routes, sorted.
    #[must_use]
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self.routes.iter().map(|e| e.key().clone()).collect();
        routes.sort();
        routes
    }

    /// Number of policies registered on `route`.
    #[must_use]
    pub fn policy_count(&self, route: &str) -> usize {
        self.routes.get(route).map_or(0, |entry| entry.value().len())
    }

    /// Returns `true` if at least one policy is registered on `route`.
    #[must_use]
    pub fn contains_route(&self, route: &str) -> bool {
        self.routes.contains_key(route)
    }

    /// Registration counters.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let mut ids = HashSet::new();
        let mut registrations = 0;
        for entry in &self.routes {
            let route_ids = entry.value().ids();
            registrations += route_ids.len();
            ids.extend(route_ids);
        }
        ManagerStats {
            routes: self.routes.len(),
            registrations,
            policies: ids.len(),
        }
    }
}

fn compile(policy: &Policy) -> PolicyResult<Pattern> {
    Pattern::parse(&policy.matches).map_err(|err| PolicyError::pattern(policy.id(), err))
}

/// Emit each matched policy's `on_any` directives, plus `on_permit` for a
/// rights verdict or `on_deny` for a forced response or redirect.
fn emit_policy_logs(route: &str, matched: &[Arc<Policy>], verdict: &RightResponse) {
    for policy in matched {
        let outcome: &[LogDirective] = match verdict.response_type {
            Some(ResponseType::Rights) => &policy.logging.on_permit,
            Some(ResponseType::Response | ResponseType::Redirect) => &policy.logging.on_deny,
            None => &[],
        };
        for directive in policy.logging.on_any.iter().chain(outcome) {
            tracing::info!(
                target: POLICY_LOG_TARGET,
                route,
                policy_id = %policy.id(),
                source = %directive.source,
                priority = directive.priority,
                "{}",
                directive.message
            );
        }
    }
}
