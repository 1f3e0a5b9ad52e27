//! Conflict resolution across matched policies.
//!
//! Matched policies are ordered by ascending priority (ties by ID) and folded
//! into three competing candidates: the highest-priority forced response, the
//! highest-priority redirect, and the accumulated rights. The candidate with
//! the highest priority wins. At equal priority a response beats a redirect,
//! and rights beat both.

use std::cmp::Ordering;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::model::{ForcedResponse, Policy, ResponseType, RightResponse};

/// Metadata key holding the ID of the policy that decided a forced verdict.
pub const METADATA_POLICY: &str = "policy";

/// Metadata key holding the comma-joined IDs of every matched policy.
pub const METADATA_POLICIES: &str = "policies";

/// Order policies for evaluation: ascending priority, then ascending ID.
pub fn evaluation_order(a: &Policy, b: &Policy) -> Ordering {
    a.priority()
        .cmp(&b.priority())
        .then_with(|| a.id().cmp(b.id()))
}

/// Resolve matched policies into one verdict.
///
/// An empty slice yields the neutral verdict; any match yields a typed one.
#[must_use]
pub fn resolve(matched: &[Arc<Policy>]) -> RightResponse {
    if matched.is_empty() {
        return RightResponse::neutral();
    }

    let mut ordered: Vec<&Policy> = matched.iter().map(|p| &**p).collect();
    ordered.sort_by(|a, b| evaluation_order(a, b));

    // Later entries overwrite earlier ones, so the last hit per category is
    // the highest priority (greatest ID on ties).
    let mut response: Option<&Policy> = None;
    let mut redirect: Option<&Policy> = None;
    let mut rights_priority: Option<i64> = None;
    for &policy in &ordered {
        if policy.has_forced_response() {
            response = Some(policy);
        }
        if policy.redirect_target().is_some() {
            redirect = Some(policy);
        }
        if policy.has_rights() {
            rights_priority = Some(policy.priority());
        }
    }

    let response_priority = response.map(Policy::priority);
    let redirect_priority = redirect.map(Policy::priority);

    // `None` sorts below every `Some`, standing in for minus infinity.
    let mut verdict = if let Some(policy) = response.filter(|_| {
        response_priority >= redirect_priority && response_priority > rights_priority
    }) {
        RightResponse {
            response_type: Some(ResponseType::Response),
            response: ForcedResponse {
                return_code: policy.rights.return_code,
                return_msg: policy.rights.return_msg.clone().unwrap_or_default(),
            },
            ..Default::default()
        }
        .decided_by(policy)
    } else if let Some(policy) = redirect.filter(|_| redirect_priority > rights_priority) {
        RightResponse {
            response_type: Some(ResponseType::Redirect),
            redirect: policy.redirect_target().map(str::to_string),
            ..Default::default()
        }
        .decided_by(policy)
    } else {
        // Matched without a forced outcome: rights, possibly empty.
        RightResponse {
            response_type: Some(ResponseType::Rights),
            rights: accumulate_rights(&ordered),
            ..Default::default()
        }
    };

    let ids: Vec<&str> = ordered.iter().map(|p| p.id()).collect();
    verdict
        .metadata
        .insert(METADATA_POLICIES.to_string(), ids.join(","));
    verdict
}

/// Fold rights bucket by bucket in ascending priority. Within a bucket,
/// denials are applied after grants, so a right both allowed and denied at
/// the same priority ends up denied.
fn accumulate_rights(ordered: &[&Policy]) -> Vec<String> {
    let mut approved: IndexSet<String> = IndexSet::new();

    for bucket in ordered.chunk_by(|a, b| a.priority() == b.priority()) {
        let denied: IndexSet<String> = bucket
            .iter()
            .flat_map(|p| p.rights.denied.iter())
            .map(|r| r.to_lowercase())
            .collect();

        approved.retain(|r| !denied.contains(r));
        for right in bucket.iter().flat_map(|p| p.rights.allowed.iter()) {
            let right = right.to_lowercase();
            if !denied.contains(&right) {
                approved.insert(right);
            }
        }
    }

    approved.into_iter().collect()
}

impl RightResponse {
    fn decided_by(mut self, policy: &Policy) -> Self {
        self.metadata
            .insert(METADATA_POLICY.to_string(), policy.id().to_string());
        self
    }
}
