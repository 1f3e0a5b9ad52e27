//! Policy, request and verdict data model.
//!
//! - [`Policy`] is produced by the parser and is immutable once registered.
//! - [`RightsRequest`] is the per-request event serialized to JSON and
//!   matched against every policy registered on a route.
//! - [`RightResponse`] is the verdict returned by
//!   [`PolicyManager::apply`](crate::PolicyManager::apply).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// Policy
// =============================================================================

/// A named, prioritized authorization rule bound to one or more routes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Policy {
    /// Identity and precedence.
    pub manifest: Manifest,

    /// Route templates this policy protects, in declaration order.
    pub routes: Vec<String>,

    /// Effect applied when the policy matches.
    pub rights: PolicyRights,

    /// Log directives. Never consulted when resolving a verdict.
    pub logging: PolicyLogging,

    /// Raw structural JSON pattern. Empty means "match every request".
    pub matches: String,
}

impl Policy {
    /// The policy's manifest ID.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.manifest.id
    }

    /// The policy's priority (higher wins).
    #[must_use]
    pub fn priority(&self) -> i64 {
        self.manifest.priority
    }

    /// Returns `true` if the policy carries a forced response.
    #[must_use]
    pub fn has_forced_response(&self) -> bool {
        self.rights.return_code.is_some()
    }

    /// The redirect target, if one is set and non-empty.
    #[must_use]
    pub fn redirect_target(&self) -> Option<&str> {
        self.rights.redirect.as_deref().filter(|r| !r.is_empty())
    }

    /// Returns `true` if the policy grants or revokes any right.
    #[must_use]
    pub fn has_rights(&self) -> bool {
        !self.rights.allowed.is_empty() || !self.rights.denied.is_empty()
    }

    /// Render the policy as a DSL document.
    ///
    /// Parsing the result yields the same manifest, routes, rights and
    /// logging.
    #[must_use]
    pub fn to_document(&self) -> String {
        self.to_string()
    }
}

/// Policy identity and precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Manifest {
    /// Unique policy ID (uniqueness is not enforced).
    pub id: String,
    /// Precedence; higher values take precedence.
    pub priority: i64,
    /// Namespace.
    pub namespace: String,
    /// Version string.
    pub version: String,
    /// Human-readable name.
    pub name: String,
    /// Description.
    pub description: String,
}

/// Effects of a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyRights {
    /// Rights granted.
    pub allowed: Vec<String>,
    /// Rights revoked.
    pub denied: Vec<String>,
    /// Forced redirect target.
    pub redirect: Option<String>,
    /// Forced response status code.
    pub return_code: Option<u16>,
    /// Forced response message.
    pub return_msg: Option<String>,
}

/// Log directives attached to a policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicyLogging {
    /// Emitted when the verdict grants rights.
    pub on_permit: Vec<LogDirective>,
    /// Emitted when the verdict is a forced response or redirect.
    pub on_deny: Vec<LogDirective>,
    /// Emitted for every verdict.
    pub on_any: Vec<LogDirective>,
}

impl PolicyLogging {
    /// Returns `true` if no directive is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.on_permit.is_empty() && self.on_deny.is_empty() && self.on_any.is_empty()
    }
}

/// A single log directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogDirective {
    /// Logical log source, e.g. `audit`.
    pub source: String,
    /// Directive priority.
    pub priority: i64,
    /// Message text.
    pub message: String,
}

// =============================================================================
// Document rendering
// =============================================================================

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.manifest;
        writeln!(f, "<policy>")?;
        writeln!(f, "  <manifest>")?;
        writeln!(f, "    <id>{}</id>", m.id)?;
        writeln!(f, "    <ns>{}</ns>", m.namespace)?;
        writeln!(f, "    <v>{}</v>", m.version)?;
        writeln!(f, "    <name>{}</name>", m.name)?;
        writeln!(f, "    <desc>{}</desc>", m.description)?;
        writeln!(f, "    <priority>{}</priority>", m.priority)?;
        writeln!(f, "  </manifest>")?;

        writeln!(f, "  <paths>")?;
        for route in &self.routes {
            writeln!(f, "    <path>{route}</path>")?;
        }
        writeln!(f, "  </paths>")?;

        let r = &self.rights;
        writeln!(f, "  <effects>")?;
        if !r.allowed.is_empty() {
            writeln!(f, "    <allow>{}</allow>", quoted_list(&r.allowed))?;
        }
        if !r.denied.is_empty() {
            writeln!(f, "    <deny>{}</deny>", quoted_list(&r.denied))?;
        }
        if let Some(redirect) = &r.redirect {
            writeln!(f, "    <redirect>{redirect}</redirect>")?;
        }
        if let Some(msg) = &r.return_msg {
            writeln!(f, "    <return>{msg}</return>")?;
        }
        if let Some(code) = r.return_code {
            writeln!(f, "    <returncode>{code}</returncode>")?;
        }
        writeln!(f, "  </effects>")?;

        if !self.logging.is_empty() {
            writeln!(f, "  <log>")?;
            write_directives(f, "onpermit", &self.logging.on_permit)?;
            write_directives(f, "ondeny", &self.logging.on_deny)?;
            write_directives(f, "onany", &self.logging.on_any)?;
            writeln!(f, "  </log>")?;
        }

        if !self.matches.trim().is_empty() {
            writeln!(f, "  <matches>")?;
            writeln!(f, "    <match type=\"json\">{}</match>", self.matches.trim())?;
            writeln!(f, "  </matches>")?;
        }
        write!(f, "</policy>")
    }
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("\"{item}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_directives(
    f: &mut fmt::Formatter<'_>,
    tag: &str,
    directives: &[LogDirective],
) -> fmt::Result {
    for d in directives {
        writeln!(
            f,
            "    <{tag} source=\"{}\" priority=\"{}\">{}</{tag}>",
            d.source, d.priority, d.message
        )?;
    }
    Ok(())
}

// =============================================================================
// Rights Request
// =============================================================================

/// The event evaluated against policies.
///
/// Serialized to camelCase JSON before matching, so match patterns address
/// fields such as `userRightRequest.workgroups` or `contextRequest.query`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RightsRequest {
    /// Transport-level request information.
    pub http_request: HttpRequest,
    /// Route parameters, query, body and caller-provided context.
    pub context_request: ContextRequest,
    /// The authenticated user.
    pub user_right_request: UserRightRequest,
}

/// Transport-level request information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpRequest {
    /// Client IP address.
    pub source_ip_address: String,
    /// Requested host.
    pub target_host: String,
    /// Requested port.
    pub target_port: u16,
    /// Concrete request path.
    pub target_path: String,
}

/// Request parameters and context.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextRequest {
    /// Values bound by the route template, e.g. `id` for `/crm/:id`.
    pub path_params: HashMap<String, String>,
    /// Query parameters.
    pub query: HashMap<String, Value>,
    /// Decoded request body.
    pub body: HashMap<String, Value>,
    /// Free-form caller context.
    pub context: HashMap<String, Value>,
}

/// The authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserRightRequest {
    /// User ID.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Display name.
    pub display_name: String,
    /// Email addresses.
    pub emails: Vec<String>,
    /// Phone numbers.
    pub phones: Vec<String>,
    /// Whether the account is verified.
    pub is_verified: bool,
    /// Whether the account is blocked.
    pub is_blocked: bool,
    /// Whether the account is active.
    pub is_active: bool,
    /// Whether the account is deleted.
    pub is_deleted: bool,
    /// Whether the user must change their password.
    pub requires_password_update: bool,
    /// Workgroup memberships.
    pub workgroups: Vec<String>,
    /// Arbitrary user labels.
    pub labels: HashMap<String, String>,
}

// =============================================================================
// Right Response
// =============================================================================

/// Kind of verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// A forced response (status code and message).
    Response,
    /// A forced redirect.
    Redirect,
    /// A resolved set of granted rights.
    Rights,
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Response => write!(f, "response"),
            Self::Redirect => write!(f, "redirect"),
            Self::Rights => write!(f, "rights"),
        }
    }
}

/// Forced response carried by a verdict.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForcedResponse {
    /// Status code.
    pub return_code: Option<u16>,
    /// Message body.
    pub return_msg: String,
}

/// The engine's verdict for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RightResponse {
    /// Verdict kind. `None` when no policy applied.
    #[serde(rename = "type")]
    pub response_type: Option<ResponseType>,
    /// Forced response, set when `response_type` is `Response`.
    pub response: ForcedResponse,
    /// Redirect target, set when `response_type` is `Redirect`.
    pub redirect: Option<String>,
    /// Granted rights, lower-cased and deduplicated.
    pub rights: Vec<String>,
    /// Free-form metadata about the decision.
    pub metadata: HashMap<String, String>,
}

impl RightResponse {
    /// The verdict returned when no policy applies.
    #[must_use]
    pub fn neutral() -> Self {
        Self::default()
    }

    /// Returns `true` if no policy contributed to this verdict.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.response_type.is_none()
    }

    /// Returns `true` if `right` was granted (case-insensitive).
    #[must_use]
    pub fn has_right(&self, right: &str) -> bool {
        let right = right.to_lowercase();
        self.rights.iter().any(|r| *r == right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rights_request_serializes_camel_case() {
        let mut request = RightsRequest::default();
        request.user_right_request.user_id = "u-1".to_string();
        request.user_right_request.workgroups = vec!["sales".to_string()];
        request.http_request.source_ip_address = "10.0.0.1".to_string();

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["userRightRequest"]["userId"], json!("u-1"));
        assert_eq!(value["userRightRequest"]["workgroups"], json!(["sales"]));
        assert_eq!(value["httpRequest"]["sourceIpAddress"], json!("10.0.0.1"));
        assert_eq!(value["userRightRequest"]["isActive"], json!(false));
    }

    #[test]
    fn test_rights_request_accepts_partial_json() {
        let request: RightsRequest = serde_json::from_value(json!({
            "userRightRequest": { "userId": "u-2", "isActive": true }
        }))
        .unwrap();
        assert_eq!(request.user_right_request.user_id, "u-2");
        assert!(request.user_right_request.is_active);
        assert!(request.context_request.query.is_empty());
    }

    #[test]
    fn test_response_type_serializes_lowercase() {
        let response = RightResponse {
            response_type: Some(ResponseType::Redirect),
            redirect: Some("/login".to_string()),
            ..Default::default()
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["type"], json!("redirect"));
        assert_eq!(value["redirect"], json!("/login"));
    }

    #[test]
    fn test_neutral_response() {
        let response = RightResponse::neutral();
        assert!(response.is_neutral());
        assert!(response.rights.is_empty());
        assert!(response.redirect.is_none());
        assert!(response.response.return_code.is_none());
    }

    #[test]
    fn test_has_right_is_case_insensitive() {
        let response = RightResponse {
            response_type: Some(ResponseType::Rights),
            rights: vec!["crm.read".to_string()],
            ..Default::default()
        };
        assert!(response.has_right("CRM.Read"));
        assert!(!response.has_right("crm.write"));
    }

    #[test]
    fn test_policy_effect_helpers() {
        let mut policy = Policy::default();
        assert!(!policy.has_forced_response());
        assert!(!policy.has_rights());
        assert!(policy.redirect_target().is_none());

        policy.rights.redirect = Some(String::new());
        assert!(policy.redirect_target().is_none());

        policy.rights.redirect = Some("/login".to_string());
        policy.rights.denied = vec!["crm.write".to_string()];
        policy.rights.return_code = Some(403);
        assert_eq!(policy.redirect_target(), Some("/login"));
        assert!(policy.has_rights());
        assert!(policy.has_forced_response());
    }
}
