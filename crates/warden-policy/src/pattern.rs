//! Structural JSON pattern matching.
//!
//! A pattern is a JSON object mirroring the shape of the events it reacts to.
//! Nested objects descend into the event; leaves are arrays of alternatives.
//!
//! ```json
//! {
//!   "userRightRequest": {
//!     "workgroups": ["sales", "support"],
//!     "isBlocked": [false],
//!     "labels": { "region": [{ "prefix": "eu-" }] }
//!   },
//!   "httpRequest": { "sourceIpAddress": [{ "cidr": "10.0.0.0/8" }] },
//!   "$or": [
//!     { "contextRequest": { "query": { "limit": [{ "numeric": ["<=", 100] }] } } },
//!     { "userRightRequest": { "labels": { "tier": ["internal"] } } }
//!   ]
//! }
//! ```
//!
//! # Leaf operators
//!
//! | Element | Matches |
//! |---------|---------|
//! | `"x"`, `1`, `true`, `null` | equal value (numbers compared numerically) |
//! | `{"prefix": "x"}` | strings starting with `x` |
//! | `{"suffix": "x"}` | strings ending with `x` |
//! | `{"equals-ignore-case": "x"}` | strings equal ignoring case |
//! | `{"wildcard": "a*b"}` | strings matching the glob (`*` = any run) |
//! | `{"exists": true \| false}` | field presence / absence |
//! | `{"anything-but": v \| [v..] \| {"prefix"\|"suffix": "x"}}` | present values not matching |
//! | `{"numeric": [op, n, op, n]}` | numbers satisfying every comparison |
//! | `{"cidr": "10.0.0.0/8"}` | IP address strings inside the network |
//!
//! When the event value is an array, the leaf matches if any element matches.
//! A missing field only matches `{"exists": false}`.

use std::net::IpAddr;

use ipnetwork::IpNetwork;
use regex::Regex;
use serde_json::{Map, Value};

/// Key introducing alternatives inside an object pattern.
const OR_KEY: &str = "$or";

// =============================================================================
// Pattern Error
// =============================================================================

/// Errors produced while compiling a match pattern.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    /// The pattern text is not valid JSON.
    #[error("pattern is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The pattern root is not a JSON object.
    #[error("pattern root must be a JSON object")]
    RootNotObject,

    /// A field's pattern is neither an object nor an array.
    #[error("pattern for field '{field}' must be an object or an array of alternatives")]
    InvalidLeaf {
        /// Dotted field path.
        field: String,
    },

    /// A leaf array has no alternatives.
    #[error("pattern for field '{field}' has no alternatives")]
    EmptyLeaf {
        /// Dotted field path.
        field: String,
    },

    /// An operator object is malformed or unknown.
    #[error("invalid operator for field '{field}': {message}")]
    InvalidOperator {
        /// Dotted field path.
        field: String,
        /// What is wrong with the operator.
        message: String,
    },

    /// `$or` is not a non-empty array of objects.
    #[error("'$or' at '{field}' must be a non-empty array of objects")]
    InvalidOr {
        /// Dotted field path of the enclosing object.
        field: String,
    },
}

impl PatternError {
    fn operator(field: &str, message: impl Into<String>) -> Self {
        Self::InvalidOperator {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Compiled Pattern
// =============================================================================

/// A compiled structural pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    root: ObjectPattern,
}

#[derive(Debug, Clone, Default)]
struct ObjectPattern {
    fields: Vec<(String, FieldPattern)>,
    any_of: Vec<ObjectPattern>,
}

#[derive(Debug, Clone)]
enum FieldPattern {
    Object(ObjectPattern),
    Leaf(Vec<Matcher>),
}

#[derive(Debug, Clone)]
enum Matcher {
    Equals(Value),
    Prefix(String),
    Suffix(String),
    EqualsIgnoreCase(String),
    Wildcard(Regex),
    Exists(bool),
    AnythingBut(AnythingBut),
    Numeric(Vec<(Comparison, f64)>),
    Cidr(IpNetwork),
}

#[derive(Debug, Clone)]
enum AnythingBut {
    Values(Vec<Value>),
    Prefix(String),
    Suffix(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn parse(op: &str) -> Option<Self> {
        match op {
            "=" => Some(Self::Eq),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    fn holds(self, value: f64, bound: f64) -> bool {
        match self {
            Self::Eq => (value - bound).abs() < f64::EPSILON,
            Self::Lt => value < bound,
            Self::Le => value <= bound,
            Self::Gt => value > bound,
            Self::Ge => value >= bound,
        }
    }
}

impl Pattern {
    /// Compile pattern text. Empty or blank text compiles to the match-all
    /// pattern `{}`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the text is not JSON or does not follow the
    /// pattern grammar.
    pub fn parse(text: &str) -> Result<Self, PatternError> {
        if text.trim().is_empty() {
            return Ok(Self::match_all());
        }
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(&value)
    }

    /// Compile an already-parsed JSON pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] if the value does not follow the pattern
    /// grammar.
    pub fn from_value(value: &Value) -> Result<Self, PatternError> {
        let Value::Object(map) = value else {
            return Err(PatternError::RootNotObject);
        };
        Ok(Self {
            root: compile_object(map, "")?,
        })
    }

    /// The pattern that matches every event.
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            root: ObjectPattern::default(),
        }
    }

    /// Returns `true` if the pattern has no constraints.
    #[must_use]
    pub fn is_match_all(&self) -> bool {
        self.root.fields.is_empty() && self.root.any_of.is_empty()
    }

    /// Test an event against the pattern.
    #[must_use]
    pub fn matches(&self, event: &Value) -> bool {
        self.root.matches(Some(event))
    }
}

// =============================================================================
// Compilation
// =============================================================================

fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn compile_object(map: &Map<String, Value>, path: &str) -> Result<ObjectPattern, PatternError> {
    let mut pattern = ObjectPattern::default();
    for (key, value) in map {
        if key == OR_KEY {
            let invalid = || PatternError::InvalidOr {
                field: path.to_string(),
            };
            let alternatives = value.as_array().filter(|a| !a.is_empty()).ok_or_else(invalid)?;
            for alternative in alternatives {
                let Value::Object(alt) = alternative else {
                    return Err(invalid());
                };
                pattern.any_of.push(compile_object(alt, path)?);
            }
            continue;
        }

        let field = join_path(path, key);
        let compiled = match value {
            Value::Object(nested) => FieldPattern::Object(compile_object(nested, &field)?),
            Value::Array(elements) => {
                if elements.is_empty() {
                    return Err(PatternError::EmptyLeaf { field });
                }
                FieldPattern::Leaf(
                    elements
                        .iter()
                        .map(|e| compile_matcher(e, &field))
                        .collect::<Result<_, _>>()?,
                )
            }
            _ => return Err(PatternError::InvalidLeaf { field }),
        };
        pattern.fields.push((key.clone(), compiled));
    }
    Ok(pattern)
}

fn compile_matcher(element: &Value, field: &str) -> Result<Matcher, PatternError> {
    let Value::Object(op) = element else {
        return match element {
            Value::Array(_) => Err(PatternError::operator(field, "nested arrays are not allowed")),
            other => Ok(Matcher::Equals(other.clone())),
        };
    };
    let mut entries = op.iter();
    let (Some((name, arg)), None) = (entries.next(), entries.next()) else {
        return Err(PatternError::operator(
            field,
            "operator objects must have exactly one key",
        ));
    };

    match name.as_str() {
        "prefix" => Ok(Matcher::Prefix(string_arg(arg, field, name)?)),
        "suffix" => Ok(Matcher::Suffix(string_arg(arg, field, name)?)),
        "equals-ignore-case" => Ok(Matcher::EqualsIgnoreCase(
            string_arg(arg, field, name)?.to_lowercase(),
        )),
        "wildcard" => compile_wildcard(&string_arg(arg, field, name)?, field),
        "exists" => arg
            .as_bool()
            .map(Matcher::Exists)
            .ok_or_else(|| PatternError::operator(field, "'exists' takes true or false")),
        "anything-but" => compile_anything_but(arg, field),
        "numeric" => compile_numeric(arg, field),
        "cidr" => {
            let raw = string_arg(arg, field, name)?;
            raw.parse::<IpNetwork>()
                .map(Matcher::Cidr)
                .map_err(|e| PatternError::operator(field, format!("invalid cidr '{raw}': {e}")))
        }
        other => Err(PatternError::operator(
            field,
            format!("unknown operator '{other}'"),
        )),
    }
}

fn string_arg(arg: &Value, field: &str, op: &str) -> Result<String, PatternError> {
    arg.as_str()
        .map(str::to_string)
        .ok_or_else(|| PatternError::operator(field, format!("'{op}' takes a string")))
}

/// Convert a glob with `*` wildcards into an anchored regex.
fn compile_wildcard(glob: &str, field: &str) -> Result<Matcher, PatternError> {
    let body = glob
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
        .map(Matcher::Wildcard)
        .map_err(|e| PatternError::operator(field, format!("invalid wildcard '{glob}': {e}")))
}

fn compile_anything_but(arg: &Value, field: &str) -> Result<Matcher, PatternError> {
    let excluded = match arg {
        Value::Array(values) => {
            if values.iter().any(|v| v.is_array() || v.is_object()) {
                return Err(PatternError::operator(
                    field,
                    "'anything-but' lists must contain plain values",
                ));
            }
            AnythingBut::Values(values.clone())
        }
        Value::Object(op) => match (op.get("prefix"), op.get("suffix"), op.len()) {
            (Some(Value::String(p)), None, 1) => AnythingBut::Prefix(p.clone()),
            (None, Some(Value::String(s)), 1) => AnythingBut::Suffix(s.clone()),
            _ => {
                return Err(PatternError::operator(
                    field,
                    "'anything-but' objects take a single 'prefix' or 'suffix' string",
                ));
            }
        },
        other => AnythingBut::Values(vec![other.clone()]),
    };
    Ok(Matcher::AnythingBut(excluded))
}

fn compile_numeric(arg: &Value, field: &str) -> Result<Matcher, PatternError> {
    let invalid = || {
        PatternError::operator(
            field,
            "'numeric' takes one or two [operator, number] pairs, e.g. [\">\", 0, \"<=\", 5]",
        )
    };
    let items = arg.as_array().ok_or_else(invalid)?;
    if items.is_empty() || items.len() % 2 != 0 || items.len() > 4 {
        return Err(invalid());
    }
    let mut comparisons = Vec::with_capacity(items.len() / 2);
    for pair in items.chunks(2) {
        let op = pair[0].as_str().and_then(Comparison::parse).ok_or_else(invalid)?;
        let bound = pair[1].as_f64().ok_or_else(invalid)?;
        comparisons.push((op, bound));
    }
    Ok(Matcher::Numeric(comparisons))
}

// =============================================================================
// Matching
// =============================================================================

impl ObjectPattern {
    /// `event` is `None` when the enclosing field is missing from the event.
    fn matches(&self, event: Option<&Value>) -> bool {
        let fields_match = self.fields.iter().all(|(key, field)| {
            let value = event.and_then(|e| e.get(key));
            field.matches(value)
        });
        fields_match
            && (self.any_of.is_empty() || self.any_of.iter().any(|alt| alt.matches(event)))
    }
}

impl FieldPattern {
    fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Self::Object(object) => match value {
                Some(Value::Array(items)) => items
                    .iter()
                    .any(|item| item.is_object() && object.matches(Some(item))),
                Some(v @ Value::Object(_)) => object.matches(Some(v)),
                Some(_) | None => object.matches(None),
            },
            Self::Leaf(matchers) => matchers.iter().any(|m| m.matches(value)),
        }
    }
}

impl Matcher {
    fn matches(&self, value: Option<&Value>) -> bool {
        match (self, value) {
            (Self::Exists(expected), value) => value.is_some() == *expected,
            (_, None) => false,
            (_, Some(Value::Array(items))) => items.iter().any(|item| self.matches_scalar(item)),
            (_, Some(v)) => self.matches_scalar(v),
        }
    }

    fn matches_scalar(&self, value: &Value) -> bool {
        match self {
            Self::Equals(expected) => values_equal(expected, value),
            Self::Prefix(prefix) => value.as_str().is_some_and(|s| s.starts_with(prefix.as_str())),
            Self::Suffix(suffix) => value.as_str().is_some_and(|s| s.ends_with(suffix.as_str())),
            Self::EqualsIgnoreCase(expected) => {
                value.as_str().is_some_and(|s| s.to_lowercase() == *expected)
            }
            Self::Wildcard(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            Self::Exists(expected) => *expected,
            Self::AnythingBut(excluded) => match excluded {
                AnythingBut::Values(values) => !values.iter().any(|v| values_equal(v, value)),
                AnythingBut::Prefix(prefix) => {
                    value.as_str().is_some_and(|s| !s.starts_with(prefix.as_str()))
                }
                AnythingBut::Suffix(suffix) => {
                    value.as_str().is_some_and(|s| !s.ends_with(suffix.as_str()))
                }
            },
            Self::Numeric(comparisons) => value
                .as_f64()
                .is_some_and(|n| comparisons.iter().all(|(op, bound)| op.holds(n, *bound))),
            Self::Cidr(network) => value
                .as_str()
                .and_then(|s| s.parse::<IpAddr>().ok())
                .is_some_and(|ip| network.contains(ip)),
        }
    }
}

fn values_equal(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
            _ => a == b,
        },
        _ => expected == actual,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(pattern: Value) -> Pattern {
        Pattern::from_value(&pattern).unwrap()
    }

    fn event() -> Value {
        json!({
            "httpRequest": {
                "sourceIpAddress": "10.1.2.3",
                "targetPort": 443,
                "targetPath": "/api/v1/crm/42"
            },
            "contextRequest": {
                "pathParams": { "id": "42" },
                "query": { "limit": 50, "fields": ["name", "email"] },
                "body": {},
                "context": {}
            },
            "userRightRequest": {
                "userId": "user-123",
                "username": "Alice",
                "isBlocked": false,
                "isActive": true,
                "workgroups": ["sales", "emea"],
                "labels": { "region": "eu-west" },
                "emails": []
            }
        })
    }

    // -------------------------------------------------------------------------
    // Compilation
    // -------------------------------------------------------------------------

    #[test]
    fn test_empty_text_is_match_all() {
        let pattern = Pattern::parse("  ").unwrap();
        assert!(pattern.is_match_all());
        assert!(pattern.matches(&json!({})));
        assert!(Pattern::parse("{}").unwrap().matches(&event()));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Pattern::parse("{ not json"),
            Err(PatternError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_root_must_be_object() {
        assert!(matches!(
            Pattern::parse("[1, 2]"),
            Err(PatternError::RootNotObject)
        ));
    }

    #[test]
    fn test_scalar_leaf_is_rejected() {
        let err = Pattern::from_value(&json!({"a": {"b": "c"}})).unwrap_err();
        assert!(matches!(err, PatternError::InvalidLeaf { field } if field == "a.b"));
    }

    #[test]
    fn test_empty_leaf_is_rejected() {
        let err = Pattern::from_value(&json!({"a": []})).unwrap_err();
        assert!(matches!(err, PatternError::EmptyLeaf { field } if field == "a"));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let err = Pattern::from_value(&json!({"a": [{"regex": ".*"}]})).unwrap_err();
        assert!(err.to_string().contains("unknown operator 'regex'"));
    }

    #[test]
    fn test_multi_key_operator_is_rejected() {
        let err = Pattern::from_value(&json!({"a": [{"prefix": "x", "suffix": "y"}]})).unwrap_err();
        assert!(err.to_string().contains("exactly one key"));
    }

    #[test]
    fn test_invalid_numeric_is_rejected() {
        for bad in [
            json!({"n": [{"numeric": [">"]}]}),
            json!({"n": [{"numeric": ["~", 1]}]}),
            json!({"n": [{"numeric": [">", "one"]}]}),
            json!({"n": [{"numeric": [">", 1, "<", 2, "=", 3]}]}),
        ] {
            assert!(Pattern::from_value(&bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_invalid_cidr_is_rejected() {
        assert!(Pattern::from_value(&json!({"ip": [{"cidr": "10.0.0.0/99"}]})).is_err());
    }

    #[test]
    fn test_invalid_or_is_rejected() {
        assert!(matches!(
            Pattern::from_value(&json!({"$or": []})),
            Err(PatternError::InvalidOr { .. })
        ));
        assert!(matches!(
            Pattern::from_value(&json!({"$or": [["a"]]})),
            Err(PatternError::InvalidOr { .. })
        ));
    }

    // -------------------------------------------------------------------------
    // Matching
    // -------------------------------------------------------------------------

    #[test]
    fn test_exact_string() {
        let pattern = compile(json!({"userRightRequest": {"userId": ["user-123"]}}));
        assert!(pattern.matches(&event()));
        let pattern = compile(json!({"userRightRequest": {"userId": ["user-999"]}}));
        assert!(!pattern.matches(&event()));
    }

    #[test]
    fn test_alternatives_are_or() {
        let pattern = compile(json!({"userRightRequest": {"userId": ["nobody", "user-123"]}}));
        assert!(pattern.matches(&event()));
    }

    #[test]
    fn test_fields_are_and() {
        let pattern = compile(json!({
            "userRightRequest": {"userId": ["user-123"], "isBlocked": [true]}
        }));
        assert!(!pattern.matches(&event()));
    }

    #[test]
    fn test_boolean_and_number_literals() {
        let pattern = compile(json!({
            "userRightRequest": {"isActive": [true]},
            "httpRequest": {"targetPort": [443.0]}
        }));
        assert!(pattern.matches(&event()));
    }

    #[test]
    fn test_event_array_matches_any_element() {
        let pattern = compile(json!({"userRightRequest": {"workgroups": ["emea"]}}));
        assert!(pattern.matches(&event()));
        let pattern = compile(json!({"userRightRequest": {"workgroups": ["apac"]}}));
        assert!(!pattern.matches(&event()));
    }

    #[test]
    fn test_prefix_suffix_and_case() {
        assert!(compile(json!({"userRightRequest": {"labels": {"region": [{"prefix": "eu-"}]}}}))
            .matches(&event()));
        assert!(compile(json!({"httpRequest": {"targetPath": [{"suffix": "/42"}]}}))
            .matches(&event()));
        assert!(compile(json!({"userRightRequest": {"username": [{"equals-ignore-case": "ALICE"}]}}))
            .matches(&event()));
        assert!(!compile(json!({"userRightRequest": {"username": ["alice"]}})).matches(&event()));
    }

    #[test]
    fn test_wildcard() {
        assert!(compile(json!({"httpRequest": {"targetPath": [{"wildcard": "/api/*/crm/*"}]}}))
            .matches(&event()));
        assert!(!compile(json!({"httpRequest": {"targetPath": [{"wildcard": "/admin/*"}]}}))
            .matches(&event()));
        // Regex metacharacters in the glob are literal.
        assert!(!compile(json!({"userRightRequest": {"userId": [{"wildcard": "user.123"}]}}))
            .matches(&event()));
    }

    #[test]
    fn test_exists() {
        assert!(compile(json!({"userRightRequest": {"userId": [{"exists": true}]}})).matches(&event()));
        assert!(compile(json!({"userRightRequest": {"tenant": [{"exists": false}]}})).matches(&event()));
        assert!(!compile(json!({"userRightRequest": {"userId": [{"exists": false}]}})).matches(&event()));
        assert!(!compile(json!({"userRightRequest": {"tenant": [{"exists": true}]}})).matches(&event()));
    }

    #[test]
    fn test_missing_nested_object_only_matches_absence() {
        assert!(compile(json!({"session": {"token": [{"exists": false}]}})).matches(&event()));
        assert!(!compile(json!({"session": {"token": ["abc"]}})).matches(&event()));
    }

    #[test]
    fn test_missing_field_does_not_match_literal() {
        assert!(!compile(json!({"userRightRequest": {"tenant": ["acme"]}})).matches(&event()));
    }

    #[test]
    fn test_anything_but() {
        assert!(compile(json!({"userRightRequest": {"userId": [{"anything-but": "admin"}]}}))
            .matches(&event()));
        assert!(!compile(json!({"userRightRequest": {"userId": [{"anything-but": ["user-123", "admin"]}]}}))
            .matches(&event()));
        assert!(!compile(json!({"userRightRequest": {"labels": {"region": [{"anything-but": {"prefix": "eu-"}}]}}}))
            .matches(&event()));
        assert!(compile(json!({"userRightRequest": {"labels": {"region": [{"anything-but": {"suffix": "-east"}}]}}}))
            .matches(&event()));
        // Absent fields never satisfy anything-but.
        assert!(!compile(json!({"userRightRequest": {"tenant": [{"anything-but": "acme"}]}}))
            .matches(&event()));
    }

    #[test]
    fn test_numeric_ranges() {
        let limit = |range: Value| {
            compile(json!({"contextRequest": {"query": {"limit": [{"numeric": range}]}}}))
                .matches(&event())
        };
        assert!(limit(json!([">", 0, "<=", 50])));
        assert!(limit(json!(["=", 50])));
        assert!(!limit(json!(["<", 50])));
        assert!(!limit(json!([">=", 51])));
        // Non-numeric values never match.
        assert!(!compile(json!({"userRightRequest": {"userId": [{"numeric": [">", 0]}]}}))
            .matches(&event()));
    }

    #[test]
    fn test_cidr() {
        assert!(compile(json!({"httpRequest": {"sourceIpAddress": [{"cidr": "10.0.0.0/8"}]}}))
            .matches(&event()));
        assert!(!compile(json!({"httpRequest": {"sourceIpAddress": [{"cidr": "192.168.0.0/16"}]}}))
            .matches(&event()));
    }

    #[test]
    fn test_or_alternatives() {
        let pattern = compile(json!({
            "userRightRequest": {"isActive": [true]},
            "$or": [
                {"userRightRequest": {"workgroups": ["apac"]}},
                {"contextRequest": {"pathParams": {"id": ["42"]}}}
            ]
        }));
        assert!(pattern.matches(&event()));

        let pattern = compile(json!({
            "$or": [
                {"userRightRequest": {"workgroups": ["apac"]}},
                {"contextRequest": {"pathParams": {"id": ["7"]}}}
            ]
        }));
        assert!(!pattern.matches(&event()));
    }

    #[test]
    fn test_nested_object_inside_event_array() {
        let event = json!({"contextRequest": {"body": {"items": [{"sku": "a"}, {"sku": "b"}]}}});
        let pattern = compile(json!({"contextRequest": {"body": {"items": {"sku": ["b"]}}}}));
        assert!(pattern.matches(&event));
        let pattern = compile(json!({"contextRequest": {"body": {"items": {"sku": ["c"]}}}}));
        assert!(!pattern.matches(&event));
    }

    #[test]
    fn test_empty_event_array_is_present_but_matches_no_literal() {
        assert!(compile(json!({"userRightRequest": {"emails": [{"exists": true}]}})).matches(&event()));
        assert!(!compile(json!({"userRightRequest": {"emails": ["a@b.c"]}})).matches(&event()));
    }
}
