//! Directory loading against real files.

use std::fs;
use std::path::Path;

use tempfile::TempDir;
use warden_policy::{
    FileError, LoaderError, ManagerConfig, PolicyError, PolicyManager, RightsRequest,
    DEFAULT_SUFFIX, load_all,
};

fn policy_doc(id: &str, route: &str, right: &str) -> String {
    format!(
        r#"<policy>
  <manifest><id>{id}</id><priority>1</priority></manifest>
  <paths><path>{route}</path></paths>
  <effects><allow>"{right}"</allow></effects>
</policy>"#
    )
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn fixture() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "b.policy", &policy_doc("b", "/orders", "orders.read"));
    write(dir.path(), "a.policy", &policy_doc("a", "/orders", "orders.list"));
    write(
        dir.path(),
        "nested/deeper/c.policy",
        &policy_doc("c", "/invoices", "invoices.read"),
    );
    write(dir.path(), "README.md", "not a policy");
    write(dir.path(), "broken.policy", "<policy><manifest><id>x</id>");
    write(dir.path(), "rootless.policy", "<manifest><id>y</id></manifest>");
    dir
}

#[test]
fn test_load_all_walks_recursively_and_continues_past_failures() {
    let dir = fixture();
    let loaded = load_all(dir.path(), DEFAULT_SUFFIX).unwrap();

    let ids: Vec<&str> = loaded.policies.iter().map(|(_, p)| p.id()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);

    let failed: Vec<String> = loaded
        .failures
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(failed, vec!["broken.policy", "rootless.policy"]);
    assert!(loaded
        .failures
        .iter()
        .all(|f| matches!(f.error, FileError::Parse(_))));
}

#[test]
fn test_aggregated_error_names_every_file() {
    let dir = fixture();
    let mut loaded = load_all(dir.path(), DEFAULT_SUFFIX).unwrap();
    let err = loaded.error().unwrap();
    let msg = err.to_string();
    assert!(msg.contains("broken.policy"));
    assert!(msg.contains("unexpected eof, manifest not closed"));
    assert!(msg.contains("rootless.policy"));
}

#[test]
fn test_custom_suffix() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.rules", &policy_doc("one", "/x", "r"));
    write(dir.path(), "two.policy", &policy_doc("two", "/x", "r"));

    let loaded = load_all(dir.path(), ".rules").unwrap();
    assert_eq!(loaded.policies.len(), 1);
    assert_eq!(loaded.policies[0].1.id(), "one");
}

#[test]
fn test_file_as_root_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "single.policy", &policy_doc("s", "/x", "r"));

    let err = load_all(dir.path().join("single.policy"), DEFAULT_SUFFIX).unwrap_err();
    assert!(matches!(err, LoaderError::Io { .. }));
}

#[test]
fn test_manager_skips_invalid_files() {
    let dir = fixture();
    write(
        dir.path(),
        "bad-pattern.policy",
        r#"<policy>
  <manifest><id>bad-pattern</id></manifest>
  <paths><path>/orders</path></paths>
  <matches><match type="json">{"userRightRequest": "nope"}</match></matches>
</policy>"#,
    );

    let manager = PolicyManager::new();
    let report = manager.load_directory(dir.path(), DEFAULT_SUFFIX).unwrap();
    assert_eq!(report.registered, vec!["a", "b", "c"]);
    assert_eq!(report.file_failures.len(), 2);
    assert_eq!(report.rejected.len(), 1);
    assert!(!report.is_clean());

    assert_eq!(manager.routes(), vec!["/invoices", "/orders"]);
    let verdict = manager.apply("/orders", &RightsRequest::default()).unwrap();
    assert_eq!(verdict.rights, vec!["orders.list", "orders.read"]);
}

#[test]
fn test_manager_aborts_when_not_skipping() {
    let dir = fixture();
    let manager = PolicyManager::with_config(ManagerConfig {
        skip_invalid_policies: false,
        ..Default::default()
    });

    let err = manager.load_directory(dir.path(), DEFAULT_SUFFIX).unwrap_err();
    assert!(matches!(err, PolicyError::Load(LoaderError::Files(ref f)) if f.len() == 2));
    assert!(manager.routes().is_empty());
}

#[test]
fn test_manager_aborts_on_bad_pattern_before_registering() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.policy", &policy_doc("a", "/orders", "orders.read"));
    write(
        dir.path(),
        "z.policy",
        r#"<policy>
  <manifest><id>z</id></manifest>
  <paths><path>/orders</path></paths>
  <matches><match>[1]</match></matches>
</policy>"#,
    );

    let manager = PolicyManager::with_config(ManagerConfig {
        skip_invalid_policies: false,
        ..Default::default()
    });
    let err = manager.load_directory(dir.path(), DEFAULT_SUFFIX).unwrap_err();
    assert!(matches!(err, PolicyError::Pattern { ref policy_id, .. } if policy_id == "z"));
    assert!(manager.routes().is_empty());
}
