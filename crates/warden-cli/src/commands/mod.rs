pub mod check;
pub mod eval;
pub mod show;

use anyhow::{Context, Result};
use warden_policy::{EngineConfig, ManagerConfig, PolicyManager};

use crate::output::print_warning;

/// Build a manager from the configured policy directory, reporting anything
/// that was skipped.
fn load_manager(engine: &EngineConfig, config: ManagerConfig) -> Result<PolicyManager> {
    let manager = PolicyManager::with_config(config);
    let report = manager
        .load_directory(&engine.policy_dir, &engine.file_suffix)
        .with_context(|| format!("Failed to load policies from {}", engine.policy_dir.display()))?;

    for failure in &report.file_failures {
        print_warning(&format!("Skipped {failure}"));
    }
    for (path, err) in &report.rejected {
        print_warning(&format!("Skipped {}: {err}", path.display()));
    }
    Ok(manager)
}
