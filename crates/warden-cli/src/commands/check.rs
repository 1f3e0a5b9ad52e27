use std::collections::BTreeMap;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use warden_policy::{EngineConfig, ManagerConfig, PolicyManager};

use crate::cli::{CheckArgs, OutputFormat};
use crate::output::{print_error, print_json, print_success, print_warning};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckSummary {
    valid: bool,
    policies: Vec<String>,
    duplicates: Vec<String>,
    failures: Vec<CheckFailure>,
    routes: usize,
}

#[derive(Serialize)]
struct CheckFailure {
    path: String,
    error: String,
}

/// Returns whether the directory passed.
pub fn check(engine: &EngineConfig, args: &CheckArgs, format: OutputFormat) -> Result<bool> {
    let manager = PolicyManager::with_config(ManagerConfig {
        skip_invalid_policies: true,
        emit_policy_logs: false,
    });
    let report = manager.load_directory(&engine.policy_dir, &engine.file_suffix)?;

    let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
    for id in &report.registered {
        *seen.entry(id.as_str()).or_default() += 1;
    }
    let duplicates: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.to_string())
        .collect();

    let failures: Vec<CheckFailure> = report
        .file_failures
        .iter()
        .map(|f| CheckFailure {
            path: f.path.display().to_string(),
            error: f.error.to_string(),
        })
        .chain(report.rejected.iter().map(|(path, err)| CheckFailure {
            path: path.display().to_string(),
            error: err.to_string(),
        }))
        .collect();

    let valid = failures.is_empty() && !(args.strict && !duplicates.is_empty());
    let summary = CheckSummary {
        valid,
        policies: report.registered.clone(),
        duplicates,
        failures,
        routes: manager.routes().len(),
    };

    match format {
        OutputFormat::Json => print_json(&summary)?,
        OutputFormat::Text => {
            for failure in &summary.failures {
                print_error(&format!("{}: {}", failure.path, failure.error));
            }
            for id in &summary.duplicates {
                print_warning(&format!("Duplicate policy ID: {id}"));
            }
            let line = format!(
                "{} policies on {} routes in {}",
                summary.policies.len(),
                summary.routes,
                engine.policy_dir.display()
            );
            if summary.valid {
                print_success(&line);
            } else {
                print_error(&format!(
                    "{line}; {} {}",
                    summary.failures.len().to_string().red(),
                    "failed".red()
                ));
            }
        }
    }

    Ok(valid)
}
