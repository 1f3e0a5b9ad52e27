use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use warden_policy::{EngineConfig, ManagerConfig, RightsRequest};

use crate::cli::{EvalArgs, OutputFormat};
use crate::commands::load_manager;
use crate::output::{print_json, print_verdict};

pub fn eval(engine: &EngineConfig, args: &EvalArgs, format: OutputFormat) -> Result<()> {
    let event = read_event(args.request.as_deref())?;

    let config = ManagerConfig {
        emit_policy_logs: engine.emit_policy_logs || args.emit_logs,
        ..engine.manager_config()
    };
    let manager = load_manager(engine, config)?;

    let verdict = if args.raw {
        manager.apply_event(&args.route, &event)
    } else {
        let request: RightsRequest =
            serde_json::from_value(event).context("Request is not a valid rights request")?;
        manager.apply(&args.route, &request)?
    };

    match format {
        OutputFormat::Json => print_json(&verdict)?,
        OutputFormat::Text => print_verdict(&args.route, &verdict),
    }
    Ok(())
}

fn read_event(path: Option<&Path>) -> Result<Value> {
    let text = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read request file {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read request from stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("Request is not valid JSON")
}
