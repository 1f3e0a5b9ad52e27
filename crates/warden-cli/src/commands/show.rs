use anyhow::{Context, Result};
use colored::Colorize;
use warden_policy::{EngineConfig, load_all};

use crate::cli::{OutputFormat, ShowArgs};
use crate::commands::load_manager;
use crate::output::{print_json, print_table};

pub fn show(engine: &EngineConfig, args: &ShowArgs, format: OutputFormat) -> Result<()> {
    if args.routes {
        return show_routes(engine, format);
    }

    let loaded = load_all(&engine.policy_dir, &engine.file_suffix)
        .with_context(|| format!("Failed to load policies from {}", engine.policy_dir.display()))?;

    if let Some(id) = &args.id {
        let (path, policy) = loaded
            .policies
            .iter()
            .find(|(_, p)| p.id() == id.as_str())
            .with_context(|| format!("No policy with ID '{id}'"))?;
        return match format {
            OutputFormat::Json => print_json(policy),
            OutputFormat::Text => {
                println!("{} {}", "#".dimmed(), path.display().to_string().dimmed());
                println!("{}", policy.to_document());
                Ok(())
            }
        };
    }

    match format {
        OutputFormat::Json => {
            let policies: Vec<_> = loaded.policies.iter().map(|(_, p)| p).collect();
            print_json(&policies)
        }
        OutputFormat::Text => {
            if loaded.policies.is_empty() {
                println!("No policies found.");
                return Ok(());
            }
            let rows = loaded
                .policies
                .iter()
                .map(|(path, p)| {
                    [
                        p.id().to_string(),
                        p.priority().to_string(),
                        p.routes.join(", "),
                        path.display().to_string(),
                    ]
                })
                .collect();
            print_table(["ID", "Priority", "Routes", "File"], rows);
            Ok(())
        }
    }
}

fn show_routes(engine: &EngineConfig, format: OutputFormat) -> Result<()> {
    let manager = load_manager(engine, engine.manager_config())?;

    match format {
        OutputFormat::Json => {
            let routes: Vec<_> = manager
                .routes()
                .into_iter()
                .map(|route| {
                    let count = manager.policy_count(&route);
                    serde_json::json!({ "route": route, "policies": count })
                })
                .collect();
            print_json(&serde_json::json!({ "routes": routes, "stats": manager.stats() }))
        }
        OutputFormat::Text => {
            let rows = manager
                .routes()
                .into_iter()
                .map(|route| {
                    let count = manager.policy_count(&route).to_string();
                    [route, count]
                })
                .collect();
            print_table(["Route", "Policies"], rows);
            let stats = manager.stats();
            println!(
                "{}: {} policies, {} registrations",
                "Total".cyan(),
                stats.policies,
                stats.registrations
            );
            Ok(())
        }
    }
}
