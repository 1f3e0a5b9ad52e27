//! CLI configuration loading.
//!
//! Precedence, lowest first: defaults, TOML file, `WARDEN__*` environment
//! variables (e.g. `WARDEN__POLICY_DIR`, `WARDEN__LOGGING__LEVEL`), command
//! line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use warden_policy::EngineConfig;

use crate::cli::Cli;

const DEFAULT_CONFIG_FILE: &str = "warden.toml";

pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let mut builder = Config::builder();
    match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found: {}", p.display());
            }
            builder = builder.add_source(File::from(p.to_path_buf()));
        }
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                builder = builder.add_source(File::from(default_path));
            }
        }
    }
    builder = builder.add_source(
        Environment::with_prefix("WARDEN")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder.build().context("Failed to build config")?;
    let engine: EngineConfig = cfg
        .try_deserialize()
        .context("Failed to deserialize config")?;
    Ok(engine)
}

/// Apply command line overrides and validate the result.
pub fn resolve(cli: &Cli) -> Result<EngineConfig> {
    let mut engine = load_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.policy_dir {
        engine.policy_dir = dir.clone();
    }
    if let Some(suffix) = &cli.suffix {
        engine.file_suffix = suffix.clone();
    }
    if let Some(level) = &cli.log_level {
        engine.logging.level = level.clone();
    }
    engine.validate()?;
    Ok(engine)
}
