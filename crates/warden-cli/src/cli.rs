use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "warden")]
#[command(about = "Warden CLI: validate, inspect and evaluate authorization policies")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (TOML). Defaults to ./warden.toml when present
    #[arg(short, long, global = true, env = "WARDEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Policy directory (overrides config)
    #[arg(short = 'd', long, global = true)]
    pub policy_dir: Option<PathBuf>,

    /// Policy file suffix (overrides config)
    #[arg(long, global = true)]
    pub suffix: Option<String>,

    /// Log level when RUST_LOG is not set (overrides config)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Parse and compile every policy in the directory
    Check(CheckArgs),
    /// Evaluate a request against a route
    Eval(EvalArgs),
    /// Show loaded policies and routes
    Show(ShowArgs),
}

#[derive(clap::Args)]
pub struct CheckArgs {
    /// Treat duplicate policy IDs as failures
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args)]
pub struct EvalArgs {
    /// Route template the request was routed to (e.g. /api/v1/crm/:id)
    pub route: String,
    /// JSON request file; reads stdin when omitted or "-"
    #[arg(short, long)]
    pub request: Option<PathBuf>,
    /// Match the JSON as-is instead of reading it as a rights request
    #[arg(long)]
    pub raw: bool,
    /// Emit matched policies' log directives
    #[arg(long)]
    pub emit_logs: bool,
}

#[derive(clap::Args)]
pub struct ShowArgs {
    /// Render a single policy as a document
    #[arg(long, conflicts_with = "routes")]
    pub id: Option<String>,
    /// List routes and their policy counts
    #[arg(long)]
    pub routes: bool,
}
