//! CLI command definitions and handlers

pub mod config;
pub mod workflow;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// OKR Board - objectives, key results and AI-suggested workflows
#[derive(Parser, Debug)]
#[command(name = "okrboard")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(long, global = true, value_parser = ["DEBUG", "INFO", "WARN", "ERROR"])]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a workflow for a key result
    Workflow(WorkflowArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct WorkflowArgs {
    /// Objective title
    #[arg(short, long)]
    pub objective: String,

    /// Key result title
    #[arg(short, long)]
    pub key_result: String,

    /// Key result owner
    #[arg(long, default_value = "me")]
    pub owner: String,

    /// Key result target value
    #[arg(long, default_value_t = 100.0)]
    pub target: f64,

    /// Key result deadline (YYYY-MM-DD); defaults to 90 days from today
    #[arg(long)]
    pub deadline: Option<chrono::NaiveDate>,

    /// Model override
    #[arg(short, long, env = "OKRBOARD_MODEL")]
    pub model: Option<String>,

    /// Logbook note to record on the key result (repeatable)
    #[arg(long = "note")]
    pub notes: Vec<String>,

    /// Directory to write the logbook report into
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Print the key result as JSON instead of a list
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Show current configuration
    #[arg(long)]
    pub show: bool,

    /// Initialize default configuration
    #[arg(long)]
    pub init: bool,

    /// Set a configuration value
    #[arg(long)]
    pub set: Option<String>,
}
