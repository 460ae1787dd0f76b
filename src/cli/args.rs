use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Workspace-aware dependency substitution for multi-module builds.
#[derive(Debug, Parser)]
#[command(version)]
pub struct CliArgs {
    #[command(subcommand)]
    pub cmd: Command,
    /// Workspace root directory
    #[arg(short, long, env = "WORKSUB_ROOT")]
    pub root: Option<PathBuf>,
    /// Name of the workspace manifest file
    #[arg(short, long)]
    pub manifest_file: Option<PathBuf>,
    /// Name of the substitution plan file
    #[arg(short, long)]
    pub plan_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Creates an initial worksub manifest in the workspace root
    Init {
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Evaluates the substitution rules and writes the plan file
    Plan {
        /// Verify that the plan file is up to date instead of writing it
        #[arg(long, conflicts_with = "recreate")]
        check: bool,
        /// Recreate the plan file from scratch
        #[arg(long)]
        recreate: bool,
    },
    /// Resolves a single module coordinate against the workspace
    Resolve {
        /// Module coordinate, `group:name` or `group:name:version`
        module: String,
    },
}
