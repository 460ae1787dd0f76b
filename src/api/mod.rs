use std::{error::Error, path::PathBuf};

use crate::cli::command_handlers::{do_init, do_plan, do_resolve};

mod builder;

pub use builder::WorksubBuilder;

pub struct Worksub {
    root: PathBuf,
    manifest_file_name: PathBuf,
    plan_file_name: PathBuf,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PlanMode {
    /// Verify that the plan file is up to date. This mode should be normally used on CI.
    Verify,
    /// Update the plan file if necessary.
    Update,
    /// Recreate the plan file from scratch.
    Recreate,
}

impl Worksub {
    pub fn builder() -> WorksubBuilder {
        WorksubBuilder::default()
    }

    /// Creates an initial worksub setup
    pub fn init(&self, name: Option<String>) -> Result<(), Box<dyn Error>> {
        do_init(&self.root, name, &self.manifest_file_name)
    }

    /// Evaluates the substitution rules defined in the toml manifest file
    /// and creates, updates or verifies the plan file
    pub fn plan(&self, plan_mode: PlanMode) -> Result<(), Box<dyn Error>> {
        do_plan(
            plan_mode,
            &self.root,
            &self.manifest_file_name,
            &self.plan_file_name,
        )?;
        Ok(())
    }

    /// Resolves a single module coordinate against the workspace and prints
    /// the decision
    pub fn resolve(&self, module: &str) -> Result<(), Box<dyn Error>> {
        do_resolve(&self.root, &self.manifest_file_name, module)
    }
}
