use std::{env, error::Error, path::PathBuf};

use crate::Worksub;

#[derive(Default)]
pub struct WorksubBuilder {
    // All other paths are relative to `root`
    root: Option<PathBuf>,
    manifest_file_name: Option<PathBuf>,
    plan_file_name: Option<PathBuf>,
}

impl WorksubBuilder {
    /// Workspace root directory.
    ///
    /// Defaults to the current directory.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Name of the worksub manifest toml file.
    ///
    /// Defaults to `worksub.toml`.
    pub fn manifest_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest_file_name = Some(path.into());
        self
    }

    /// Name of the worksub plan file.
    ///
    /// Defaults to `worksub.plan`.
    pub fn plan_file_name(mut self, path: impl Into<PathBuf>) -> Self {
        self.plan_file_name = Some(path.into());
        self
    }

    pub fn try_build(self) -> Result<Worksub, Box<dyn Error>> {
        let Self {
            root,
            manifest_file_name,
            plan_file_name,
        } = self;

        let root = match root {
            Some(root) => root,
            None => env::current_dir()?,
        };

        let manifest_file_name =
            manifest_file_name.unwrap_or_else(|| PathBuf::from("worksub.toml"));

        let plan_file_name = plan_file_name.unwrap_or_else(|| PathBuf::from("worksub.plan"));

        Ok(Worksub {
            root,
            manifest_file_name,
            plan_file_name,
        })
    }
}
