use std::{collections::HashMap, path::PathBuf};

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

pub struct WorksubConfig {
    pub manifest_file: Option<PathBuf>,
    pub plan_file: Option<PathBuf>,
}

impl WorksubConfig {
    pub fn load() -> anyhow::Result<Self> {
        let raw_config = RawConfig::load(None)?;

        Ok(Self {
            manifest_file: raw_config.manifest.file,
            plan_file: raw_config.plan.file,
        })
    }
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct RawConfig {
    #[serde(default)]
    manifest: ManifestConfig,
    #[serde(default)]
    plan: PlanConfig,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct ManifestConfig {
    file: Option<PathBuf>,
}

#[derive(Default, Debug, Deserialize, PartialEq, Eq)]
struct PlanConfig {
    file: Option<PathBuf>,
}

impl RawConfig {
    fn load(env: Option<HashMap<String, String>>) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("WORKSUB")
                    .separator("_")
                    .source(env),
            )
            .build()?
            .try_deserialize()
    }
}
