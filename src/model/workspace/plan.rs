use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ParseError;

use super::{ModuleName, ProjectPath, VersionConstraint};

/// The recorded outcome of a substitution pass: one decision per declared
/// dependency, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanFile {
    #[serde(default)]
    pub decisions: Vec<PlannedDependency>,
}

const VERSION: i64 = 1;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
struct VersionedPlanFile<'a> {
    pub version: i64,
    #[serde(flatten)]
    pub content: &'a PlanFile,
}

impl PlanFile {
    pub fn from_file(file: &Path) -> Result<PlanFile, ParseError> {
        PlanFile::from_str(&std::fs::read_to_string(file)?)
    }

    pub fn from_str(s: &str) -> Result<PlanFile, ParseError> {
        let mut table = toml::from_str::<toml::Table>(s)?;
        match table.remove("version") {
            Some(toml::Value::Integer(VERSION)) => table.try_into::<PlanFile>().map_err(Into::into),
            Some(other) => Err(ParseError::UnsupportedPlanFileVersion(other)),
            None => Err(ParseError::MissingPlanFileVersion),
        }
    }

    pub fn to_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(&VersionedPlanFile {
            version: VERSION,
            content: self,
        })
    }
}

/// A single resolution decision. A present `project` means the coordinate
/// was substituted with a local workspace project, an absent one means the
/// external reference was kept.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct PlannedDependency {
    pub name: ModuleName,
    pub group: String,
    pub module: ModuleName,
    #[serde(skip_serializing_if = "VersionConstraint::is_any", default)]
    pub version: VersionConstraint,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub project: Option<ProjectPath>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use toml::toml;

    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn load_save_plan_file() {
        let text = toml::to_string_pretty(&toml! {
            version = 1

            [[decisions]]
            name = "database-api"
            group = "de.timesnake"
            module = "database-api"
            version = "4.+"
            project = ":database:database-api"

            [[decisions]]
            name = "freemarker"
            group = "org.freemarker"
            module = "freemarker"
            version = "2.3.31"
        })
        .unwrap();
        let data = PlanFile {
            decisions: vec![
                PlannedDependency {
                    name: ModuleName::from("database-api"),
                    group: "de.timesnake".to_string(),
                    module: ModuleName::from("database-api"),
                    version: VersionConstraint::prefix("4"),
                    project: Some(ProjectPath::from_str(":database:database-api").unwrap()),
                },
                PlannedDependency {
                    name: ModuleName::from("freemarker"),
                    group: "org.freemarker".to_string(),
                    module: ModuleName::from("freemarker"),
                    version: VersionConstraint::exact("2.3.31"),
                    project: None,
                },
            ],
        };
        let parsed = PlanFile::from_str(&text).unwrap();
        let formatted = data.to_string().unwrap();
        assert_eq!(parsed, data);
        assert_eq!(formatted, text);
    }

    #[test]
    fn load_plan_file_unsupported_version() {
        let text = toml::to_string_pretty(&toml! {
            version = 2
        })
        .unwrap();
        PlanFile::from_str(&text).expect_err("should not parse v2 plan file");
    }

    #[test]
    fn load_plan_file_missing_version() {
        PlanFile::from_str("").expect_err("should not parse an unversioned plan file");
    }
}
