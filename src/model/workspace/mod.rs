pub mod plan;

use regex_lite::Regex;
use serde::{de::Visitor, Deserialize, Deserializer, Serialize, Serializer};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Write},
    path::Path,
    str::FromStr,
};

use crate::model::ParseError;
use log::{debug, error};
use toml::{map::Map, Value};

/// Identifies an external dependency requested from a package registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct Coordinate {
    pub group: String,
    pub name: ModuleName,
    pub version: VersionConstraint,
}

impl Coordinate {
    pub fn new(group: impl Into<String>, name: impl Into<ModuleName>) -> Coordinate {
        Coordinate {
            group: group.into(),
            name: name.into(),
            version: VersionConstraint::Any,
        }
    }

    pub fn with_version(mut self, version: VersionConstraint) -> Coordinate {
        self.version = version;
        self
    }

    /// Parses a `group:name` or `group:name:version` module string.
    pub fn from_module_str(module: &str) -> Result<Coordinate, ParseError> {
        let re: Regex =
            Regex::new(r"^(?P<group>[^:\s]+):(?P<name>[^:\s]+)(?::(?P<version>[^:\s]+))?$")
                .unwrap();
        let module_parse_results = re.captures(module);
        let module_parse_results = module_parse_results.as_ref();

        Ok(Coordinate {
            group: module_parse_results
                .and_then(|c| c.name("group"))
                .map(|s| s.as_str().to_string())
                .ok_or_else(|| {
                    ParseError::MissingModuleComponent("group".to_string(), module.to_string())
                })?,
            name: module_parse_results
                .and_then(|c| c.name("name"))
                .map(|s| ModuleName::from(s.as_str()))
                .ok_or_else(|| {
                    ParseError::MissingModuleComponent("name".to_string(), module.to_string())
                })?,
            version: module_parse_results
                .and_then(|c| c.name("version"))
                .map(|s| VersionConstraint::parse(s.as_str()))
                .unwrap_or_default(),
        })
    }
}

impl Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        if self.version.is_any() {
            write!(f, "{}:{}", self.group, self.name)
        } else {
            write!(f, "{}:{}:{}", self.group, self.name, self.version)
        }
    }
}

/// A version constraint as declared on an external dependency.
///
/// Substitution decisions ignore the constraint, it is carried so that
/// coordinates round-trip through the manifest and the plan file unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum VersionConstraint {
    Exact {
        version: String,
    },
    /// A dynamic prefix range such as `5.+`.
    Prefix {
        prefix: String,
    },
    #[default]
    Any,
}

impl VersionConstraint {
    pub fn exact(version: impl Into<String>) -> VersionConstraint {
        VersionConstraint::Exact {
            version: version.into(),
        }
    }

    pub fn prefix(prefix: impl Into<String>) -> VersionConstraint {
        VersionConstraint::Prefix {
            prefix: prefix.into(),
        }
    }

    pub fn parse(s: &str) -> VersionConstraint {
        match s {
            "" | "+" | "*" => VersionConstraint::Any,
            s => match s.strip_suffix(".+") {
                Some(prefix) => VersionConstraint::prefix(prefix),
                None => VersionConstraint::exact(s),
            },
        }
    }

    pub fn is_any(&self) -> bool {
        self == &Self::Any
    }
}

impl Display for VersionConstraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionConstraint::Exact { version } => f.write_str(version),
            VersionConstraint::Prefix { prefix } => write!(f, "{}.+", prefix),
            VersionConstraint::Any => f.write_char('+'),
        }
    }
}

impl Serialize for VersionConstraint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            VersionConstraint::Any => serializer.serialize_unit(),
            constraint => serializer.serialize_str(&constraint.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for VersionConstraint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionConstraintVisitor;

        impl<'de> Visitor<'de> for VersionConstraintVisitor {
            type Value = VersionConstraint;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string")
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VersionConstraint::Any)
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VersionConstraint::parse(v))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(VersionConstraint::parse(&v))
            }
        }

        deserializer.deserialize_any(VersionConstraintVisitor)
    }
}

#[derive(Clone, Hash, Deserialize, Serialize, Debug, PartialEq, Eq, Ord, PartialOrd)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn new(s: String) -> Self {
        ModuleName(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ModuleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ModuleName {
    fn from(s: String) -> Self {
        ModuleName(s)
    }
}

impl From<&str> for ModuleName {
    fn from(s: &str) -> Self {
        ModuleName(s.to_string())
    }
}

/// The logical path locating a project in the workspace tree.
///
/// Rendered in the `:segment:segment` form. Nested workspaces address
/// projects with more than one segment, a bare `name` parses to the
/// single-segment path `:name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct ProjectPath {
    segments: Vec<String>,
}

impl ProjectPath {
    pub fn from_name(name: &ModuleName) -> ProjectPath {
        ProjectPath {
            segments: vec![name.as_str().to_string()],
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl FromStr for ProjectPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.strip_prefix(':').unwrap_or(s);
        if trimmed.is_empty() {
            return Err(ParseError::InvalidProjectPath(s.to_string()));
        }
        let segments: Vec<String> = trimmed.split(':').map(str::to_string).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(ParseError::InvalidProjectPath(s.to_string()));
        }
        Ok(ProjectPath { segments })
    }
}

impl Display for ProjectPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            write!(f, ":{}", segment)?;
        }
        Ok(())
    }
}

impl Serialize for ProjectPath {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ProjectPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ProjectPath::from_str(&s).map_err(serde::de::Error::custom)
    }
}

/// A locally buildable project inside the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct WorkspaceProject {
    pub path: ProjectPath,
}

impl WorkspaceProject {
    pub fn new(path: ProjectPath) -> Self {
        WorkspaceProject { path }
    }
}

/// The in-memory project graph the resolver decides against.
///
/// Lookups are pure, no filesystem or network access happens here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Workspace {
    has_parent: bool,
    projects: BTreeMap<ProjectPath, WorkspaceProject>,
}

impl Workspace {
    pub fn new(projects: impl IntoIterator<Item = WorkspaceProject>) -> Self {
        Workspace {
            has_parent: false,
            projects: projects
                .into_iter()
                .map(|project| (project.path.clone(), project))
                .collect(),
        }
    }

    pub fn with_parent(mut self, has_parent: bool) -> Self {
        self.has_parent = has_parent;
        self
    }

    /// Whether this workspace is nested inside a parent multi-module build.
    pub fn has_parent(&self) -> bool {
        self.has_parent
    }

    pub fn find_project(&self, path: &ProjectPath) -> Option<&WorkspaceProject> {
        self.projects.get(path)
    }
}

/// An explicit `(group, name) -> project path` allowlist entry.
#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd)]
pub struct Substitution {
    pub group: String,
    pub name: ModuleName,
    pub path: ProjectPath,
}

#[derive(Debug, Clone, PartialEq, Eq, Ord, PartialOrd)]
pub struct DeclaredDependency {
    pub name: ModuleName,
    pub coordinate: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    pub name: ModuleName,
    pub description: Option<String>,
    pub namespace: Option<String>,
    pub projects: Vec<ProjectPath>,
    pub mapping: BTreeMap<ModuleName, ProjectPath>,
    pub substitutions: Vec<Substitution>,
    pub dependencies: Vec<DeclaredDependency>,
}

impl Descriptor {
    pub fn new(name: ModuleName, description: Option<String>) -> Descriptor {
        Descriptor {
            name,
            description,
            namespace: None,
            projects: vec![],
            mapping: BTreeMap::new(),
            substitutions: vec![],
            dependencies: vec![],
        }
    }

    pub fn from_file(path: &Path) -> Result<Descriptor, ParseError> {
        debug!(
            "Attempting to read descriptor from manifest file {}",
            path.display()
        );
        let contents = std::fs::read_to_string(path)?;

        let descriptor = Descriptor::from_toml_str(&contents);
        if let Err(err) = &descriptor {
            error!("Could not build a valid descriptor from a worksub toml file due to err {err}")
        }
        descriptor
    }

    pub fn from_toml_str(data: &str) -> Result<Descriptor, ParseError> {
        let mut toml_value = toml::from_str::<HashMap<String, Value>>(data)?;

        let name = toml_value
            .remove("name")
            .ok_or_else(|| ParseError::MissingKey("name".to_string()))
            .and_then(|v| v.try_into::<ModuleName>().map_err(|e| e.into()))?;

        let description = toml_value
            .remove("description")
            .map(|v| v.try_into::<String>())
            .map_or(Ok(None), |v| v.map(Some))?;

        let namespace = toml_value
            .remove("namespace")
            .map(|v| v.try_into::<String>())
            .map_or(Ok(None), |v| v.map(Some))?;

        let projects = toml_value
            .remove("projects")
            .map(|v| v.try_into::<Vec<String>>())
            .map_or(Ok(None), |v| v.map(Some))?
            .unwrap_or_default()
            .iter()
            .map(|s| ProjectPath::from_str(s))
            .collect::<Result<Vec<_>, _>>()?;

        let mapping = toml_value
            .remove("mapping")
            .map(|v| v.try_into::<BTreeMap<String, String>>())
            .map_or(Ok(None), |v| v.map(Some))?
            .unwrap_or_default()
            .into_iter()
            .map(|(name, path)| Ok((ModuleName::new(name), ProjectPath::from_str(&path)?)))
            .collect::<Result<BTreeMap<_, _>, ParseError>>()?;

        let substitutions = toml_value
            .remove("substitute")
            .map(|v| v.try_into::<BTreeMap<String, String>>())
            .map_or(Ok(None), |v| v.map(Some))?
            .unwrap_or_default()
            .into_iter()
            .map(|(module, path)| {
                let coordinate = Coordinate::from_module_str(&module)?;
                Ok(Substitution {
                    group: coordinate.group,
                    name: coordinate.name,
                    path: ProjectPath::from_str(&path)?,
                })
            })
            .collect::<Result<Vec<_>, ParseError>>()?;

        let mut dependencies = toml_value
            .into_iter()
            .map(|(k, v)| parse_dependency(k, &v))
            .collect::<Result<Vec<_>, _>>()?;
        // HashMap iteration order is arbitrary, keep plans deterministic
        dependencies.sort();

        Ok(Descriptor {
            name,
            description,
            namespace,
            projects,
            mapping,
            substitutions,
            dependencies,
        })
    }

    pub fn into_toml(self) -> Value {
        let mut description = Map::new();
        description.insert("name".to_string(), Value::String(self.name.to_string()));
        if let Some(d) = self.description {
            description.insert("description".to_string(), Value::String(d));
        }
        if let Some(namespace) = self.namespace {
            description.insert("namespace".to_string(), Value::String(namespace));
        }
        if !self.projects.is_empty() {
            description.insert(
                "projects".to_string(),
                Value::Array(
                    self.projects
                        .iter()
                        .map(|path| Value::String(path.to_string()))
                        .collect(),
                ),
            );
        }
        if !self.mapping.is_empty() {
            let mut mapping = Map::new();
            for (name, path) in self.mapping {
                mapping.insert(name.to_string(), Value::String(path.to_string()));
            }
            description.insert("mapping".to_string(), Value::Table(mapping));
        }
        if !self.substitutions.is_empty() {
            let mut substitute = Map::new();
            for s in self.substitutions {
                substitute.insert(
                    format!("{}:{}", s.group, s.name),
                    Value::String(s.path.to_string()),
                );
            }
            description.insert("substitute".to_string(), Value::Table(substitute));
        }

        for d in self.dependencies {
            let mut dependency = Map::new();
            dependency.insert(
                "module".to_string(),
                Value::String(format!("{}:{}", d.coordinate.group, d.coordinate.name)),
            );
            if !d.coordinate.version.is_any() {
                dependency.insert(
                    "version".to_string(),
                    Value::String(d.coordinate.version.to_string()),
                );
            }
            description.insert(d.name.to_string(), Value::Table(dependency));
        }
        Value::Table(description)
    }
}

fn parse_dependency(name: String, value: &toml::Value) -> Result<DeclaredDependency, ParseError> {
    let name = ModuleName::new(name);

    let module = value
        .get("module")
        .ok_or_else(|| ParseError::MissingKey("module".to_string()))
        .and_then(|v| v.clone().try_into::<String>().map_err(|e| e.into()))?;

    let mut coordinate = Coordinate::from_module_str(&module)?;

    if let Some(version) = value.get("version") {
        let version = version.clone().try_into::<String>()?;
        coordinate.version = VersionConstraint::parse(&version);
    }

    Ok(DeclaredDependency { name, coordinate })
}
