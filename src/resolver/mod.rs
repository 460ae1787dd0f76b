use std::collections::BTreeMap;

use log::debug;

use crate::model::workspace::{
    Coordinate, Descriptor, ModuleName, ProjectPath, Substitution, Workspace, WorkspaceProject,
};

/// Where a requested coordinate should be resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionTarget {
    /// Redirect the edge to a local workspace project.
    Local(WorkspaceProject),
    /// Keep the external reference, the registry client takes over.
    External(Coordinate),
}

/// A single substitution rule. A `None` means the rule does not apply, it is
/// never an error: missed substitutions fall back to external resolution.
pub trait SubstitutionRule {
    fn evaluate(&self, coordinate: &Coordinate, workspace: &Workspace) -> Option<WorkspaceProject>;
}

/// Maps a module name to the logical path of its workspace project.
///
/// `Direct` is the one-segment convention, `Table` covers workspaces whose
/// project tree nests deeper than the module names suggest.
#[derive(Debug, Clone, Default)]
pub enum PathMapping {
    #[default]
    Direct,
    Table(BTreeMap<ModuleName, ProjectPath>),
}

impl PathMapping {
    pub fn project_path(&self, name: &ModuleName) -> Option<ProjectPath> {
        match self {
            PathMapping::Direct => Some(ProjectPath::from_name(name)),
            PathMapping::Table(table) => table.get(name).cloned(),
        }
    }
}

/// Substitutes any coordinate in the organization namespace whose mapped
/// project exists in the workspace.
pub struct NamespaceRule {
    namespace: String,
    mapping: PathMapping,
}

impl NamespaceRule {
    pub fn new(namespace: impl Into<String>, mapping: PathMapping) -> Self {
        Self {
            namespace: namespace.into(),
            mapping,
        }
    }
}

impl SubstitutionRule for NamespaceRule {
    fn evaluate(&self, coordinate: &Coordinate, workspace: &Workspace) -> Option<WorkspaceProject> {
        if coordinate.group != self.namespace {
            return None;
        }
        let path = self.mapping.project_path(&coordinate.name)?;
        workspace.find_project(&path).cloned()
    }
}

/// The restricted form: explicit `(group, name) -> path` entries, considered
/// only when the workspace is nested inside a parent multi-module build.
pub struct AllowlistRule {
    entries: Vec<Substitution>,
}

impl AllowlistRule {
    pub fn new(entries: Vec<Substitution>) -> Self {
        Self { entries }
    }
}

impl SubstitutionRule for AllowlistRule {
    fn evaluate(&self, coordinate: &Coordinate, workspace: &Workspace) -> Option<WorkspaceProject> {
        if !workspace.has_parent() {
            return None;
        }
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.group == coordinate.group && entry.name == coordinate.name)?;
        workspace.find_project(&entry.path).cloned()
    }
}

/// An ordered set of substitution rules, first hit wins.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<Box<dyn SubstitutionRule>>,
}

impl RuleSet {
    pub fn new(rules: Vec<Box<dyn SubstitutionRule>>) -> Self {
        Self { rules }
    }

    /// Builds the rule set a manifest describes: the explicit allowlist
    /// first, then the namespace predicate with its path mapping.
    pub fn from_descriptor(descriptor: &Descriptor) -> RuleSet {
        let mut rules: Vec<Box<dyn SubstitutionRule>> = Vec::new();
        if !descriptor.substitutions.is_empty() {
            rules.push(Box::new(AllowlistRule::new(
                descriptor.substitutions.clone(),
            )));
        }
        if let Some(namespace) = &descriptor.namespace {
            let mapping = if descriptor.mapping.is_empty() {
                PathMapping::Direct
            } else {
                PathMapping::Table(descriptor.mapping.clone())
            };
            rules.push(Box::new(NamespaceRule::new(namespace, mapping)));
        }
        RuleSet::new(rules)
    }

    /// Decides where `coordinate` resolves from. Total over its inputs:
    /// an unmatched coordinate passes through unchanged.
    pub fn resolve(&self, coordinate: &Coordinate, workspace: &Workspace) -> ResolutionTarget {
        for rule in &self.rules {
            if let Some(project) = rule.evaluate(coordinate, workspace) {
                debug!(
                    "Substituting {} with local project {}",
                    coordinate, project.path
                );
                return ResolutionTarget::Local(project);
            }
        }
        debug!("Keeping {} external", coordinate);
        ResolutionTarget::External(coordinate.clone())
    }
}
