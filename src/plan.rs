use log::info;

use crate::{
    model::workspace::{
        plan::{PlanFile, PlannedDependency},
        Descriptor, Workspace,
    },
    resolver::{ResolutionTarget, RuleSet},
};

/// Runs the substitution pass over every declared dependency and records
/// the decisions. Pure over its inputs, the caller decides whether and
/// where the plan gets written.
pub fn evaluate(descriptor: &Descriptor, rules: &RuleSet, workspace: &Workspace) -> PlanFile {
    let mut decisions = Vec::with_capacity(descriptor.dependencies.len());
    for dependency in &descriptor.dependencies {
        info!("Resolving {}", dependency.coordinate);
        let target = rules.resolve(&dependency.coordinate, workspace);
        let project = match &target {
            ResolutionTarget::Local(project) => Some(project.path.clone()),
            ResolutionTarget::External(_) => None,
        };
        decisions.push(PlannedDependency {
            name: dependency.name.clone(),
            group: dependency.coordinate.group.clone(),
            module: dependency.coordinate.name.clone(),
            version: dependency.coordinate.version.clone(),
            project,
        });
    }
    PlanFile { decisions }
}
