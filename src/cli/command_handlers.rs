use log::{debug, info};

use crate::{
    api::PlanMode,
    model::workspace::{
        plan::PlanFile, Coordinate, Descriptor, ModuleName, Workspace, WorkspaceProject,
    },
    plan,
    resolver::{ResolutionTarget, RuleSet},
};
use std::{error::Error, path::Path};

/// Handler to plan command
/// Loads the workspace manifest, evaluates the substitution rules and
/// creates, updates or verifies the plan file.
pub fn do_plan(
    mode: PlanMode,
    root: &Path,
    manifest_file_name: &Path,
    plan_file_name: &Path,
) -> Result<PlanFile, Box<dyn Error>> {
    let descriptor = load_descriptor(root, manifest_file_name)?;
    let workspace = build_workspace(&descriptor, root, manifest_file_name);
    let rules = RuleSet::from_descriptor(&descriptor);

    let new_plan = plan::evaluate(&descriptor, &rules, &workspace);
    debug!("Generated plan: {:?}", new_plan);

    let plan_file_path = root.join(plan_file_name);
    match (mode, plan_file_path.exists()) {
        (PlanMode::Verify, false) => Err("Plan file does not exist".into()),

        (PlanMode::Verify, true) => {
            let old_plan = PlanFile::from_file(&plan_file_path)?;
            if old_plan == new_plan {
                debug!("Plan file is up to date");
                Ok(new_plan)
            } else {
                Err("Plan file is out of date, rerun `worksub plan`".into())
            }
        }

        (PlanMode::Update, true) => {
            let old_plan = PlanFile::from_file(&plan_file_path)?;
            if old_plan == new_plan {
                debug!("Plan file is up to date");
            } else {
                write_plan(&new_plan, &plan_file_path)?;
            }
            Ok(new_plan)
        }

        (PlanMode::Update, false) | (PlanMode::Recreate, _) => {
            write_plan(&new_plan, &plan_file_path)?;
            Ok(new_plan)
        }
    }
}

/// Handler to resolve command
/// Decides where a single module coordinate resolves from and prints the
/// decision.
pub fn do_resolve(
    root: &Path,
    manifest_file_name: &Path,
    module: &str,
) -> Result<(), Box<dyn Error>> {
    let descriptor = load_descriptor(root, manifest_file_name)?;
    let coordinate = Coordinate::from_module_str(module)?;
    let workspace = build_workspace(&descriptor, root, manifest_file_name);
    let rules = RuleSet::from_descriptor(&descriptor);

    match rules.resolve(&coordinate, &workspace) {
        ResolutionTarget::Local(project) => println!("local {}", project.path),
        ResolutionTarget::External(coordinate) => println!("external {}", coordinate),
    }

    Ok(())
}

/// Handler to init command
pub fn do_init(
    root: &Path,
    name: Option<String>,
    manifest_file_name: &Path,
) -> Result<(), Box<dyn Error>> {
    let name = build_module_name(name, root)?;
    let descriptor = Descriptor::new(ModuleName::from(name), None);
    let manifest_file_path = root.join(manifest_file_name);
    if manifest_file_path.exists() {
        return Err(format!("File already exists: {}", manifest_file_path.display()).into());
    }
    std::fs::write(
        &manifest_file_path,
        toml::to_string_pretty(&descriptor.into_toml())?,
    )?;
    info!("Wrote manifest to {}", manifest_file_path.display());
    Ok(())
}

fn load_descriptor(root: &Path, manifest_file_name: &Path) -> Result<Descriptor, Box<dyn Error>> {
    let manifest_file_path = root.join(manifest_file_name);
    let descriptor = Descriptor::from_file(&manifest_file_path)?;
    Ok(descriptor)
}

fn build_workspace(descriptor: &Descriptor, root: &Path, manifest_file_name: &Path) -> Workspace {
    let has_parent = workspace_has_parent(root, manifest_file_name);
    Workspace::new(
        descriptor
            .projects
            .iter()
            .cloned()
            .map(WorkspaceProject::new),
    )
    .with_parent(has_parent)
}

/// A workspace is nested when an ancestor directory carries its own
/// manifest file.
fn workspace_has_parent(root: &Path, manifest_file_name: &Path) -> bool {
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let mut current = root.parent();
    while let Some(dir) = current {
        if dir.join(manifest_file_name).exists() {
            return true;
        }
        current = dir.parent();
    }
    false
}

fn build_module_name(name: Option<String>, root: &Path) -> Result<String, Box<dyn Error>> {
    match name {
        Some(name) => Ok(name),
        None => {
            let name = root
                .canonicalize()?
                .file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.to_string())
                .ok_or("Could not determine a module name from the root directory")?;
            Ok(name)
        }
    }
}

fn write_plan(plan: &PlanFile, path: &Path) -> Result<(), Box<dyn Error>> {
    std::fs::write(path, plan.to_string()?)?;
    info!("Wrote plan to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::PathBuf;

    const MANIFEST_FILE_NAME: &str = "worksub.toml";
    const PLAN_FILE_NAME: &str = "worksub.plan";

    fn write_manifest(root: &Path, contents: &str) {
        std::fs::write(root.join(MANIFEST_FILE_NAME), contents).unwrap();
    }

    #[test]
    fn init_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();

        do_init(
            dir.path(),
            Some("demo".to_string()),
            Path::new(MANIFEST_FILE_NAME),
        )
        .unwrap();

        let descriptor = Descriptor::from_file(&dir.path().join(MANIFEST_FILE_NAME)).unwrap();
        assert_eq!(descriptor.name, ModuleName::from("demo"));
    }

    #[test]
    fn init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "name = \"demo\"\n");

        let result = do_init(
            dir.path(),
            Some("demo".to_string()),
            Path::new(MANIFEST_FILE_NAME),
        );
        assert!(result.is_err());
    }

    #[test]
    fn plan_update_writes_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(
            dir.path(),
            r#"
            name = "library-network"
            namespace = "org.example"
            projects = ["database-api"]

            [database-api]
                module = "org.example:database-api"
                version = "5.+"
        "#,
        );

        let plan = do_plan(
            PlanMode::Update,
            dir.path(),
            Path::new(MANIFEST_FILE_NAME),
            Path::new(PLAN_FILE_NAME),
        )
        .unwrap();

        let written = PlanFile::from_file(&dir.path().join(PLAN_FILE_NAME)).unwrap();
        assert_eq!(written, plan);
        assert!(written.decisions[0].project.is_some());
    }

    #[test]
    fn plan_verify_fails_without_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "name = \"library-network\"\n");

        let result = do_plan(
            PlanMode::Verify,
            dir.path(),
            Path::new(MANIFEST_FILE_NAME),
            Path::new(PLAN_FILE_NAME),
        );
        assert!(result.is_err());
    }

    #[test]
    fn plan_verify_accepts_up_to_date_plan_file() {
        let dir = tempfile::tempdir().unwrap();
        write_manifest(dir.path(), "name = \"library-network\"\n");

        do_plan(
            PlanMode::Update,
            dir.path(),
            Path::new(MANIFEST_FILE_NAME),
            Path::new(PLAN_FILE_NAME),
        )
        .unwrap();
        do_plan(
            PlanMode::Verify,
            dir.path(),
            Path::new(MANIFEST_FILE_NAME),
            Path::new(PLAN_FILE_NAME),
        )
        .unwrap();
    }

    #[test]
    fn nested_workspace_has_parent() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("parent");
        let child = parent.join("child");
        std::fs::create_dir_all(&child).unwrap();
        write_manifest(&parent, "name = \"parent\"\n");
        write_manifest(&child, "name = \"child\"\n");

        assert!(workspace_has_parent(
            &child,
            &PathBuf::from(MANIFEST_FILE_NAME)
        ));
        assert!(!workspace_has_parent(
            &parent,
            &PathBuf::from(MANIFEST_FILE_NAME)
        ));
    }
}
