use std::error::Error;

use clap::Parser;

use worksub::{
    cli::args::{CliArgs, Command},
    config::WorksubConfig,
    PlanMode, Worksub,
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli_args = CliArgs::parse();
    let config = WorksubConfig::load()?;

    let mut builder = Worksub::builder();
    if let Some(root) = cli_args.root {
        builder = builder.root(root);
    }
    if let Some(manifest_file) = cli_args.manifest_file.or(config.manifest_file) {
        builder = builder.manifest_file_name(manifest_file);
    }
    if let Some(plan_file) = cli_args.plan_file.or(config.plan_file) {
        builder = builder.plan_file_name(plan_file);
    }
    let worksub = builder.try_build()?;

    match cli_args.cmd {
        Command::Init { name } => worksub.init(name),
        Command::Plan { check, recreate } => {
            let plan_mode = if check {
                PlanMode::Verify
            } else if recreate {
                PlanMode::Recreate
            } else {
                PlanMode::Update
            };
            worksub.plan(plan_mode)
        }
        Command::Resolve { module } => worksub.resolve(&module),
    }
}
