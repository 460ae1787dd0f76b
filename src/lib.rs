pub mod cli;
pub mod config;
pub mod model;
pub mod plan;
pub mod resolver;

mod api;

pub use api::{PlanMode, Worksub, WorksubBuilder};
