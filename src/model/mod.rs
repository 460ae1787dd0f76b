use thiserror::Error;

pub mod workspace;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error reading configuration toml: {0}")]
    IO(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Missing TOML key `{0}` while parsing")]
    MissingKey(String),
    #[error("Missing module component `{0}` in string `{1}`")]
    MissingModuleComponent(String, String),
    #[error("Invalid project path `{0}`")]
    InvalidProjectPath(String),
    #[error("Unsupported plan file version: {0}")]
    UnsupportedPlanFileVersion(toml::Value),
    #[error("Missing plan file version")]
    MissingPlanFileVersion,
}
