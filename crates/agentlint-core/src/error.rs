use thiserror::Error;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("invalid category '{0}': expected one of tool-consistency, workflow, consistency, skill-alignment")]
    InvalidCategory(String),

    #[error("invalid platform '{0}': expected one of claude, opencode, codex")]
    InvalidPlatform(String),

    #[error("invalid certainty '{0}': expected one of high, medium, low")]
    InvalidCertainty(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, LintError>;
