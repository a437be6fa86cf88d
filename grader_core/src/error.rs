use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Infrastructure faults. A submission hitting one of these is
/// excluded from the batch results, never mis-scored.
#[derive(Debug, Error)]
pub enum Error {
    #[error("entity `{0}` not found")]
    NotFound(String),
    #[error("failed in IO")]
    IO(#[from] std::io::Error),
    #[error("batch config is invalid: {0}")]
    Config(String),
    #[error("policy file error")]
    Policy(#[from] serde_yaml::Error),
    #[error("comparator failed: {0}")]
    Compare(String),
    #[error("cleanup of `{path}` failed")]
    Cleanup {
        path: String,
        source: std::io::Error,
    },
    #[error("environment error: {0}")]
    Environment(String),
}
