use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetError {
    #[error("No more targets.")]
    Exhausted,
    #[error("Target template failed: {message}")]
    Fatal { message: String },
}
