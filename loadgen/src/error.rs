use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// Rejected before any virtual user is started.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("this run has already been started")]
    AlreadyRun,
}

impl LoadError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
