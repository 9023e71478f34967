use thiserror::Error;

/// Errors raised by the pure recommendation engine.
///
/// Validation variants carry the offending component and the received value so
/// the caller can fix the request without guessing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("Missing score component '{0}'")]
    MissingComponent(String),

    #[error("Unknown score component '{0}'")]
    UnknownComponent(String),

    #[error("Score component '{0}' is given more than once")]
    DuplicateComponent(String),

    #[error("Score component '{component}' must be an integer in 1..=5, received {received}")]
    OutOfRange { component: String, received: String },

    #[error("Job-form descriptor for '{organization}' has an empty form label")]
    EmptyForm { organization: String },

    #[error("Profile '{target}' has {found} components, expected {expected}")]
    DimensionMismatch {
        target: String,
        expected: usize,
        found: usize,
    },

    #[error("Profile build failed: {0}")]
    BuildFailure(String),
}

impl EngineError {
    /// True for errors caused by caller input rather than stored data.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::MissingComponent(_)
                | EngineError::UnknownComponent(_)
                | EngineError::DuplicateComponent(_)
                | EngineError::OutOfRange { .. }
                | EngineError::EmptyForm { .. }
        )
    }
}
