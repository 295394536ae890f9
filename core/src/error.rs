// accrue/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccrueError {
    /// A step requires keys that neither the initial shape nor any earlier step
    /// unconditionally provides. Raised while building, never while running.
    #[error("Contract violation at step '{step_name}' (#{step_index}): required keys not guaranteed: {}", .missing.join(", "))]
    ContractViolation {
        step_name: String,
        step_index: usize,
        missing: Vec<String>,
    },

    #[error("Step defined more than once: {step_name}")]
    DuplicateStep { step_name: String },

    #[error("Step not found: {step_name}")]
    StepNotFound { step_name: String },

    #[error("Initial state is missing declared keys: {}", .missing.join(", "))]
    InitialStateMismatch { missing: Vec<String> },

    #[error("Property '{key}' is not present")]
    MissingProperty { key: String },

    #[error("Property '{key}' has an unexpected type. Source: {source}")]
    PropertyType {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected a JSON object for a property bag, found {found}")]
    NotAnObject { found: String },

    #[error("Error in user-provided step or external operation. Source: {source}")]
    HandlerError {
        #[source]
        source: AnyhowError,
    },
}

impl From<AnyhowError> for AccrueError {
    fn from(err: AnyhowError) -> Self {
        // An AccrueError that went through anyhow comes back out unchanged.
        match err.downcast::<AccrueError>() {
            Ok(accrue_err) => accrue_err,
            Err(source) => AccrueError::HandlerError { source },
        }
    }
}

pub type AccrueResult<T, E = AccrueError> = std::result::Result<T, E>;
