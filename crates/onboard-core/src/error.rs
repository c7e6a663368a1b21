//! Error taxonomy for the onboarding workflow.
//!
//! Every fallible operation returns `anyhow::Result`; the variants below are the
//! classified failures the pipeline and its callers care about. Use
//! [`OnboardError::classify`] to recover one from an `anyhow::Error`.

use thiserror::Error;

use crate::validate::InputKind;

#[derive(Error, Debug)]
pub enum OnboardError {
    /// Malformed operator input. Recovered locally by re-prompting.
    #[error("Invalid {kind}: {reason}")]
    Validation { kind: InputKind, reason: String },

    /// An expected file, section or field is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The chain already has an entry in a registry table.
    #[error("Chain '{chain}' is already registered under '{table}'")]
    Duplicate { table: String, chain: String },

    /// An external tool exited non-zero or wrote to stderr.
    #[error("Command `{command}` failed ({status}): {stderr}")]
    Subprocess {
        command: String,
        status: String,
        stderr: String,
    },

    /// An external tool succeeded but its output did not have the expected shape.
    #[error("Output of `{command}` did not match pattern '{pattern}'")]
    Extraction { command: String, pattern: String },

    /// A code path that is deliberately not available yet.
    #[error("{0}")]
    Unsupported(String),

    /// Attempt to overwrite a deployment state field with a different value.
    #[error("State field '{field}' is already set to '{existing}', refusing to replace it with '{attempted}'")]
    StateConflict {
        field: String,
        existing: String,
        attempted: String,
    },

    /// The deployed gateway address differs from the predicted one.
    #[error("Gateway deployed at {deployed} but {predicted} was predicted")]
    PredictionMismatch { predicted: String, deployed: String },
}

impl OnboardError {
    /// Find the first classified error in an `anyhow` chain.
    pub fn classify(err: &anyhow::Error) -> Option<&OnboardError> {
        err.chain().find_map(|cause| cause.downcast_ref::<OnboardError>())
    }

    pub fn is_duplicate(err: &anyhow::Error) -> bool {
        matches!(Self::classify(err), Some(OnboardError::Duplicate { .. }))
    }

    pub fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(Self::classify(err), Some(OnboardError::NotFound(_)))
    }

    pub fn is_subprocess(err: &anyhow::Error) -> bool {
        matches!(Self::classify(err), Some(OnboardError::Subprocess { .. }))
    }

    pub fn is_extraction(err: &anyhow::Error) -> bool {
        matches!(Self::classify(err), Some(OnboardError::Extraction { .. }))
    }
}
