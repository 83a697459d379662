use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed failures raised by the analysis engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No native or implicit form container claimed any field (exit code 2)
    #[error("no form fields found on the page")]
    NoFormsFound,
    /// A field yielded no usable title; per-field, never fatal
    #[error("no meaningful title for field '{0}'")]
    NoMeaningfulTitle(String),
    /// Re-acquisition failed for a field after the retry (exit code 3)
    #[error("element not found for field '{key}' after {attempts} attempts")]
    ElementNotFound { key: String, attempts: u32 },
    /// Both persistence tiers rejected the record (exit code 4)
    #[error("persistence failed: {0}")]
    PersistenceFailure(String),
    /// The suggestion endpoint could not be reached or decoded (exit code 5)
    #[error("suggestion lookup failed: {0}")]
    SuggestionFailed(String),
}

/// Kind discriminant carried by faults crossing the engine protocol
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultKind {
    NoFields,
    NotFound,
    Persistence,
    Suggestion,
    Other,
}

/// Serializable error surface of the engine protocol
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineFault {
    pub kind: FaultKind,
    pub message: String,
}

impl EngineFault {
    pub fn other(message: impl Into<String>) -> Self {
        EngineFault {
            kind: FaultKind::Other,
            message: message.into(),
        }
    }
}

impl From<&EngineError> for EngineFault {
    fn from(err: &EngineError) -> Self {
        let kind = match err {
            EngineError::NoFormsFound => FaultKind::NoFields,
            EngineError::ElementNotFound { .. } => FaultKind::NotFound,
            EngineError::PersistenceFailure(_) => FaultKind::Persistence,
            EngineError::SuggestionFailed(_) => FaultKind::Suggestion,
            EngineError::NoMeaningfulTitle(_) => FaultKind::Other,
        };
        EngineFault {
            kind,
            message: err.to_string(),
        }
    }
}

/// Custom error type that includes exit codes
#[derive(Debug)]
pub enum FormprobeError {
    /// No form fields found (exit code 2)
    NoFieldsFound(String),
    /// Field element not found after retry (exit code 3)
    ElementNotFound(String),
    /// Persistence failed in both tiers (exit code 4)
    PersistenceFailed(String),
    /// Suggestion endpoint failed (exit code 5)
    SuggestionFailed(String),
    /// Generic error (exit code 1)
    Other(anyhow::Error),
}

impl FormprobeError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FormprobeError::NoFieldsFound(_) => 2,
            FormprobeError::ElementNotFound(_) => 3,
            FormprobeError::PersistenceFailed(_) => 4,
            FormprobeError::SuggestionFailed(_) => 5,
            FormprobeError::Other(_) => 1,
        }
    }
}

impl fmt::Display for FormprobeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormprobeError::NoFieldsFound(msg) => write!(f, "{}", msg),
            FormprobeError::ElementNotFound(msg) => write!(f, "{}", msg),
            FormprobeError::PersistenceFailed(msg) => write!(f, "{}", msg),
            FormprobeError::SuggestionFailed(msg) => write!(f, "{}", msg),
            FormprobeError::Other(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for FormprobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormprobeError::Other(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<EngineFault> for FormprobeError {
    fn from(fault: EngineFault) -> Self {
        match fault.kind {
            FaultKind::NoFields => FormprobeError::NoFieldsFound(fault.message),
            FaultKind::NotFound => FormprobeError::ElementNotFound(fault.message),
            FaultKind::Persistence => FormprobeError::PersistenceFailed(fault.message),
            FaultKind::Suggestion => FormprobeError::SuggestionFailed(fault.message),
            FaultKind::Other => FormprobeError::Other(anyhow::anyhow!(fault.message)),
        }
    }
}

impl From<anyhow::Error> for FormprobeError {
    fn from(err: anyhow::Error) -> Self {
        // Recover a typed error when one is buried in the chain
        let err = match err.downcast::<FormprobeError>() {
            Ok(probe_err) => return probe_err,
            Err(err) => err,
        };
        match err.downcast::<EngineError>() {
            Ok(engine_err) => {
                let fault = EngineFault::from(&engine_err);
                match fault.kind {
                    FaultKind::Other => FormprobeError::Other(engine_err.into()),
                    _ => FormprobeError::from(fault),
                }
            }
            Err(err) => FormprobeError::Other(err),
        }
    }
}

#[cfg(test)]
#[path = "errors_test.rs"]
mod errors_test;
