use crate::request::RequestStatus;
use std::fmt;
use thiserror::Error;

/// Caller-facing operation names, used when reporting illegal transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Submit,
    Cancel,
    Resolve,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operation::Submit => write!(f, "submit"),
            Operation::Cancel => write!(f, "cancel"),
            Operation::Resolve => write!(f, "resolve"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HelpError {
    #[error("Invalid transition: cannot {operation} while {status}")]
    InvalidTransition { operation: Operation, status: RequestStatus },

    #[error("Invalid help kind: {0}")]
    InvalidKind(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl HelpError {
    pub fn invalid_transition(operation: Operation, status: RequestStatus) -> Self {
        HelpError::InvalidTransition { operation, status }
    }

    /// Short machine-readable code for JSON responses.
    pub fn code(&self) -> &'static str {
        match self {
            HelpError::InvalidTransition { .. } => "INVALID_TRANSITION",
            HelpError::InvalidKind(_) => "INVALID_KIND",
            HelpError::InvalidParameter(_) => "INVALID_PARAMETER",
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, HelpError>;
