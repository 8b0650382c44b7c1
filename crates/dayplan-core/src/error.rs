#![forbid(unsafe_code)]

//! Planner-level errors.
//!
//! Gesture input never produces an error; these cover construction and the
//! operations the planner does not provide.

use crate::config::ConfigError;

#[derive(Debug)]
pub enum PlannerError {
    /// The operation is not available in this build.
    Unsupported(&'static str),
    /// Configuration failed to load or validate.
    Config(ConfigError),
}

impl std::fmt::Display for PlannerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported(op) => write!(f, "{op} is not implemented"),
            Self::Config(e) => write!(f, "configuration error: {e}"),
        }
    }
}

impl std::error::Error for PlannerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unsupported(_) => None,
            Self::Config(e) => Some(e),
        }
    }
}

impl From<ConfigError> for PlannerError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}
