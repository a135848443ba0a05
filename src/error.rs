use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum VisitCoreError {
    PersistenceError(String),
    StateTransitionError(String),
    QueueError(String),
    ValidationError(String),
    ConfigurationError(String),
}

impl fmt::Display for VisitCoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitCoreError::PersistenceError(msg) => write!(f, "Persistence error: {msg}"),
            VisitCoreError::StateTransitionError(msg) => {
                write!(f, "State transition error: {msg}")
            }
            VisitCoreError::QueueError(msg) => write!(f, "Queue error: {msg}"),
            VisitCoreError::ValidationError(msg) => write!(f, "Validation error: {msg}"),
            VisitCoreError::ConfigurationError(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for VisitCoreError {}

pub type Result<T> = std::result::Result<T, VisitCoreError>;
