use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid command: {reason}")]
    InvalidCommand { reason: String },

    #[error("Invalid phase transition: {from} -> {to}")]
    PhaseTransition { from: String, to: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Dispatch error: {0}")]
    Dispatch(String),

    #[error("Event channel error: {0}")]
    EventChannel(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
