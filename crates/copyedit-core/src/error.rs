//! Request-level error types
//!
//! Every failure a handler can surface maps to one HTTP-style status and a
//! short public message. Upstream details are logged, never returned.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Invalid action specified: {0}")]
    InvalidAction(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::InvalidRequest(_) | ServiceError::InvalidAction(_) => 400,
            ServiceError::NotConfigured(_) | ServiceError::Upstream(_) => 500,
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::InvalidRequest(msg) | ServiceError::NotConfigured(msg) => msg.clone(),
            ServiceError::InvalidAction(_) => "Invalid action specified".to_string(),
            ServiceError::Upstream(_) => "Upstream model request failed".to_string(),
        }
    }
}
