use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid phototype: {0}")]
    InvalidPhototype(String),
    #[error("invalid appointment status: {0}")]
    InvalidStatus(String),
    #[error("invalid date (expected YYYY-MM-DD): {0}")]
    InvalidDate(String),
    #[error("invalid time (expected HH:MM): {0}")]
    InvalidTime(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
