use thiserror::Error;

#[derive(Debug, Error)]
pub enum CardError {
    #[error("CSV payload could not be tokenized: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file name: {0:?}")]
    InvalidName(String),

    #[error("file not found: {0}")]
    NotFound(String),

    #[error("Missing csv")]
    EmptyPayload,
}

pub type Result<T> = std::result::Result<T, CardError>;
