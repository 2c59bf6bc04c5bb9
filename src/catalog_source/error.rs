use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read catalog snapshot: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse catalog snapshot: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("record {record} does not belong to scope {scope}")]
    ScopeMismatch { scope: String, record: String },
}
