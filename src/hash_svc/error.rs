use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to serialize fingerprint payload: {0}")]
    SerializeError(#[from] serde_json::Error),
}
