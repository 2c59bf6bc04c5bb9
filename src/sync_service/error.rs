use thiserror::Error;

use crate::{catalog_source, data_layer_error::DataLayerError, hash_svc};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("course list for term {term_code} was checked {hours_since_check:.1} hours ago")]
    Stale { term_code: String, hours_since_check: f64 },
    #[error("a synchronization of term {term_code} is already running")]
    InProgress { term_code: String },
    #[error("catalog fetch failed: {0}")]
    Upstream(#[from] catalog_source::error::Error),
    #[error(transparent)]
    DataLayer(#[from] DataLayerError),
    #[error(transparent)]
    Fingerprint(#[from] hash_svc::error::Error),
    #[error("synchronization task did not complete: {0}")]
    TaskError(#[from] tokio::task::JoinError),
}

impl Error {
    ///
    /// Whether the request was rejected before any work started,
    /// i.e. the trigger should answer with a conflict
    ///
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Stale { .. } | Error::InProgress { .. })
    }
}
