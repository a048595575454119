use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode project: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("malformed project snapshot: {0}")]
    Malformed(#[source] serde_json::Error),
}

impl From<StoreError> for io::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Io(inner) => inner,
            other => io::Error::other(other.to_string()),
        }
    }
}
