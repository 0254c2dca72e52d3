use thiserror::Error;

/// Errors that can occur while talking to the remote media store.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The store rejected or failed an upload.
    #[error("upload failed: {0}")]
    UploadFailed(String),

    /// The store rejected or failed a deletion.
    #[error("delete failed: {0}")]
    DeleteFailed(String),

    /// The store answered with a body we could not interpret.
    #[error("unexpected media store response: {0}")]
    InvalidResponse(String),

    /// Transport-level failure before any store semantics applied.
    #[error("media store request failed: {0}")]
    Http(#[from] reqwest::Error),
}
