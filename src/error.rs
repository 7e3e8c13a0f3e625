//! Error type shared across the crate.
//!
//! "Normal absence" (a named site, drive or folder that does not exist) is
//! reported as `NotFound`; transport faults from the Graph API are carried
//! through unmodified in `Transport` and are never retried here.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Empty result: {0}")]
    Empty(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Document has no web URL")]
    InvalidIdentity,

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Upload response empty")]
    UploadEmpty,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(err.to_string())
    }
}
