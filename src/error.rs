// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use std::fmt::Debug;
use thiserror::Error;
use tokio::{sync::AcquireError, task::JoinError};

/// Error enum to wrap various errors that can occur inside the crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Object {key} already exists in bucket {bucket}")]
    Conflict { bucket: String, key: String },
    #[error("Object store error: {0}")]
    SdkError(String),
    #[error("Source error: {0}")]
    Source(String),
    #[error("Checksum mismatch: {0}")]
    Checksum(String),
    #[error("Source body ended after {received} of {expected} bytes")]
    Truncated { expected: u64, received: u64 },
    #[error(transparent)]
    StdIo(#[from] std::io::Error),
    #[error(transparent)]
    JoinError(#[from] JoinError),
    #[error(transparent)]
    AcquireError(#[from] AcquireError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn internal(message: &str) -> Self {
        Self::Internal(message.to_string())
    }

    pub fn sdk<E>(err: E) -> Self
    where
        E: Debug,
    {
        Self::SdkError(format!("{:?}", err))
    }

    pub fn http<E>(err: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::Source(err.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::http(err)
    }
}
