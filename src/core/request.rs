// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use crate::error::Error;
use serde::{Deserialize, Serialize};

/// The object to move. The key is the same in both stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub key: String,
}

impl MoveRequest {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.key.is_empty() {
            return Err(Error::InvalidRequest("key must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Which step a failed move stopped at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidRequest,
    Configuration,
    /// The destination already holds the object, nothing was changed
    Conflict,
    /// The destination could not be queried, nothing was changed
    ExistenceCheck,
    /// The copy failed, nothing is left at the destination
    Transfer,
    /// The copy succeeded but the source is still there.
    /// Only the source delete needs to be re-run.
    Deletion,
}

/// Outcome of one move, written as the response record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<FailureKind>,
}

impl MoveResult {
    pub fn moved(key: &str) -> Self {
        Self {
            success: true,
            message: format!("{} moved successfully", key),
            failure: None,
        }
    }

    pub fn failed(kind: FailureKind, err: &Error) -> Self {
        Self {
            success: false,
            message: err.to_string(),
            failure: Some(kind),
        }
    }

    /// True when the object now exists in both stores
    pub fn is_duplicated(&self) -> bool {
        self.failure == Some(FailureKind::Deletion)
    }
}
