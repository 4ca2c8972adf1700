// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use super::store::ObjectStore;
use crate::error::Error;
use std::str::FromStr;
use tracing::{info, warn};

/// How the existence check treats a destination query that failed
/// for a reason other than "not found"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GuardPolicy {
    /// The failure aborts the move
    #[default]
    Strict,
    /// The failure is logged and the move carries on
    Lenient,
}

impl FromStr for GuardPolicy {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(Error::Configuration(format!(
                "unknown existence check policy: {}",
                other
            ))),
        }
    }
}

/// Makes sure `object_name` is not already present in `bucket_name`
///
/// Returns `Error::Conflict` if the object exists.
///
/// ---
/// Example Usage:
/// ```
///
/// let store: Arc<dyn ObjectStore> = ...;
///
/// check_not_exists(
///     store.as_ref(),
///     "sharks",
///     "shark.jpg",
///     GuardPolicy::Strict,
/// ).await?;
/// ```
pub async fn check_not_exists(
    store: &dyn ObjectStore,
    bucket_name: &str,
    object_name: &str,
    policy: GuardPolicy,
) -> Result<(), Error> {
    info!("Checking {} does not exist in {}", object_name, bucket_name);

    match store.object_exists(bucket_name, object_name).await {
        Ok(true) => Err(Error::Conflict {
            bucket: bucket_name.to_string(),
            key: object_name.to_string(),
        }),
        Ok(false) => Ok(()),
        Err(err) => match policy {
            GuardPolicy::Strict => Err(err),
            GuardPolicy::Lenient => {
                warn!(
                    "Existence check for {} in {} failed, continuing: {}",
                    object_name, bucket_name, err
                );

                Ok(())
            }
        },
    }
}
