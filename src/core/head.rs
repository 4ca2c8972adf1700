// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use crate::error::Error;
use aws_sdk_s3::Client;

/// Returns true if an object by `object_name` exists in `bucket_name`
///
/// Only a "not found" answer maps to `false`, every other failure
/// (credentials, permissions, network) is returned as an `Error`.
///
/// ---
/// Example Usage:
/// ```
///
/// let client: Client = ...;
///
/// if object_exists(&client, "sharks", "shark.jpg").await? {
///     ...
/// }
/// ```
pub async fn object_exists(
    client: &Client,
    bucket_name: &str,
    object_name: &str,
) -> Result<bool, Error> {
    match client
        .head_object()
        .bucket(bucket_name)
        .key(object_name)
        .send()
        .await
    {
        Ok(_) => Ok(true),
        Err(err) => {
            let service_error = err.into_service_error();

            if service_error.is_not_found() {
                return Ok(false);
            }

            Err(Error::sdk(service_error))
        }
    }
}
