// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)
use crate::error::Error;
use aws_sdk_s3::Client;
use tracing::debug;

/// Removes the source copy of a moved object, `object_name` in `bucket_name`
///
/// S3 compatible stores answer a delete of a missing key with success,
/// so a repeated delete after a partial move is harmless.
///
/// ---
/// Example Usage:
/// ```
///
/// let client: Client = ...;
///
/// delete_object(&client, "uploads", "photos/shark.jpg").await?;
/// ```
pub async fn delete_object(
    client: &Client,
    bucket_name: &str,
    object_name: &str,
) -> Result<(), Error> {
    let output = client
        .delete_object()
        .bucket(bucket_name)
        .key(object_name)
        .send()
        .await
        .map_err(Error::sdk)?;

    debug!(
        "Deleted {} from {} (version {})",
        object_name,
        bucket_name,
        output.version_id().unwrap_or("none")
    );

    Ok(())
}
