// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use super::{
    conduit::{conduit, pump},
    get::SourceTransport,
    metadata::ObjectMetadata,
    progress::{ProgressObserver, ProgressTracker},
    store::ObjectStore,
    upload::{upload_object::upload_object, UploadOptions},
};
use crate::error::Error;
use std::sync::Arc;
use tracing::info;

/// Number of source chunks the conduit holds before the source read waits
pub const CONDUIT_CAPACITY: usize = 16;

/// Copies `object_name` from `source` into `bucket_name` on `store`
///
/// The source headers become the destination object's metadata. The
/// body is streamed from the source into the upload through a bounded
/// conduit, so the object is never held in memory as a whole.
///
/// Returns the metadata stored with the destination object
///
/// ---
/// Example Usage:
/// ```
///
/// let source: CacheSource = ...;
/// let store: Arc<dyn ObjectStore> = ...;
///
/// let metadata: ObjectMetadata = copy_object(
///     &source,
///     store,
///     "sharks",
///     "shark.jpg",
///     UploadOptions::default(),
///     log_progress("shark.jpg"),
/// ).await?;
/// ```
pub async fn copy_object(
    source: &dyn SourceTransport,
    store: Arc<dyn ObjectStore>,
    bucket_name: &str,
    object_name: &str,
    options: UploadOptions,
    observer: ProgressObserver,
) -> Result<ObjectMetadata, Error> {
    let headers = source.head_object(object_name).await?;
    let mut metadata = ObjectMetadata::from_headers(&headers);
    metadata.check_dates()?;

    info!(
        "Copying {} to {}",
        source.object_url(object_name),
        bucket_name
    );

    let body = source.get_object(object_name).await?;
    let (writer, reader) = conduit(CONDUIT_CAPACITY);
    let pump_handle = tokio::spawn(pump(body, writer));

    let progress = Arc::new(ProgressTracker::new(metadata.content_length, observer));

    let upload_result = upload_object(
        store,
        bucket_name,
        object_name,
        &metadata,
        reader,
        options,
        progress,
    )
    .await;

    let pump_result = pump_handle.await.map_err(Error::from).and_then(|result| result);

    let bytes_uploaded = match (upload_result, pump_result) {
        (Ok(bytes_uploaded), Ok(_)) => bytes_uploaded,
        (_, Err(err @ Error::Source(_))) => return Err(err),
        (Err(err), _) => return Err(err),
        (Ok(_), Err(err)) => return Err(err),
    };

    metadata.content_length = Some(bytes_uploaded);

    Ok(metadata)
}
