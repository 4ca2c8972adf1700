// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use super::{checksum_sha1, ETag, UploadOptions};
use crate::{
    core::{metadata::ObjectMetadata, progress::ProgressTracker, store::ObjectStore},
    error::Error,
};
use std::sync::Arc;
use tokio::{
    io::{AsyncRead, AsyncReadExt},
    sync::Semaphore,
    task::JoinHandle,
};
use tracing::{debug, warn};

struct UploadPartResult {
    part_number: usize,
    e_tag_result: Result<ETag, Error>,
}

/// State of a multipart upload while its parts are in flight
struct PartUploader {
    store: Arc<dyn ObjectStore>,
    bucket_name: String,
    object_name: String,
    upload_id: Option<String>,
    next_part_number: usize,
    semaphore: Arc<Semaphore>,
    join_handles: Vec<JoinHandle<UploadPartResult>>,
    e_tags: Vec<ETag>,
    progress: Arc<ProgressTracker>,
}

impl PartUploader {
    fn new(
        store: Arc<dyn ObjectStore>,
        bucket_name: &str,
        object_name: &str,
        queue_size: usize,
        progress: Arc<ProgressTracker>,
    ) -> Self {
        Self {
            store,
            bucket_name: bucket_name.to_string(),
            object_name: object_name.to_string(),
            upload_id: None,
            next_part_number: 1,
            semaphore: Arc::new(Semaphore::new(queue_size)),
            join_handles: vec![],
            e_tags: vec![],
            progress,
        }
    }

    fn has_parts(&self) -> bool {
        self.next_part_number > 1
    }

    /// Spawns the upload of `bytes` as the next part, starting the
    /// multipart upload first if needed.
    ///
    /// Waits for a permit when `queue_size` parts are already in flight.
    async fn push_part(&mut self, bytes: Vec<u8>, metadata: &ObjectMetadata) -> Result<(), Error> {
        self.collect_finished().await?;

        let upload_id = match &self.upload_id {
            Some(upload_id) => upload_id.clone(),
            None => {
                let upload_id = self
                    .store
                    .start_multipart_upload(&self.bucket_name, &self.object_name, metadata)
                    .await?;
                debug!("Started multipart upload {} for {}", upload_id, self.object_name);

                self.upload_id = Some(upload_id.clone());
                upload_id
            }
        };

        let permit = self.semaphore.clone().acquire_owned().await?;

        let part_number = self.next_part_number;
        self.next_part_number += 1;

        let store = self.store.clone();
        let progress = self.progress.clone();
        let bucket_name = self.bucket_name.clone();
        let object_name = self.object_name.clone();

        self.join_handles.push(tokio::spawn(async move {
            let part_length = bytes.len() as u64;
            let checksum_sha1 = checksum_sha1(&bytes);

            let result = store
                .upload_part(
                    &bucket_name,
                    &object_name,
                    &upload_id,
                    part_number,
                    bytes,
                    checksum_sha1.clone(),
                )
                .await;

            drop(permit);

            if result.is_ok() {
                progress.record(part_length);
            }

            UploadPartResult {
                part_number,
                e_tag_result: result.map(|e_tag| ETag {
                    e_tag,
                    part_number,
                    checksum_sha1,
                }),
            }
        }));

        Ok(())
    }

    /// Awaits the parts that already finished, surfacing the first failure
    async fn collect_finished(&mut self) -> Result<(), Error> {
        let (finished, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.join_handles)
            .into_iter()
            .partition(|join_handle| join_handle.is_finished());

        self.join_handles = pending;

        for join_handle in finished {
            self.record(join_handle.await?)?;
        }

        Ok(())
    }

    fn record(
        &mut self,
        UploadPartResult {
            part_number,
            e_tag_result,
        }: UploadPartResult,
    ) -> Result<(), Error> {
        let e_tag = e_tag_result.map_err(|err| {
            warn!("Part {} of {} failed: {}", part_number, self.object_name, err);
            err
        })?;

        self.e_tags.push(e_tag);

        Ok(())
    }

    /// Waits for every part, then completes the multipart upload
    async fn complete(&mut self) -> Result<(), Error> {
        // Unawaited handles remain in `join_handles` for `abort`
        while !self.join_handles.is_empty() {
            let join_handle = self.join_handles.remove(0);

            self.record(join_handle.await?)?;
        }

        let upload_id = self
            .upload_id
            .as_deref()
            .ok_or(Error::internal("upload_id was None on multipart upload"))?;

        let mut e_tags = std::mem::take(&mut self.e_tags);
        e_tags.sort_by_key(|e_tag| e_tag.part_number);

        self.store
            .complete_multipart_upload(&self.bucket_name, &self.object_name, upload_id, e_tags)
            .await
    }

    /// Cancels in flight parts and aborts the multipart upload, if one was started
    async fn abort(&mut self) {
        for join_handle in self.join_handles.drain(..) {
            join_handle.abort();
        }

        if let Some(upload_id) = self.upload_id.take() {
            if let Err(err) = self
                .store
                .abort_multipart_upload(&self.bucket_name, &self.object_name, &upload_id)
                .await
            {
                warn!(
                    "Failed to abort multipart upload {} for {}: {}",
                    upload_id, self.object_name, err
                );
            }
        }
    }
}

/// Upload a object named `object_name` to the bucket named `bucket_name` via
/// a stream `S`, attaching `metadata` to the stored object
///
/// Objects smaller than `part_size` are written with a single put, larger
/// ones are split into parts uploaded concurrently, at most `queue_size`
/// at a time. Every part carries its SHA-1 checksum for the store to verify.
///
/// When `metadata.content_length` is known, the stream must yield exactly
/// that many bytes.
///
/// On any failure the multipart upload is aborted, so nothing is left
/// visible at the destination.
///
/// Returns the total amount of bytes uploaded
///
/// ---
/// Example Usage:
/// ```
///
/// let store: Arc<dyn ObjectStore> = ...;
/// let shark_image: tokio::fs::File = ...;
///
/// let bytes_uploaded: u64 = upload_object(
///     store,
///     "sharks",
///     "shark.jpg",
///     &ObjectMetadata::default(),
///     shark_image,
///     UploadOptions::default(),
///     progress,
///   )
///   .await?;
/// ```
pub async fn upload_object<S>(
    store: Arc<dyn ObjectStore>,
    bucket_name: &str,
    object_name: &str,
    metadata: &ObjectMetadata,
    mut stream: S,
    options: UploadOptions,
    progress: Arc<ProgressTracker>,
) -> Result<u64, Error>
where
    S: AsyncRead + Unpin,
{
    let UploadOptions {
        buffer_size,
        part_size,
        queue_size,
    } = options.normalized();

    let mut uploader = PartUploader::new(
        store.clone(),
        bucket_name,
        object_name,
        queue_size,
        progress.clone(),
    );

    let mut buffer = vec![0; buffer_size];
    let mut data_part_buffer = Vec::with_capacity(part_size);
    let mut total_bytes = 0u64;

    let result: Result<(), Error> = async {
        loop {
            let bytes_read = stream.read(&mut buffer[..]).await?;

            if bytes_read == 0 {
                break;
            }

            total_bytes += bytes_read as u64;
            data_part_buffer.extend_from_slice(&buffer[..bytes_read]);

            if data_part_buffer.len() >= part_size {
                let bytes = std::mem::replace(&mut data_part_buffer, Vec::with_capacity(part_size));

                uploader.push_part(bytes, metadata).await?;
            }
        }

        if let Some(expected) = metadata.content_length {
            if expected != total_bytes {
                return Err(Error::Truncated {
                    expected,
                    received: total_bytes,
                });
            }
        }

        if !uploader.has_parts() {
            let bytes = std::mem::take(&mut data_part_buffer);
            let part_length = bytes.len() as u64;
            let checksum_sha1 = checksum_sha1(&bytes);

            store
                .put_object(bucket_name, object_name, metadata, bytes, checksum_sha1)
                .await?;
            progress.record(part_length);

            return Ok(());
        }

        if !data_part_buffer.is_empty() {
            let bytes = std::mem::take(&mut data_part_buffer);

            uploader.push_part(bytes, metadata).await?;
        }

        uploader.complete().await
    }
    .await;

    if let Err(err) = result {
        uploader.abort().await;

        return Err(err);
    }

    Ok(total_bytes)
}
