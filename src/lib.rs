// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

pub mod config;
pub mod core;
pub mod error;

#[cfg(test)]
mod tests;

use crate::{
    config::Config,
    core::{
        copy::copy_object,
        get::{CacheSource, SourceTransport},
        guard::{check_not_exists, GuardPolicy},
        metadata::ObjectMetadata,
        progress::{log_progress, ProgressObserver},
        request::{FailureKind, MoveRequest, MoveResult},
        store::{ObjectStore, S3Store},
        upload::UploadOptions,
    },
    error::Error,
};
use std::sync::Arc;
use tracing::{error, info};

/// Moves objects from a cache-fronted source bucket into a destination bucket
///
/// A move checks the destination does not already hold the object, streams
/// the object from the source into the destination, then deletes it from
/// the source bucket.
///
/// ---
/// Example Usage:
/// ```
///
/// let config = Config::from_env()?;
///
/// let mover = Mover::from_config(&config).await;
///
/// let result: MoveResult = mover
///     .move_object(&MoveRequest::new("photos/shark.jpg"))
///     .await;
/// ```
pub struct Mover {
    pub source: Arc<dyn SourceTransport>,
    pub source_store: Arc<dyn ObjectStore>,
    pub destination_store: Arc<dyn ObjectStore>,
    pub source_bucket: String,
    pub destination_bucket: String,
    pub upload_options: UploadOptions,
    pub guard_policy: GuardPolicy,
    progress_observer: Option<ProgressObserver>,
}

impl Mover {
    /// Constructs a `Mover` from its collaborators, with default
    /// `UploadOptions` and a strict existence check
    pub fn new(
        source: Arc<dyn SourceTransport>,
        source_store: Arc<dyn ObjectStore>,
        destination_store: Arc<dyn ObjectStore>,
        source_bucket: &str,
        destination_bucket: &str,
    ) -> Self {
        Self {
            source,
            source_store,
            destination_store,
            source_bucket: source_bucket.to_string(),
            destination_bucket: destination_bucket.to_string(),
            upload_options: UploadOptions::default(),
            guard_policy: GuardPolicy::default(),
            progress_observer: None,
        }
    }

    /// Constructs a `Mover` talking to the endpoints in `config`
    pub async fn from_config(config: &Config) -> Self {
        let source_store = S3Store::new(&config.source).await;
        let destination_store = S3Store::new(&config.destination).await;

        Self::new(
            Arc::new(CacheSource::new(&config.cache_domain)),
            Arc::new(source_store),
            Arc::new(destination_store),
            &config.source.bucket_name,
            &config.destination.bucket_name,
        )
        .with_upload_options(UploadOptions::new(config.queue_size, config.part_size))
        .with_guard_policy(config.guard_policy)
    }

    pub fn with_upload_options(mut self, upload_options: UploadOptions) -> Self {
        self.upload_options = upload_options;
        self
    }

    pub fn with_guard_policy(mut self, guard_policy: GuardPolicy) -> Self {
        self.guard_policy = guard_policy;
        self
    }

    /// Replaces the default progress logging with `observer`
    pub fn with_progress_observer(mut self, observer: ProgressObserver) -> Self {
        self.progress_observer = Some(observer);
        self
    }

    /// Returns `Error::Conflict` if the destination bucket already has `object_name`
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let mover: Mover = ...;
    ///
    /// mover.check_not_exists("shark.jpg").await?;
    /// ```
    pub async fn check_not_exists(&self, object_name: &str) -> Result<(), Error> {
        check_not_exists(
            self.destination_store.as_ref(),
            &self.destination_bucket,
            object_name,
            self.guard_policy,
        )
        .await
    }

    /// Streams `object_name` from the source into the destination bucket
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let mover: Mover = ...;
    ///
    /// let metadata: ObjectMetadata = mover.copy_object("shark.jpg").await?;
    /// ```
    pub async fn copy_object(&self, object_name: &str) -> Result<ObjectMetadata, Error> {
        let observer = self
            .progress_observer
            .clone()
            .unwrap_or_else(|| log_progress(object_name));

        copy_object(
            self.source.as_ref(),
            self.destination_store.clone(),
            &self.destination_bucket,
            object_name,
            self.upload_options,
            observer,
        )
        .await
    }

    /// Deletes `object_name` from the source bucket
    pub async fn delete_source(&self, object_name: &str) -> Result<(), Error> {
        info!("Deleting {} from {}", object_name, self.source_bucket);

        self.source_store
            .delete_object(&self.source_bucket, object_name)
            .await
    }

    /// Runs one move. Never fails: every error ends up in the returned `MoveResult`.
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let mover: Mover = ...;
    ///
    /// let result = mover.move_object(&MoveRequest::new("shark.jpg")).await;
    ///
    /// if result.is_duplicated() {
    ///     // Only the source delete needs to be retried
    ///     mover.delete_source("shark.jpg").await?;
    /// }
    /// ```
    pub async fn move_object(&self, request: &MoveRequest) -> MoveResult {
        match self.try_move(request).await {
            Ok(()) => MoveResult::moved(&request.key),
            Err((kind, err)) => {
                error!("Moving {} failed ({:?}): {}", request.key, kind, err);

                MoveResult::failed(kind, &err)
            }
        }
    }

    async fn try_move(&self, request: &MoveRequest) -> Result<(), (FailureKind, Error)> {
        request
            .validate()
            .map_err(|err| (FailureKind::InvalidRequest, err))?;

        self.check_not_exists(&request.key)
            .await
            .map_err(|err| match err {
                Error::Conflict { .. } => (FailureKind::Conflict, err),
                err => (FailureKind::ExistenceCheck, err),
            })?;

        self.copy_object(&request.key)
            .await
            .map_err(|err| (FailureKind::Transfer, err))?;

        self.delete_source(&request.key)
            .await
            .map_err(|err| (FailureKind::Deletion, err))?;

        Ok(())
    }
}
