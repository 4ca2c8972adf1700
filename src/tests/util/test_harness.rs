// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use super::{memory_source::MemorySource, memory_store::MemoryStore, test_error::TestError};
use crate::{
    core::{
        metadata::ObjectMetadata,
        progress::TransferProgress,
        upload::{UploadOptions, MIN_PART_SIZE},
    },
    Mover,
};
use std::{
    future::Future,
    sync::{Arc, Mutex, PoisonError},
};

pub const SOURCE_BUCKET: &str = "source-bucket";
pub const DESTINATION_BUCKET: &str = "destination-bucket";

/// A source bucket fronted by a `MemorySource`, and a destination bucket
pub struct TestHarness {
    pub source_store: Arc<MemoryStore>,
    pub destination_store: Arc<MemoryStore>,
    pub source: Arc<MemorySource>,
    progress: Arc<Mutex<Vec<TransferProgress>>>,
}

impl TestHarness {
    pub fn new() -> Self {
        let source_store = Arc::new(MemoryStore::new());

        Self {
            source: Arc::new(MemorySource::new(source_store.clone(), SOURCE_BUCKET)),
            source_store,
            destination_store: Arc::new(MemoryStore::new()),
            progress: Arc::new(Mutex::new(vec![])),
        }
    }

    /// A `Mover` over the harness stores, recording progress observations
    pub fn mover(&self) -> Mover {
        let progress = self.progress.clone();

        Mover::new(
            self.source.clone(),
            self.source_store.clone(),
            self.destination_store.clone(),
            SOURCE_BUCKET,
            DESTINATION_BUCKET,
        )
        .with_upload_options(UploadOptions::new(2, MIN_PART_SIZE))
        .with_progress_observer(Arc::new(move |observation: TransferProgress| {
            progress
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(observation);
        }))
    }

    pub fn put_source(&self, object_name: &str, bytes: Vec<u8>, metadata: ObjectMetadata) {
        self.source_store
            .insert(SOURCE_BUCKET, object_name, bytes, metadata);
    }

    pub fn observations(&self) -> Vec<TransferProgress> {
        self.progress
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs `test`, then fails it if a multipart upload was left
    /// pending at the destination
    pub async fn run_test<T, Fut>(self, test: T) -> Result<(), Box<dyn std::error::Error>>
    where
        T: FnOnce(Arc<TestHarness>) -> Fut,
        Fut: Future<Output = Result<(), Box<dyn std::error::Error>>>,
    {
        let harness = Arc::new(self);
        let result = test(harness.clone()).await;

        let pending = harness.destination_store.pending_uploads();
        if result.is_ok() && pending != 0 {
            return Err(Box::new(TestError(format!(
                "{} multipart upload(s) left pending at the destination",
                pending
            ))));
        }

        result
    }
}
