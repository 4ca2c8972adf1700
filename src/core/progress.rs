// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use std::sync::{Arc, Mutex, PoisonError};
use tracing::info;

/// A snapshot of how far a transfer has gotten.
///
/// `total_bytes` is the length the source reported up front, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    pub bytes_transferred: u64,
    pub total_bytes: Option<u64>,
}

/// Callback receiving every `TransferProgress` observation
pub type ProgressObserver = Arc<dyn Fn(TransferProgress) + Send + Sync>;

/// Returns a `ProgressObserver` that logs each observation for `object_name`
pub fn log_progress(object_name: &str) -> ProgressObserver {
    let object_name = object_name.to_string();

    Arc::new(move |progress: TransferProgress| match progress.total_bytes {
        Some(total_bytes) => info!(
            "{} {}/{} bytes copied",
            object_name, progress.bytes_transferred, total_bytes
        ),
        None => info!("{} {} bytes copied", object_name, progress.bytes_transferred),
    })
}

/// Accumulates acknowledged bytes across concurrent part uploads.
///
/// The counter is updated and the observer called under the same lock,
/// so observers see `bytes_transferred` in non-decreasing order.
pub struct ProgressTracker {
    total_bytes: Option<u64>,
    bytes_transferred: Mutex<u64>,
    observer: ProgressObserver,
}

impl ProgressTracker {
    pub fn new(total_bytes: Option<u64>, observer: ProgressObserver) -> Self {
        Self {
            total_bytes,
            bytes_transferred: Mutex::new(0),
            observer,
        }
    }

    /// Records `bytes` as acknowledged by the destination and notifies the observer
    pub fn record(&self, bytes: u64) {
        let mut bytes_transferred = self
            .bytes_transferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        *bytes_transferred += bytes;

        (self.observer)(TransferProgress {
            bytes_transferred: *bytes_transferred,
            total_bytes: self.total_bytes,
        });
    }

    pub fn bytes_transferred(&self) -> u64 {
        *self
            .bytes_transferred
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
