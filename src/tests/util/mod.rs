// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

pub mod memory_store;
pub mod test_error;
pub mod test_harness;

use crate::core::{metadata::ObjectMetadata, progress::TransferProgress};
use std::collections::BTreeMap;

pub const MIB: usize = 1_048_576;

/// Deterministic, non repeating-per-part test content of `length` bytes
pub fn test_bytes(length: usize) -> Vec<u8> {
    (0..length)
        .map(|index| ((index * 31 + index / 251) % 256) as u8)
        .collect()
}

pub fn jpeg_metadata(owner: &str) -> ObjectMetadata {
    ObjectMetadata {
        content_type: Some("image/jpeg".to_string()),
        cache_control: Some("public, max-age=86400".to_string()),
        metadata: BTreeMap::from([("owner".to_string(), owner.to_string())]),
        ..Default::default()
    }
}

/// Returns true if `observations` never go backwards
pub fn is_monotonic(observations: &[TransferProgress]) -> bool {
    observations
        .windows(2)
        .all(|pair| pair[0].bytes_transferred <= pair[1].bytes_transferred)
}
