// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

pub mod upload_object;
pub mod util;

use base64::{engine::general_purpose::STANDARD, Engine};
use sha1::{Digest, Sha1};
use tracing::warn;

/// Smallest part size S3 compatible stores accept for every part but the last
pub const MIN_PART_SIZE: usize = 5_242_880;
pub const MIN_BUFFER_SIZE: usize = 4_096;

/// The e-tag and checksum the store returned for a part, recorded so the
/// multipart upload can be completed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag {
    pub e_tag: String,
    pub part_number: usize,
    pub checksum_sha1: String,
}

/// Options to control how `upload_object` streams an object
///
/// `buffer_size` is the read size from the input stream, and cannot be
/// lower than `4_096` *(Overwrites to `4_096` if lower)*
///
/// `part_size` is the size of each multipart chunk, and cannot be lower
/// than `5_242_880` *(Overwrites to `5_242_880` if lower)*
///
/// `queue_size` is how many parts may be in flight at once, and cannot
/// be lower than `1` *(Overwrites to `1` if lower)*
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadOptions {
    pub buffer_size: usize,
    pub part_size: usize,
    pub queue_size: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            buffer_size: 100_000,
            part_size: MIN_PART_SIZE,
            queue_size: 4,
        }
    }
}

impl UploadOptions {
    pub fn new(queue_size: usize, part_size: usize) -> Self {
        Self {
            queue_size,
            part_size,
            ..Default::default()
        }
    }

    /// Returns the options with every value raised to its minimum
    pub fn normalized(self) -> Self {
        if self.part_size < MIN_PART_SIZE {
            warn!(
                "part size {} is below the minimum, using {}",
                self.part_size, MIN_PART_SIZE
            );
        }

        Self {
            buffer_size: self.buffer_size.max(MIN_BUFFER_SIZE),
            part_size: self.part_size.max(MIN_PART_SIZE),
            queue_size: self.queue_size.max(1),
        }
    }
}

/// Base64 encoded SHA-1 digest of `bytes`, as carried in `x-amz-checksum-sha1`
pub fn checksum_sha1(bytes: &[u8]) -> String {
    STANDARD.encode(Sha1::digest(bytes))
}
