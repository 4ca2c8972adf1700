// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use crate::{
    core::{
        metadata::ObjectMetadata,
        store::ObjectStore,
        upload::{checksum_sha1, ETag},
    },
    error::Error,
};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Mutex, PoisonError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub metadata: ObjectMetadata,
}

/// Failures a `MemoryStore` can be told to produce
#[derive(Debug, Clone, Default)]
pub struct StoreFaults {
    /// `object_exists` fails with a non "not found" error
    pub fail_head: bool,
    pub fail_put: bool,
    /// `upload_part` for this part number is rejected
    pub fail_part: Option<usize>,
    /// this part number gets a byte flipped on the way in, so its checksum no longer matches
    pub corrupt_part: Option<usize>,
    pub fail_delete: bool,
}

struct PendingUpload {
    bucket_name: String,
    object_name: String,
    metadata: ObjectMetadata,
    parts: BTreeMap<usize, (String, Vec<u8>)>,
}

#[derive(Default)]
struct StoreState {
    objects: HashMap<(String, String), StoredObject>,
    uploads: HashMap<String, PendingUpload>,
    next_upload_id: usize,
    puts: usize,
    completed_uploads: usize,
    aborted_uploads: usize,
}

/// In memory `ObjectStore`.
///
/// Multipart uploads are staged aside and only become visible
/// objects on `complete_multipart_upload`, and every part and put
/// has its SHA-1 checksum verified.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
    faults: Mutex<StoreFaults>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn faults(&self) -> StoreFaults {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set_faults(&self, faults: StoreFaults) {
        *self.faults.lock().unwrap_or_else(PoisonError::into_inner) = faults;
    }

    pub fn insert(
        &self,
        bucket_name: &str,
        object_name: &str,
        bytes: Vec<u8>,
        metadata: ObjectMetadata,
    ) {
        self.state().objects.insert(
            (bucket_name.to_string(), object_name.to_string()),
            StoredObject { bytes, metadata },
        );
    }

    pub fn object(&self, bucket_name: &str, object_name: &str) -> Option<StoredObject> {
        self.state()
            .objects
            .get(&(bucket_name.to_string(), object_name.to_string()))
            .cloned()
    }

    pub fn pending_uploads(&self) -> usize {
        self.state().uploads.len()
    }

    pub fn puts(&self) -> usize {
        self.state().puts
    }

    pub fn completed_uploads(&self) -> usize {
        self.state().completed_uploads
    }

    pub fn aborted_uploads(&self) -> usize {
        self.state().aborted_uploads
    }
}

fn verify_checksum(bytes: &[u8], checksum: &str) -> Result<(), Error> {
    let actual = checksum_sha1(bytes);

    if actual != checksum {
        return Err(Error::Checksum(format!(
            "expected sha1 {}, computed {}",
            checksum, actual
        )));
    }

    Ok(())
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn object_exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, Error> {
        if self.faults().fail_head {
            return Err(Error::sdk("AccessDenied: head_object is not allowed"));
        }

        Ok(self.object(bucket_name, object_name).is_some())
    }

    async fn put_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        metadata: &ObjectMetadata,
        bytes: Vec<u8>,
        checksum_sha1: String,
    ) -> Result<(), Error> {
        if self.faults().fail_put {
            return Err(Error::sdk("InternalError: put_object rejected"));
        }

        verify_checksum(&bytes, &checksum_sha1)?;

        let mut metadata = metadata.clone();
        metadata.content_length = Some(bytes.len() as u64);

        let mut state = self.state();
        state.puts += 1;
        state.objects.insert(
            (bucket_name.to_string(), object_name.to_string()),
            StoredObject { bytes, metadata },
        );

        Ok(())
    }

    async fn start_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        metadata: &ObjectMetadata,
    ) -> Result<String, Error> {
        let mut state = self.state();
        state.next_upload_id += 1;

        let upload_id = format!("upload-{}", state.next_upload_id);
        state.uploads.insert(
            upload_id.clone(),
            PendingUpload {
                bucket_name: bucket_name.to_string(),
                object_name: object_name.to_string(),
                metadata: metadata.clone(),
                parts: BTreeMap::new(),
            },
        );

        Ok(upload_id)
    }

    async fn upload_part(
        &self,
        _bucket_name: &str,
        _object_name: &str,
        upload_id: &str,
        part_number: usize,
        mut bytes: Vec<u8>,
        checksum_sha1: String,
    ) -> Result<String, Error> {
        let faults = self.faults();

        if faults.fail_part == Some(part_number) {
            return Err(Error::sdk(format!(
                "RequestTimeout: part {} was not received",
                part_number
            )));
        }

        if faults.corrupt_part == Some(part_number) {
            if let Some(byte) = bytes.first_mut() {
                *byte ^= 0xff;
            }
        }

        verify_checksum(&bytes, &checksum_sha1)?;

        let e_tag = format!("\"{}-{}\"", upload_id, part_number);

        let mut state = self.state();
        let upload = state
            .uploads
            .get_mut(upload_id)
            .ok_or_else(|| Error::sdk(format!("NoSuchUpload: {}", upload_id)))?;

        upload.parts.insert(part_number, (e_tag.clone(), bytes));

        Ok(e_tag)
    }

    async fn complete_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
        e_tags: Vec<ETag>,
    ) -> Result<(), Error> {
        let mut state = self.state();
        let upload = state
            .uploads
            .remove(upload_id)
            .ok_or_else(|| Error::sdk(format!("NoSuchUpload: {}", upload_id)))?;

        if upload.bucket_name != bucket_name || upload.object_name != object_name {
            return Err(Error::sdk("InvalidRequest: upload belongs to another object"));
        }

        let mut bytes = vec![];

        for ETag {
            e_tag, part_number, ..
        } in &e_tags
        {
            match upload.parts.get(part_number) {
                Some((stored_e_tag, part)) if stored_e_tag == e_tag => {
                    bytes.extend_from_slice(part);
                }
                _ => {
                    return Err(Error::sdk(format!("InvalidPart: {}", part_number)));
                }
            }
        }

        let mut metadata = upload.metadata;
        metadata.content_length = Some(bytes.len() as u64);

        state.completed_uploads += 1;
        state.objects.insert(
            (bucket_name.to_string(), object_name.to_string()),
            StoredObject { bytes, metadata },
        );

        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        _bucket_name: &str,
        _object_name: &str,
        upload_id: &str,
    ) -> Result<(), Error> {
        let mut state = self.state();

        state.uploads.remove(upload_id);
        state.aborted_uploads += 1;

        Ok(())
    }

    async fn delete_object(&self, bucket_name: &str, object_name: &str) -> Result<(), Error> {
        if self.faults().fail_delete {
            return Err(Error::sdk("AccessDenied: delete_object is not allowed"));
        }

        self.state()
            .objects
            .remove(&(bucket_name.to_string(), object_name.to_string()));

        Ok(())
    }
}
