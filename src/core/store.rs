// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use super::{
    delete::delete_object,
    head::object_exists,
    metadata::ObjectMetadata,
    upload::{util::*, ETag},
};
use crate::{config::StoreConfig, error::Error};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{config::Credentials, Client};
use std::sync::Arc;

/// Operations the mover needs from an object store.
///
/// Objects written through the multipart calls must only become
/// visible once `complete_multipart_upload` succeeds.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Returns `Ok(false)` only when the store answered "not found"
    async fn object_exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, Error>;

    async fn put_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        metadata: &ObjectMetadata,
        bytes: Vec<u8>,
        checksum_sha1: String,
    ) -> Result<(), Error>;

    async fn start_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        metadata: &ObjectMetadata,
    ) -> Result<String, Error>;

    /// Returns the e-tag of the stored part
    async fn upload_part(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
        part_number: usize,
        bytes: Vec<u8>,
        checksum_sha1: String,
    ) -> Result<String, Error>;

    async fn complete_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
        e_tags: Vec<ETag>,
    ) -> Result<(), Error>;

    async fn abort_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
    ) -> Result<(), Error>;

    async fn delete_object(&self, bucket_name: &str, object_name: &str) -> Result<(), Error>;
}

/// `ObjectStore` backed by the S3 API
#[derive(Clone)]
pub struct S3Store {
    pub client: Arc<Client>,
}

impl S3Store {
    /// Constructs a new client from the endpoint and static credentials in `config`
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let config: StoreConfig = ...;
    ///
    /// let store = S3Store::new(&config).await;
    /// ```
    pub async fn new(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "cdn-move",
        );

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Self {
            client: Arc::new(Client::from_conf(s3_config)),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn object_exists(&self, bucket_name: &str, object_name: &str) -> Result<bool, Error> {
        object_exists(&self.client, bucket_name, object_name).await
    }

    async fn put_object(
        &self,
        bucket_name: &str,
        object_name: &str,
        metadata: &ObjectMetadata,
        bytes: Vec<u8>,
        checksum_sha1: String,
    ) -> Result<(), Error> {
        upload(
            &self.client,
            bucket_name,
            object_name,
            metadata,
            bytes,
            checksum_sha1,
        )
        .await
    }

    async fn start_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        metadata: &ObjectMetadata,
    ) -> Result<String, Error> {
        start_multipart_upload(&self.client, bucket_name, object_name, metadata).await
    }

    async fn upload_part(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
        part_number: usize,
        bytes: Vec<u8>,
        checksum_sha1: String,
    ) -> Result<String, Error> {
        upload_part(
            &self.client,
            bucket_name,
            object_name,
            upload_id,
            part_number,
            bytes,
            checksum_sha1,
        )
        .await
    }

    async fn complete_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
        e_tags: Vec<ETag>,
    ) -> Result<(), Error> {
        complete_multipart_upload(&self.client, e_tags, bucket_name, object_name, upload_id)
            .await
    }

    async fn abort_multipart_upload(
        &self,
        bucket_name: &str,
        object_name: &str,
        upload_id: &str,
    ) -> Result<(), Error> {
        abort_multipart_upload(&self.client, bucket_name, object_name, upload_id).await
    }

    async fn delete_object(&self, bucket_name: &str, object_name: &str) -> Result<(), Error> {
        delete_object(&self.client, bucket_name, object_name).await
    }
}
