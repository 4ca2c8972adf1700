// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)
use super::ETag;
use crate::{
    core::metadata::{parse_expires, parse_retain_until_date, ObjectMetadata},
    error::Error,
};
use aws_sdk_s3::{
    primitives::{ByteStream, DateTime},
    types::{
        ChecksumAlgorithm, CompletedMultipartUpload, CompletedPart, ObjectLockLegalHoldStatus,
        ObjectLockMode,
    },
    Client,
};
use std::collections::HashMap;

/// Converted forms of the `ObjectMetadata` fields the S3 API does not take as strings
///
/// An `expires` that is not an HTTP-date is left out.
pub(crate) struct S3Attributes {
    pub expires: Option<DateTime>,
    pub metadata: Option<HashMap<String, String>>,
    pub object_lock_mode: Option<ObjectLockMode>,
    pub object_lock_retain_until_date: Option<DateTime>,
    pub object_lock_legal_hold_status: Option<ObjectLockLegalHoldStatus>,
}

impl S3Attributes {
    pub(crate) fn from_metadata(metadata: &ObjectMetadata) -> Result<Self, Error> {
        Ok(Self {
            expires: metadata.expires.as_deref().and_then(parse_expires),
            metadata: (!metadata.metadata.is_empty())
                .then(|| metadata.metadata.clone().into_iter().collect()),
            object_lock_mode: metadata
                .object_lock_mode
                .as_deref()
                .map(ObjectLockMode::from),
            object_lock_retain_until_date: metadata
                .object_lock_retain_until_date
                .as_deref()
                .map(parse_retain_until_date)
                .transpose()?,
            object_lock_legal_hold_status: metadata
                .object_lock_legal_hold_status
                .as_deref()
                .map(ObjectLockLegalHoldStatus::from),
        })
    }
}

pub async fn upload(
    client: &Client,
    bucket_name: &str,
    object_name: &str,
    metadata: &ObjectMetadata,
    bytes: Vec<u8>,
    checksum_sha1: String,
) -> Result<(), Error> {
    let attributes = S3Attributes::from_metadata(metadata)?;

    client
        .put_object()
        .bucket(bucket_name)
        .key(object_name)
        .content_length(bytes.len() as i64)
        .checksum_sha1(checksum_sha1)
        .set_cache_control(metadata.cache_control.clone())
        .set_content_disposition(metadata.content_disposition.clone())
        .set_content_encoding(metadata.content_encoding.clone())
        .set_content_language(metadata.content_language.clone())
        .set_content_type(metadata.content_type.clone())
        .set_expires(attributes.expires)
        .set_metadata(attributes.metadata)
        .set_object_lock_mode(attributes.object_lock_mode)
        .set_object_lock_retain_until_date(attributes.object_lock_retain_until_date)
        .set_object_lock_legal_hold_status(attributes.object_lock_legal_hold_status)
        .body(ByteStream::from(bytes))
        .send()
        .await
        .map_err(Error::sdk)?;

    Ok(())
}

pub async fn start_multipart_upload(
    client: &Client,
    bucket_name: &str,
    object_name: &str,
    metadata: &ObjectMetadata,
) -> Result<String, Error> {
    let attributes = S3Attributes::from_metadata(metadata)?;

    client
        .create_multipart_upload()
        .bucket(bucket_name)
        .key(object_name)
        .checksum_algorithm(ChecksumAlgorithm::Sha1)
        .set_cache_control(metadata.cache_control.clone())
        .set_content_disposition(metadata.content_disposition.clone())
        .set_content_encoding(metadata.content_encoding.clone())
        .set_content_language(metadata.content_language.clone())
        .set_content_type(metadata.content_type.clone())
        .set_expires(attributes.expires)
        .set_metadata(attributes.metadata)
        .set_object_lock_mode(attributes.object_lock_mode)
        .set_object_lock_retain_until_date(attributes.object_lock_retain_until_date)
        .set_object_lock_legal_hold_status(attributes.object_lock_legal_hold_status)
        .send()
        .await
        .map_err(Error::sdk)?
        .upload_id
        .ok_or(Error::internal(
            "upload_id was None for a valid multipart call",
        ))
}

pub async fn abort_multipart_upload(
    client: &Client,
    bucket_name: &str,
    object_name: &str,
    upload_id: &str,
) -> Result<(), Error> {
    client
        .abort_multipart_upload()
        .bucket(bucket_name)
        .key(object_name)
        .upload_id(upload_id)
        .send()
        .await
        .map_err(Error::sdk)?;

    Ok(())
}

pub async fn upload_part(
    client: &Client,
    bucket_name: &str,
    object_name: &str,
    upload_id: &str,
    part_number: usize,
    bytes: Vec<u8>,
    checksum_sha1: String,
) -> Result<String, Error> {
    client
        .upload_part()
        .bucket(bucket_name)
        .key(object_name)
        .upload_id(upload_id)
        .part_number(part_number as i32)
        .content_length(bytes.len() as i64)
        .checksum_sha1(checksum_sha1)
        .body(ByteStream::from(bytes))
        .send()
        .await
        .map_err(Error::sdk)?
        .e_tag
        .ok_or(Error::internal("e_tag was None on upload_part"))
}

pub async fn complete_multipart_upload(
    client: &Client,
    e_tags: Vec<ETag>,
    bucket_name: &str,
    object_name: &str,
    upload_id: &str,
) -> Result<(), Error> {
    let completed_parts = e_tags
        .into_iter()
        .map(
            |ETag {
                 e_tag,
                 part_number,
                 checksum_sha1,
             }| {
                CompletedPart::builder()
                    .e_tag(e_tag)
                    .part_number(part_number as i32)
                    .checksum_sha1(checksum_sha1)
                    .build()
            },
        )
        .collect::<Vec<CompletedPart>>();

    let completed_multipart_upload = CompletedMultipartUpload::builder()
        .set_parts(Some(completed_parts))
        .build();

    client
        .complete_multipart_upload()
        .bucket(bucket_name)
        .key(object_name)
        .multipart_upload(completed_multipart_upload)
        .upload_id(upload_id)
        .send()
        .await
        .map_err(Error::sdk)?;

    Ok(())
}
