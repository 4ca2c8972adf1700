// Authors: Robert Lopez
// License: MIT (See `LICENSE.md`)

use crate::error::Error;
use aws_sdk_s3::primitives::{DateTime, DateTimeFormat};
use reqwest::header::{
    HeaderMap, CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE,
    CONTENT_LENGTH, CONTENT_TYPE, EXPIRES,
};
use std::collections::BTreeMap;
use tracing::warn;

/// Prefix the source uses to expose user defined metadata as headers
pub const METADATA_PREFIX: &str = "x-amz-meta-";

pub const OBJECT_LOCK_MODE: &str = "x-amz-object-lock-mode";
pub const OBJECT_LOCK_RETAIN_UNTIL_DATE: &str = "x-amz-object-lock-retain-until-date";
pub const OBJECT_LOCK_LEGAL_HOLD: &str = "x-amz-object-lock-legal-hold";

/// Attributes carried over from the source object to the destination object.
///
/// Every field maps to a source response header. A header that was
/// not present in the response stays `None` (or absent from `metadata`),
/// it is never filled with a default.
///
/// The object lock fields are only returned by the source when the
/// requester is allowed to read object retention.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub cache_control: Option<String>,
    pub content_disposition: Option<String>,
    pub content_encoding: Option<String>,
    pub content_language: Option<String>,
    pub content_length: Option<u64>,
    pub content_type: Option<String>,
    pub expires: Option<String>,
    pub metadata: BTreeMap<String, String>,
    pub object_lock_mode: Option<String>,
    pub object_lock_retain_until_date: Option<String>,
    pub object_lock_legal_hold_status: Option<String>,
}

impl ObjectMetadata {
    /// Builds the metadata from the header set of a source response
    ///
    /// ---
    /// Example Usage:
    /// ```
    ///
    /// let headers: HeaderMap = source.head_object("shark.jpg").await?;
    ///
    /// let metadata = ObjectMetadata::from_headers(&headers);
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };

        let metadata = headers
            .iter()
            .filter_map(|(name, value)| {
                let key = name.as_str().strip_prefix(METADATA_PREFIX)?;
                let value = value.to_str().ok()?;

                Some((key.to_string(), value.to_string()))
            })
            .collect();

        Self {
            cache_control: header(CACHE_CONTROL.as_str()),
            content_disposition: header(CONTENT_DISPOSITION.as_str()),
            content_encoding: header(CONTENT_ENCODING.as_str()),
            content_language: header(CONTENT_LANGUAGE.as_str()),
            content_length: header(CONTENT_LENGTH.as_str())
                .and_then(|length| length.trim().parse().ok()),
            content_type: header(CONTENT_TYPE.as_str()),
            expires: header(EXPIRES.as_str()),
            metadata,
            object_lock_mode: header(OBJECT_LOCK_MODE),
            object_lock_retain_until_date: header(OBJECT_LOCK_RETAIN_UNTIL_DATE),
            object_lock_legal_hold_status: header(OBJECT_LOCK_LEGAL_HOLD),
        }
    }

    /// Checks the date valued fields before any byte is copied.
    ///
    /// An `expires` that is not an HTTP-date (`0`, `-1`, ...) already means
    /// "expired" and is dropped. An object lock retain-until date that does
    /// not parse is an error.
    pub fn check_dates(&mut self) -> Result<(), Error> {
        if let Some(expires) = self.expires.as_deref() {
            if parse_expires(expires).is_none() {
                warn!("Dropping expires {:?}, not an HTTP-date", expires);
                self.expires = None;
            }
        }

        if let Some(retain_until_date) = self.object_lock_retain_until_date.as_deref() {
            parse_retain_until_date(retain_until_date)?;
        }

        Ok(())
    }
}

/// Parses an `expires` header value, `None` if it is not an HTTP-date
pub fn parse_expires(value: &str) -> Option<DateTime> {
    DateTime::from_str(value.trim(), DateTimeFormat::HttpDate).ok()
}

pub fn parse_retain_until_date(value: &str) -> Result<DateTime, Error> {
    DateTime::from_str(value.trim(), DateTimeFormat::DateTime).map_err(|err| {
        Error::Source(format!(
            "invalid {} header {:?}: {}",
            OBJECT_LOCK_RETAIN_UNTIL_DATE, value, err
        ))
    })
}
