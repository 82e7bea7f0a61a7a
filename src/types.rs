//! Shared types passed between pipeline stages.
//!
//! Each stage returns its output to the next; nothing here is global. The
//! per-item [`ItemResult`] carries the "skip on failure, keep going" control
//! flow: a failed object or image becomes `Skipped` with a reason instead of
//! aborting the run.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer key assigned by the collection API to a single catalog record.
pub type ObjectId = u64;

/// An object record as returned by the object-detail endpoint.
///
/// Only the fields the pipeline looks at are kept. An empty `primaryImage`
/// string is normalized to `None` when the record is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub id: ObjectId,
    pub primary_image: Option<String>,
    pub is_public_domain: Option<bool>,
    pub title: Option<String>,
}

/// An accepted object: identifier plus the URL of its primary image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectImage {
    #[serde(rename = "objectID")]
    pub id: ObjectId,
    #[serde(rename = "imageURL")]
    pub url: String,
}

/// Why a single object or image was left out of the collage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Object-detail endpoint answered with a non-200 status.
    ObjectStatus(u16),
    /// Object-detail request failed before a status was available, or the body was not JSON.
    ObjectRequest(String),
    /// Record has no (or an empty) primary image URL.
    NoPrimaryImage,
    /// Public-domain filter is on and the record is not flagged public domain.
    NotPublicDomain,
    /// Image URL answered with a non-200 status.
    ImageStatus(u16),
    /// Image request failed at the transport level.
    ImageRequest(String),
    /// Bytes were downloaded but could not be decoded as an image.
    Decode(String),
    /// Persisted mode: writing the downloaded bytes to disk failed.
    Write(String),
    /// Persisted mode: the stored file could not be reopened before composing.
    Reopen(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::ObjectStatus(code) => write!(f, "object request returned {code}"),
            SkipReason::ObjectRequest(msg) => write!(f, "object request failed: {msg}"),
            SkipReason::NoPrimaryImage => f.write_str("no primary image"),
            SkipReason::NotPublicDomain => f.write_str("not public domain"),
            SkipReason::ImageStatus(code) => write!(f, "image download returned {code}"),
            SkipReason::ImageRequest(msg) => write!(f, "image download failed: {msg}"),
            SkipReason::Decode(msg) => write!(f, "could not decode image: {msg}"),
            SkipReason::Write(msg) => write!(f, "could not store image: {msg}"),
            SkipReason::Reopen(msg) => write!(f, "could not reopen image: {msg}"),
        }
    }
}

/// Outcome of processing one item: a value, or the reason it was dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemResult<T> {
    Accepted(T),
    Skipped { id: ObjectId, reason: SkipReason },
}

impl<T> ItemResult<T> {
    pub fn skipped(id: ObjectId, reason: SkipReason) -> Self {
        ItemResult::Skipped { id, reason }
    }

    pub fn accepted(&self) -> Option<&T> {
        match self {
            ItemResult::Accepted(value) => Some(value),
            ItemResult::Skipped { .. } => None,
        }
    }

    pub fn into_accepted(self) -> Option<T> {
        match self {
            ItemResult::Accepted(value) => Some(value),
            ItemResult::Skipped { .. } => None,
        }
    }
}
