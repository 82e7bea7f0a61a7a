//! Accepted-object manifest.
//!
//! A JSON array of `{"objectID": .., "imageURL": ..}` entries in acceptance
//! order, indented with four spaces:
//!
//! ```json
//! [
//!     {
//!         "objectID": 1,
//!         "imageURL": "https://images.metmuseum.org/CRDImages/ep/original/DT1.jpg"
//!     }
//! ]
//! ```

use crate::types::ObjectImage;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Serialize the manifest to a string.
pub fn to_json(entries: &[ObjectImage]) -> Result<String, ManifestError> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    entries.serialize(&mut serializer)?;
    // serde_json only emits valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the manifest to `path`, replacing any existing file.
pub fn write_manifest(path: &Path, entries: &[ObjectImage]) -> Result<(), ManifestError> {
    fs::write(path, to_json(entries)?)?;
    Ok(())
}

pub fn read_manifest(path: &Path) -> Result<Vec<ObjectImage>, ManifestError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
