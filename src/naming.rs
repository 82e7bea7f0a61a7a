//! Centralized output naming.
//!
//! Every artifact of a run is named after the query that produced it:
//!
//! | Artifact | Name |
//! |---|---|
//! | Final collage | `collage_<query>.png` |
//! | Collage before framing | `collage_unframed_<query>.png` |
//! | Object manifest | `objects_with_images_<query>.json` |
//! | Downloaded images | `downloaded_images_<query>/<basename of URL path>` |
//!
//! ## Query Slugs
//!
//! The query is used nearly verbatim: surrounding whitespace is trimmed and
//! characters that are invalid in filenames on common filesystems
//! (`/ \ : * ? " < > |` and control characters) become `_`. Spaces and
//! non-ASCII letters are kept, so `"Nueva York"` → `collage_Nueva York.png`.

use url::Url;

/// Filesystem-safe form of a query.
///
/// - `"Spain"` → `"Spain"`
/// - `"  Paris  "` → `"Paris"`
/// - `"AC/DC"` → `"AC_DC"`
/// - `"..."` → `"_"` (dot-only names would point at directories)
/// - `""` → `"_"`
pub fn query_slug(query: &str) -> String {
    let slug: String = query
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if slug.is_empty() || slug.chars().all(|c| c == '.') {
        "_".to_string()
    } else {
        slug
    }
}

pub fn collage_file_name(query: &str) -> String {
    format!("collage_{}.png", query_slug(query))
}

pub fn unframed_file_name(query: &str) -> String {
    format!("collage_unframed_{}.png", query_slug(query))
}

pub fn manifest_file_name(query: &str) -> String {
    format!("objects_with_images_{}.json", query_slug(query))
}

pub fn images_dir_name(query: &str) -> String {
    format!("downloaded_images_{}", query_slug(query))
}

/// File name for a downloaded image: the last segment of the URL's path.
///
/// The segment is kept as it appears in the URL, escapes included. Query
/// strings and fragments are ignored. Falls back to `object_<id>` when the URL
/// has no usable path segment (or does not parse at all).
///
/// - `https://images.metmuseum.org/CRDImages/ep/original/DT1502.jpg` → `DT1502.jpg`
/// - `https://example.org/img/a%20b.png?w=100` → `a%20b.png`
/// - `https://example.org/` → `object_42`
pub fn image_file_name(url: &str, object_id: u64) -> String {
    let fallback = || format!("object_{object_id}");
    let Ok(parsed) = Url::parse(url) else {
        return fallback();
    };

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(query_slug)
        .filter(|name| name != "_")
        .unwrap_or_else(fallback)
}
