//! CLI output formatting for pipeline events and the inspection commands.
//!
//! # Information-First Display
//!
//! Objects are shown by their positional index and title, the way a catalog
//! lists them; object IDs and URLs follow as indented context lines. Failures
//! name the object they belong to and the reason, and never abort the listing.
//!
//! # Output Format
//!
//! ```text
//! ==> Stage 1: Searching the collection
//! Found 3 objects for "Spain"
//! ==> Stage 2: Fetching objects
//!     001 Wheat Field with Cypresses
//!         Object: 436535
//!         Image: https://images.metmuseum.org/CRDImages/ep/original/DT1567.jpg
//!     Skipped object 2: no primary image
//!     002 (object 3)
//!         Object: 3
//!         Image: https://images.metmuseum.org/CRDImages/ep/original/DT3.jpg
//! ==> Stage 3: Collecting images
//!     001 object 436535
//!     002 object 3
//! ==> Stage 4: Composing collage
//! Grid: 1 row × 2 columns (default aspect ratio 1.50)
//! Collage saved: output/collage_unframed_Spain.png
//! ==> Stage 5: Finishing
//! Framed collage saved: output/collage_Spain.png
//! ```
//!
//! # Architecture
//!
//! Every `format_*` function returns `Vec<String>` and is pure; the matching
//! `print_*` wrapper writes to stdout.

use crate::layout::CollageLayout;
use crate::pipeline::{PipelineEvent, RunOutcome, RunReport};
use crate::types::ObjectId;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Titled objects show their title, untitled ones their ID in parens.
///
/// ```text
/// 001 Wheat Field with Cypresses   // titled
/// 002 (object 436535)              // untitled
/// ```
fn object_line(index: usize, title: Option<&str>, id: ObjectId) -> String {
    match title {
        Some(t) if !t.trim().is_empty() => format!("{} {}", format_index(index), t.trim()),
        _ => format!("{} (object {})", format_index(index), id),
    }
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

/// `1 row × 2 columns`.
fn grid_shape(layout: &CollageLayout) -> String {
    format!(
        "{} \u{00d7} {}",
        plural(layout.rows, "row", "rows"),
        plural(layout.columns, "column", "columns")
    )
}

// ============================================================================
// Pipeline events
// ============================================================================

pub fn format_event(event: &PipelineEvent) -> Vec<String> {
    match event {
        PipelineEvent::StageStarted(stage) => {
            vec![format!("==> Stage {}: {}", stage.number(), stage)]
        }
        PipelineEvent::SearchFailed { error } => vec![format!("Error: search failed: {error}")],
        PipelineEvent::NoObjects { query } => {
            vec![format!("No objects found for \"{query}\"")]
        }
        PipelineEvent::ObjectsFound { query, count } => vec![format!(
            "Found {} for \"{}\"",
            plural(*count, "object", "objects"),
            query
        )],
        PipelineEvent::ObjectAccepted {
            index,
            id,
            title,
            url,
        } => vec![
            format!("{}{}", indent(1), object_line(*index, title.as_deref(), *id)),
            format!("{}Object: {}", indent(2), id),
            format!("{}Image: {}", indent(2), url),
        ],
        PipelineEvent::ItemSkipped { id, reason } => {
            vec![format!("{}Skipped object {}: {}", indent(1), id, reason)]
        }
        PipelineEvent::ManifestWritten { path, entries } => vec![format!(
            "Manifest: {} ({})",
            path.display(),
            plural(*entries, "object", "objects")
        )],
        PipelineEvent::ImageCollected { index, id, path } => {
            let mut lines = vec![format!("{}{} object {}", indent(1), format_index(*index), id)];
            if let Some(path) = path {
                lines.push(format!("{}Saved: {}", indent(2), path.display()));
            }
            lines
        }
        PipelineEvent::NoImages => vec!["No images could be collected".to_string()],
        PipelineEvent::LayoutChosen(layout) => {
            vec![format!("Grid: {} ({})", grid_shape(layout), layout.strategy)]
        }
        PipelineEvent::CollageSaved { path } => {
            vec![format!("Collage saved: {}", path.display())]
        }
        PipelineEvent::FrameApplied { path } => {
            vec![format!("Framed collage saved: {}", path.display())]
        }
        PipelineEvent::FrameFailed { error, kept } => vec![
            format!("Error adding frame: {error}"),
            format!("{}Kept unframed collage: {}", indent(1), kept.display()),
        ],
        PipelineEvent::BorderApplied { path, width } => {
            vec![format!("Border: {width}px added to {}", path.display())]
        }
    }
}

pub fn print_event(event: &PipelineEvent) {
    for line in format_event(event) {
        println!("{}", line);
    }
}

/// Closing lines after a run.
pub fn format_run_summary(report: &RunReport) -> Vec<String> {
    match &report.outcome {
        RunOutcome::Collage { path, .. } => {
            let mut lines = vec![format!(
                "==> Done: {} ({} of {} found)",
                path.display(),
                plural(report.collected, "image", "images"),
                report.found
            )];
            if !report.skipped.is_empty() {
                lines.push(format!(
                    "{}{} skipped",
                    indent(1),
                    plural(report.skipped.len(), "object", "objects")
                ));
            }
            lines
        }
        RunOutcome::SearchFailed | RunOutcome::NoObjects | RunOutcome::NoImages => {
            vec!["==> Done: no collage produced".to_string()]
        }
    }
}

pub fn print_run_summary(report: &RunReport) {
    for line in format_run_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspection commands
// ============================================================================

/// Result of the `search` command: count, then one ID per line.
pub fn format_search(query: &str, ids: &[ObjectId]) -> Vec<String> {
    if ids.is_empty() {
        return vec![format!("No objects found for \"{query}\"")];
    }
    let mut lines = vec![format!(
        "Found {} for \"{}\"",
        plural(ids.len(), "object", "objects"),
        query
    )];
    lines.extend(
        ids.iter()
            .enumerate()
            .map(|(i, id)| format!("{}{} {}", indent(1), format_index(i + 1), id)),
    );
    lines
}

pub fn print_search(query: &str, ids: &[ObjectId]) {
    for line in format_search(query, ids) {
        println!("{}", line);
    }
}

/// Result of the `layout` command, with the grid drawn as a text sketch.
///
/// ```text
/// 5 images: 2 rows × 3 columns (default aspect ratio 1.50)
///     [#] [#] [#]
///     [#] [#] [ ]
/// ```
pub fn format_layout(layout: &CollageLayout) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {} ({})",
        plural(layout.images, "image", "images"),
        grid_shape(layout),
        layout.strategy
    )];
    for row in 0..layout.rows {
        let cells: Vec<&str> = (0..layout.columns)
            .map(|column| {
                if row * layout.columns + column < layout.images {
                    "[#]"
                } else {
                    "[ ]"
                }
            })
            .collect();
        lines.push(format!("{}{}", indent(1), cells.join(" ")));
    }
    lines
}

pub fn print_layout(layout: &CollageLayout) {
    for line in format_layout(layout) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
