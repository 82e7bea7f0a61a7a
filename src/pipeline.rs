//! End-to-end run: query in, collage out.
//!
//! ```text
//! resolve ──► fetch ──► [manifest] ──► collect ──► compose ──► [frame | border]
//! ```
//!
//! Stages run one after another on the calling thread. Progress is reported
//! through [`PipelineEvent`]s handed to a callback; the CLI prints them with
//! [`output::print_event`](crate::output::print_event), tests collect them.
//!
//! Only problems with the run's own environment are errors (an empty query,
//! an unwritable output directory, a collage that cannot be saved). Remote
//! failures are outcomes: a failed search, no matching objects or no usable
//! images all end the run cleanly with the matching [`RunOutcome`].

use crate::api::CollectionApi;
use crate::collect::{self, CollectSettings, ImageSource};
use crate::compose;
use crate::config::{Finish, SiteConfig};
use crate::fetch;
use crate::frame::{self, FrameError};
use crate::imaging::{self, ImagingError};
use crate::layout::{CollageLayout, LayoutStrategy};
use crate::manifest::{self, ManifestError};
use crate::naming;
use crate::resolve::{self, ResolveError};
use crate::types::{ItemResult, ObjectId, SkipReason};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Imaging error: {0}")]
    Imaging(#[from] ImagingError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] ManifestError),
}

/// The stages of a run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Search,
    Fetch,
    Collect,
    Compose,
    Finish,
}

impl Stage {
    pub fn number(self) -> usize {
        match self {
            Stage::Search => 1,
            Stage::Fetch => 2,
            Stage::Collect => 3,
            Stage::Compose => 4,
            Stage::Finish => 5,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Search => "Searching the collection",
            Stage::Fetch => "Fetching objects",
            Stage::Collect => "Collecting images",
            Stage::Compose => "Composing collage",
            Stage::Finish => "Finishing",
        })
    }
}

/// Progress of a run, in the order things happen.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    SearchFailed {
        error: String,
    },
    NoObjects {
        query: String,
    },
    ObjectsFound {
        query: String,
        count: usize,
    },
    /// `index` is the 1-based position among accepted objects.
    ObjectAccepted {
        index: usize,
        id: ObjectId,
        title: Option<String>,
        url: String,
    },
    ItemSkipped {
        id: ObjectId,
        reason: SkipReason,
    },
    ManifestWritten {
        path: PathBuf,
        entries: usize,
    },
    /// `path` is set when the download was stored on disk.
    ImageCollected {
        index: usize,
        id: ObjectId,
        path: Option<PathBuf>,
    },
    NoImages,
    LayoutChosen(CollageLayout),
    CollageSaved {
        path: PathBuf,
    },
    FrameApplied {
        path: PathBuf,
    },
    FrameFailed {
        error: String,
        kept: PathBuf,
    },
    BorderApplied {
        path: PathBuf,
        width: u32,
    },
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The search call itself failed.
    SearchFailed,
    /// The search matched nothing.
    NoObjects,
    /// Objects were found but none produced a usable image.
    NoImages,
    /// A collage was written to `path`.
    Collage { path: PathBuf, framed: bool },
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub query: String,
    pub outcome: RunOutcome,
    /// Identifiers the search returned.
    pub found: usize,
    /// Objects with an acceptable image URL.
    pub accepted: usize,
    /// Images that made it into the collage.
    pub collected: usize,
    pub skipped: Vec<(ObjectId, SkipReason)>,
    pub manifest: Option<PathBuf>,
    pub layout: Option<CollageLayout>,
}

impl RunReport {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            outcome: RunOutcome::NoObjects,
            found: 0,
            accepted: 0,
            collected: 0,
            skipped: Vec::new(),
            manifest: None,
            layout: None,
        }
    }

    fn ended(mut self, outcome: RunOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Run every stage for `query`.
///
/// Relative `output.dir` and `frame.path` resolve against `workdir`.
pub fn run(
    api: &impl CollectionApi,
    config: &SiteConfig,
    query: &str,
    workdir: &Path,
    on_event: &mut impl FnMut(&PipelineEvent),
) -> Result<RunReport, PipelineError> {
    let search = resolve::search_query(query, &config.search)?;
    let query = search.text.as_str();
    let mut report = RunReport::new(query);
    let output_dir = workdir.join(&config.output.dir);

    // ---- Stage 1: search
    on_event(&PipelineEvent::StageStarted(Stage::Search));
    let ids = match resolve::resolve(api, &search) {
        Ok(ids) => ids,
        Err(ResolveError::Search(e)) => {
            on_event(&PipelineEvent::SearchFailed {
                error: e.to_string(),
            });
            return Ok(report.ended(RunOutcome::SearchFailed));
        }
        Err(e) => return Err(e.into()),
    };
    report.found = ids.len();
    if ids.is_empty() {
        on_event(&PipelineEvent::NoObjects {
            query: query.to_string(),
        });
        return Ok(report.ended(RunOutcome::NoObjects));
    }
    on_event(&PipelineEvent::ObjectsFound {
        query: query.to_string(),
        count: ids.len(),
    });
    fs::create_dir_all(&output_dir)?;

    // ---- Stage 2: fetch
    on_event(&PipelineEvent::StageStarted(Stage::Fetch));
    let mut skipped = Vec::new();
    let mut index = 0;
    let objects = fetch::fetch_objects(
        api,
        &ids,
        config.search.public_domain_only,
        |result, record| match result {
            ItemResult::Accepted(object) => {
                index += 1;
                on_event(&PipelineEvent::ObjectAccepted {
                    index,
                    id: object.id,
                    title: record.and_then(|r| r.title.clone()),
                    url: object.url.clone(),
                });
            }
            ItemResult::Skipped { id, reason } => {
                skipped.push((*id, reason.clone()));
                on_event(&PipelineEvent::ItemSkipped {
                    id: *id,
                    reason: reason.clone(),
                });
            }
        },
    );
    report.accepted = objects.len();

    if config.output.export_manifest {
        let path = output_dir.join(naming::manifest_file_name(query));
        manifest::write_manifest(&path, &objects)?;
        on_event(&PipelineEvent::ManifestWritten {
            path: path.clone(),
            entries: objects.len(),
        });
        report.manifest = Some(path);
    }

    if objects.is_empty() {
        report.skipped = skipped;
        on_event(&PipelineEvent::NoImages);
        return Ok(report.ended(RunOutcome::NoImages));
    }

    // ---- Stage 3: collect
    on_event(&PipelineEvent::StageStarted(Stage::Collect));
    let settings = CollectSettings::from_config(
        &config.images,
        output_dir.join(naming::images_dir_name(query)),
    )?;
    if let Some(dir) = &settings.persist_dir {
        fs::create_dir_all(dir)?;
    }
    index = 0;
    let collected = collect::collect_images(api, &objects, &settings, |result, _| match result {
        ItemResult::Accepted(image) => {
            index += 1;
            on_event(&PipelineEvent::ImageCollected {
                index,
                id: image.id,
                path: match &image.source {
                    ImageSource::Stored(path) => Some(path.clone()),
                    ImageSource::Memory(_) => None,
                },
            });
        }
        ItemResult::Skipped { id, reason } => {
            skipped.push((*id, reason.clone()));
            on_event(&PipelineEvent::ItemSkipped {
                id: *id,
                reason: reason.clone(),
            });
        }
    });
    let images = collect::finalize(collected, &settings, |id, reason| {
        skipped.push((id, reason.clone()));
        on_event(&PipelineEvent::ItemSkipped {
            id,
            reason: reason.clone(),
        });
    });
    report.skipped = skipped;
    report.collected = images.len();

    if images.is_empty() {
        on_event(&PipelineEvent::NoImages);
        return Ok(report.ended(RunOutcome::NoImages));
    }

    // ---- Stage 4: compose
    on_event(&PipelineEvent::StageStarted(Stage::Compose));
    let frame = match config.output.finish {
        Finish::Frame => Some(frame::load_frame(&workdir.join(&config.frame.path))),
        Finish::Border | Finish::Plain => None,
    };
    let frame_dimensions = match &frame {
        Some(Ok(img)) => Some(img.dimensions()),
        _ => None,
    };
    let strategy = LayoutStrategy::choose(&config.layout, frame_dimensions);
    let Some(layout) = CollageLayout::plan(images.len(), strategy) else {
        on_event(&PipelineEvent::NoImages);
        return Ok(report.ended(RunOutcome::NoImages));
    };
    on_event(&PipelineEvent::LayoutChosen(layout));
    report.layout = Some(layout);

    let collage = compose::render_collage(&images, &layout, &config.layout)?;
    drop(images);

    // ---- Stage 5: finish
    let final_path = output_dir.join(naming::collage_file_name(query));
    let outcome = match (config.output.finish, frame) {
        (Finish::Frame, Some(frame)) => {
            let unframed = output_dir.join(naming::unframed_file_name(query));
            imaging::save_png(&collage, &unframed)?;
            on_event(&PipelineEvent::CollageSaved {
                path: unframed.clone(),
            });
            drop(collage);

            on_event(&PipelineEvent::StageStarted(Stage::Finish));
            match frame_collage(&unframed, frame, &final_path, query, config) {
                Ok(()) => {
                    if let Err(e) = fs::remove_file(&unframed) {
                        tracing::warn!("could not remove {}: {}", unframed.display(), e);
                    }
                    on_event(&PipelineEvent::FrameApplied {
                        path: final_path.clone(),
                    });
                    RunOutcome::Collage {
                        path: final_path,
                        framed: true,
                    }
                }
                Err(e) => {
                    on_event(&PipelineEvent::FrameFailed {
                        error: e.to_string(),
                        kept: unframed.clone(),
                    });
                    RunOutcome::Collage {
                        path: unframed,
                        framed: false,
                    }
                }
            }
        }
        (Finish::Border, _) => {
            imaging::save_png(&collage, &final_path)?;
            on_event(&PipelineEvent::CollageSaved {
                path: final_path.clone(),
            });
            on_event(&PipelineEvent::StageStarted(Stage::Finish));
            let bordered = frame::apply_border(&collage, &config.output)?;
            imaging::save_png(&bordered, &final_path)?;
            on_event(&PipelineEvent::BorderApplied {
                path: final_path.clone(),
                width: config.output.border,
            });
            RunOutcome::Collage {
                path: final_path,
                framed: false,
            }
        }
        _ => {
            imaging::save_png(&collage, &final_path)?;
            on_event(&PipelineEvent::CollageSaved {
                path: final_path.clone(),
            });
            RunOutcome::Collage {
                path: final_path,
                framed: false,
            }
        }
    };

    Ok(report.ended(outcome))
}

/// Reopen the saved collage, composite it into the loaded frame and save the
/// result to `framed_path`. Any error leaves `unframed` as the only artifact.
fn frame_collage(
    unframed: &Path,
    frame: Result<image::RgbaImage, FrameError>,
    framed_path: &Path,
    query: &str,
    config: &SiteConfig,
) -> Result<(), FrameError> {
    let frame = frame?;
    let collage = imaging::open_image(unframed)?.to_rgba8();
    let framed = frame::apply_frame(&collage, &frame, query, &config.frame)?;
    imaging::save_png(&framed, framed_path)?;
    Ok(())
}
