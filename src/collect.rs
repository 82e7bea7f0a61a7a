//! Stage 3: image collection.
//!
//! Downloads the primary image of every accepted object, in order. Two modes:
//!
//! - **In memory** (default): bytes are decoded straight away, thumbnailed so
//!   neither side exceeds the max dimension, and bordered. Undecodable bytes
//!   are skipped.
//! - **Persisted**: raw bytes are written to the per-query images directory
//!   under the URL's basename and only the path is kept. [`finalize`] reopens
//!   every stored file before composing and normalizes it the same way.
//!
//! Either way the composer receives fully normalized `RgbaImage`s, and a
//! failure only removes its own image from the collage.

use crate::api::{ApiError, CollectionApi};
use crate::config::ImagesConfig;
use crate::imaging::{self, Border, Color, ImagingError};
use crate::naming;
use crate::types::{ItemResult, ObjectId, ObjectImage, SkipReason};
use image::RgbaImage;
use std::fs;
use std::path::{Path, PathBuf};

/// Where a collected image currently lives.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    /// Decoded, thumbnailed and bordered.
    Memory(RgbaImage),
    /// Raw download on disk, not yet decoded.
    Stored(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectedImage {
    pub id: ObjectId,
    pub source: ImageSource,
}

/// Per-image normalization plus the storage mode.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectSettings {
    pub max_dimension: u32,
    pub border: Border,
    /// `Some(dir)` selects persisted mode.
    pub persist_dir: Option<PathBuf>,
}

impl CollectSettings {
    /// Settings from the `[images]` section. `images_dir` is used only when
    /// `persist` is on.
    pub fn from_config(config: &ImagesConfig, images_dir: PathBuf) -> Result<Self, ImagingError> {
        Ok(Self {
            max_dimension: config.max_dimension,
            border: Border::new(config.border, Color::parse(&config.border_color)?),
            persist_dir: config.persist.then_some(images_dir),
        })
    }
}

fn download_skip(error: ApiError) -> SkipReason {
    match error {
        ApiError::Status(code) => SkipReason::ImageStatus(code),
        other => SkipReason::ImageRequest(other.to_string()),
    }
}

/// Download and keep one image.
pub fn collect_image(
    api: &impl CollectionApi,
    object: &ObjectImage,
    settings: &CollectSettings,
) -> ItemResult<CollectedImage> {
    let bytes = match api.download(&object.url) {
        Ok(bytes) => bytes,
        Err(e) => return ItemResult::skipped(object.id, download_skip(e)),
    };

    let source = match &settings.persist_dir {
        Some(dir) => {
            let path = dir.join(naming::image_file_name(&object.url, object.id));
            if let Err(e) = fs::write(&path, &bytes) {
                return ItemResult::skipped(object.id, SkipReason::Write(e.to_string()));
            }
            tracing::debug!("stored {} bytes at {}", bytes.len(), path.display());
            ImageSource::Stored(path)
        }
        None => match imaging::decode_bytes(&bytes) {
            Ok(img) => ImageSource::Memory(imaging::normalize(
                img,
                settings.max_dimension,
                settings.border,
            )),
            Err(e) => return ItemResult::skipped(object.id, SkipReason::Decode(e.to_string())),
        },
    };

    ItemResult::Accepted(CollectedImage {
        id: object.id,
        source,
    })
}

/// Collect every object's image in order, calling `on_item` after each.
pub fn collect_images(
    api: &impl CollectionApi,
    objects: &[ObjectImage],
    settings: &CollectSettings,
    mut on_item: impl FnMut(&ItemResult<CollectedImage>, &ObjectImage),
) -> Vec<CollectedImage> {
    let mut collected = Vec::new();
    for object in objects {
        let result = collect_image(api, object, settings);
        on_item(&result, object);
        if let Some(image) = result.into_accepted() {
            collected.push(image);
        }
    }
    collected
}

fn reopen(path: &Path, settings: &CollectSettings) -> Result<RgbaImage, String> {
    if !path.exists() {
        return Err(format!("{} no longer exists", path.display()));
    }
    let img = imaging::open_image(path).map_err(|e| e.to_string())?;
    Ok(imaging::normalize(img, settings.max_dimension, settings.border))
}

/// Turn collected images into the composer's input, preserving order.
///
/// Stored files are reopened and normalized; any that are gone or no longer
/// decode are reported through `on_skip` as [`SkipReason::Reopen`].
pub fn finalize(
    images: Vec<CollectedImage>,
    settings: &CollectSettings,
    mut on_skip: impl FnMut(ObjectId, &SkipReason),
) -> Vec<RgbaImage> {
    images
        .into_iter()
        .filter_map(|image| match image.source {
            ImageSource::Memory(img) => Some(img),
            ImageSource::Stored(path) => match reopen(&path, settings) {
                Ok(img) => Some(img),
                Err(msg) => {
                    on_skip(image.id, &SkipReason::Reopen(msg));
                    None
                }
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::tests::MockApi;
    use image::{DynamicImage, ImageFormat, Rgba};
    use std::io::Cursor;
    use tempfile::TempDir;

    fn png_bytes(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([40, 80, 120, 255]));
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn object(id: ObjectId) -> ObjectImage {
        ObjectImage {
            id,
            url: format!("https://images.example.org/original/DT{id}.png"),
        }
    }

    fn in_memory() -> CollectSettings {
        CollectSettings {
            max_dimension: 100,
            border: Border::new(5, Color::rgb(255, 255, 255)),
            persist_dir: None,
        }
    }

    fn persisted(dir: &Path) -> CollectSettings {
        CollectSettings {
            persist_dir: Some(dir.to_path_buf()),
            ..in_memory()
        }
    }

    // =========================================================================
    // Settings
    // =========================================================================

    #[test]
    fn settings_from_default_config() {
        let settings =
            CollectSettings::from_config(&ImagesConfig::default(), PathBuf::from("imgs")).unwrap();
        assert_eq!(settings.max_dimension, 1000);
        assert_eq!(settings.border, Border::new(5, Color::rgb(255, 255, 255)));
        assert_eq!(settings.persist_dir, None);
    }

    #[test]
    fn settings_persist_uses_images_dir() {
        let config = ImagesConfig {
            persist: true,
            ..ImagesConfig::default()
        };
        let settings = CollectSettings::from_config(&config, PathBuf::from("imgs")).unwrap();
        assert_eq!(settings.persist_dir, Some(PathBuf::from("imgs")));
    }

    // =========================================================================
    // In-memory mode
    // =========================================================================

    #[test]
    fn in_memory_thumbnails_and_borders() {
        let obj = object(1);
        let api = MockApi::new().with_image(&obj.url, png_bytes(400, 200));

        let result = collect_image(&api, &obj, &in_memory());
        let Some(CollectedImage {
            source: ImageSource::Memory(img),
            ..
        }) = result.into_accepted()
        else {
            panic!("expected an in-memory image");
        };
        assert_eq!(img.dimensions(), (110, 60));
        assert_eq!(img.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn longest_side_never_exceeds_bound_plus_border() {
        let api = MockApi::new()
            .with_image(&object(1).url, png_bytes(250, 90))
            .with_image(&object(2).url, png_bytes(60, 300))
            .with_image(&object(3).url, png_bytes(40, 30));
        let settings = in_memory();

        let collected = collect_images(&api, &[object(1), object(2), object(3)], &settings, |_, _| {});
        let images = finalize(collected, &settings, |_, _| {});
        assert_eq!(images.len(), 3);
        for img in &images {
            assert!(img.width().max(img.height()) <= 100 + 2 * 5);
        }
        // small images are not upscaled
        assert_eq!(images[2].dimensions(), (50, 40));
    }

    #[test]
    fn image_status_is_skipped() {
        let obj = object(4);
        let api = MockApi::new().with_image_status(&obj.url, 403);
        assert_eq!(
            collect_image(&api, &obj, &in_memory()),
            ItemResult::skipped(4, SkipReason::ImageStatus(403))
        );
    }

    #[test]
    fn undecodable_bytes_are_skipped() {
        let obj = object(5);
        let api = MockApi::new().with_image(&obj.url, b"<html>gone</html>".to_vec());
        assert!(matches!(
            collect_image(&api, &obj, &in_memory()),
            ItemResult::Skipped {
                id: 5,
                reason: SkipReason::Decode(_)
            }
        ));
    }

    #[test]
    fn failures_do_not_stop_collection() {
        let api = MockApi::new()
            .with_image_status(&object(1).url, 500)
            .with_image(&object(2).url, png_bytes(10, 10));

        let mut reported = 0;
        let collected = collect_images(&api, &[object(1), object(2)], &in_memory(), |_, _| {
            reported += 1;
        });
        assert_eq!(reported, 2);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].id, 2);
    }

    // =========================================================================
    // Persisted mode
    // =========================================================================

    #[test]
    fn persisted_writes_raw_bytes_under_basename() {
        let tmp = TempDir::new().unwrap();
        let obj = object(6);
        let bytes = png_bytes(20, 10);
        let api = MockApi::new().with_image(&obj.url, bytes.clone());

        let result = collect_image(&api, &obj, &persisted(tmp.path()));
        let expected = tmp.path().join("DT6.png");
        assert_eq!(
            result,
            ItemResult::Accepted(CollectedImage {
                id: 6,
                source: ImageSource::Stored(expected.clone())
            })
        );
        assert_eq!(fs::read(&expected).unwrap(), bytes);
    }

    #[test]
    fn persisted_keeps_undecodable_bytes_until_finalize() {
        let tmp = TempDir::new().unwrap();
        let obj = object(7);
        let api = MockApi::new().with_image(&obj.url, b"not an image".to_vec());
        let settings = persisted(tmp.path());

        let collected = collect_images(&api, &[obj], &settings, |_, _| {});
        assert_eq!(collected.len(), 1);

        let mut skips = Vec::new();
        let images = finalize(collected, &settings, |id, reason| {
            skips.push((id, reason.clone()))
        });
        assert!(images.is_empty());
        assert_eq!(skips.len(), 1);
        assert!(matches!(skips[0], (7, SkipReason::Reopen(_))));
    }

    #[test]
    fn finalize_reopens_and_normalizes_in_order() {
        let tmp = TempDir::new().unwrap();
        let api = MockApi::new()
            .with_image(&object(1).url, png_bytes(300, 150))
            .with_image(&object(2).url, png_bytes(20, 40));
        let settings = persisted(tmp.path());

        let collected = collect_images(&api, &[object(1), object(2)], &settings, |_, _| {});
        let images = finalize(collected, &settings, |_, _| panic!("no skips expected"));
        assert_eq!(images[0].dimensions(), (110, 60));
        assert_eq!(images[1].dimensions(), (30, 50));
    }

    #[test]
    fn finalize_skips_deleted_files() {
        let tmp = TempDir::new().unwrap();
        let images = vec![CollectedImage {
            id: 8,
            source: ImageSource::Stored(tmp.path().join("gone.png")),
        }];
        let mut skipped = Vec::new();
        let out = finalize(images, &in_memory(), |id, _| skipped.push(id));
        assert!(out.is_empty());
        assert_eq!(skipped, vec![8]);
    }

    #[test]
    fn write_failure_is_skipped() {
        let tmp = TempDir::new().unwrap();
        let obj = object(9);
        let api = MockApi::new().with_image(&obj.url, png_bytes(5, 5));
        let settings = persisted(&tmp.path().join("missing_dir"));

        assert!(matches!(
            collect_image(&api, &obj, &settings),
            ItemResult::Skipped {
                id: 9,
                reason: SkipReason::Write(_)
            }
        ));
    }
}
