//! Run configuration.
//!
//! Handles loading, validating, and merging `config.toml`. Configuration is
//! layered, each layer overriding the one before it:
//!
//! ```text
//! stock defaults            (SiteConfig::default(), the "framed" behavior)
//!   → profile overlay       (--profile framed | export)
//!     → config.toml         (working directory, or --config <file>)
//!       → CLI flags         (applied by the binary on the resolved struct)
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [api]
//! search_url = "https://collectionapi.metmuseum.org/public/collection/v1/search"
//! object_url = "https://collectionapi.metmuseum.org/public/collection/v1/objects"
//! timeout_secs = 30
//!
//! [search]
//! # query = "Spain"          # Used when no query is given on the command line
//! geo_location = true        # Send the query as geoLocation too
//! public_domain_only = false
//!
//! [images]
//! max_dimension = 1000       # Longest side after thumbnailing
//! border = 5                 # White padding around every image (px)
//! border_color = "#ffffff"
//! persist = false            # Write downloads to disk instead of keeping them in memory
//!
//! [layout]
//! cell_size = 3.0            # Inches per grid cell side
//! dpi = 300
//! fallback_aspect = 1.5      # Aspect used for the grid when there is no frame
//! gutter = 0.1               # Inches of space around each image inside its cell
//! pad = 0.1                  # Inches kept around the content by the tight crop
//! tight_crop = true
//! background = "#d3d3d3"
//! fixed_width = 35.0         # Canvas width (inches) in fixed-width mode
//! # max_columns = 14         # Enables fixed-width mode
//!
//! [frame]
//! path = "Imagen_de_marco.png"
//! margin = 400
//! background = "#d3d3d3"
//! caption_prefix = "The Metropolitan Museum of Art Collection: "
//! caption_size = 40.0
//! caption_color = "#000000"
//! caption_x = 10
//! caption_from_bottom = 50
//!
//! [output]
//! dir = "output"
//! finish = "frame"           # frame | border | plain
//! export_manifest = false
//! border = 20
//! border_color = "#ffd700"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Color;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Full configuration for one pipeline run.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Collection API endpoints and HTTP client settings.
    pub api: ApiConfig,
    /// Search parameters and object filters.
    pub search: SearchConfig,
    /// Per-image normalization and persistence.
    pub images: ImagesConfig,
    /// Grid geometry and rendering.
    pub layout: LayoutConfig,
    /// Decorative frame and caption.
    pub frame: FrameConfig,
    /// Output location and finishing step.
    pub output: OutputConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("api.search_url", &self.api.search_url),
            ("api.object_url", &self.api.object_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                ConfigError::Validation(format!("{key} is not a valid URL ({e}): {value}"))
            })?;
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "api.timeout_secs must be greater than 0".into(),
            ));
        }
        if self.images.max_dimension == 0 {
            return Err(ConfigError::Validation(
                "images.max_dimension must be greater than 0".into(),
            ));
        }
        if self.layout.dpi == 0 {
            return Err(ConfigError::Validation(
                "layout.dpi must be greater than 0".into(),
            ));
        }
        for (key, value) in [
            ("layout.cell_size", self.layout.cell_size),
            ("layout.fallback_aspect", self.layout.fallback_aspect),
            ("layout.fixed_width", self.layout.fixed_width),
            ("frame.caption_size", self.frame.caption_size),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a positive number"
                )));
            }
        }
        for (key, value) in [("layout.gutter", self.layout.gutter), ("layout.pad", self.layout.pad)] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{key} must not be negative"
                )));
            }
        }
        if self.layout.gutter * 2.0 >= self.layout.cell_size {
            return Err(ConfigError::Validation(
                "layout.gutter must leave room inside a cell".into(),
            ));
        }
        if self.layout.max_columns == Some(0) {
            return Err(ConfigError::Validation(
                "layout.max_columns must be at least 1".into(),
            ));
        }
        for (key, value) in [
            ("images.border_color", &self.images.border_color),
            ("layout.background", &self.layout.background),
            ("frame.background", &self.frame.background),
            ("frame.caption_color", &self.frame.caption_color),
            ("output.border_color", &self.output.border_color),
        ] {
            Color::parse(value)
                .map_err(|e| ConfigError::Validation(format!("{key}: {e}")))?;
        }
        if self
            .search
            .query
            .as_deref()
            .is_some_and(|q| q.trim().is_empty())
        {
            return Err(ConfigError::Validation(
                "search.query must not be empty when set".into(),
            ));
        }
        Ok(())
    }
}

/// Collection API endpoints and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Search endpoint, queried once per run.
    pub search_url: String,
    /// Object-detail endpoint; the object id is appended as a path segment.
    pub object_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            search_url: "https://collectionapi.metmuseum.org/public/collection/v1/search"
                .to_string(),
            object_url: "https://collectionapi.metmuseum.org/public/collection/v1/objects"
                .to_string(),
            timeout_secs: 30,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

/// Search parameters and object filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Query used when none is given on the command line.
    pub query: Option<String>,
    /// Also send the query as the `geoLocation` filter.
    pub geo_location: bool,
    /// Only accept objects flagged `isPublicDomain`.
    pub public_domain_only: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            query: None,
            geo_location: true,
            public_domain_only: false,
        }
    }
}

/// Per-image normalization and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Neither side of a collected image exceeds this after thumbnailing.
    pub max_dimension: u32,
    /// Solid padding added around each image, in pixels.
    pub border: u32,
    /// Padding color.
    pub border_color: String,
    /// Write downloaded bytes under the output directory and reopen them before composing.
    pub persist: bool,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_dimension: 1000,
            border: 5,
            border_color: "#ffffff".to_string(),
            persist: false,
        }
    }
}

/// Grid geometry and rendering.
///
/// Sizes are in inches and converted to pixels with `dpi`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LayoutConfig {
    /// Side of one grid cell.
    pub cell_size: f64,
    pub dpi: u32,
    /// Aspect ratio the grid aims for when no frame is available.
    pub fallback_aspect: f64,
    /// Space kept around each image inside its cell.
    pub gutter: f64,
    /// Space kept around the drawn content by the tight crop.
    pub pad: f64,
    /// Crop the canvas to the drawn images (plus `pad`).
    pub tight_crop: bool,
    /// Canvas color behind and between the images.
    pub background: String,
    /// Canvas width in fixed-width mode.
    pub fixed_width: f64,
    /// Fixed-width mode: at most this many columns, frame ignored.
    pub max_columns: Option<usize>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_size: 3.0,
            dpi: 300,
            fallback_aspect: 1.5,
            gutter: 0.1,
            pad: 0.1,
            tight_crop: true,
            background: "#d3d3d3".to_string(),
            fixed_width: 35.0,
            max_columns: None,
        }
    }
}

/// Decorative frame and caption.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameConfig {
    /// Frame image; relative paths resolve against the working directory.
    pub path: String,
    /// Pixels subtracted from the frame's width and height to get the collage's bounds.
    pub margin: u32,
    /// Canvas color showing between the collage and the frame.
    pub background: String,
    /// Caption text before the query.
    pub caption_prefix: String,
    /// Caption font size in pixels.
    pub caption_size: f64,
    pub caption_color: String,
    /// Caption left edge, in pixels from the frame's left side.
    pub caption_x: i64,
    /// Caption top edge, in pixels above the frame's bottom side.
    pub caption_from_bottom: i64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            path: "Imagen_de_marco.png".to_string(),
            margin: 400,
            background: "#d3d3d3".to_string(),
            caption_prefix: "The Metropolitan Museum of Art Collection: ".to_string(),
            caption_size: 40.0,
            caption_color: "#000000".to_string(),
            caption_x: 10,
            caption_from_bottom: 50,
        }
    }
}

/// What happens to the collage raster after the grid is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    /// Composite onto the frame image with a caption.
    Frame,
    /// Expand with a solid border, in place.
    Border,
    /// Leave the grid as rendered.
    Plain,
}

/// Output location and finishing step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory for all artifacts; relative paths resolve against the working directory.
    pub dir: String,
    pub finish: Finish,
    /// Write `objects_with_images_<query>.json` after fetching objects.
    pub export_manifest: bool,
    /// Border width for the `border` finish, in pixels.
    pub border: u32,
    pub border_color: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: "output".to_string(),
            finish: Finish::Frame,
            export_manifest: false,
            border: 20,
            border_color: "#ffd700".to_string(),
        }
    }
}

// =============================================================================
// Profiles
// =============================================================================

/// Named presets layered between stock defaults and the user's config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Interactive framed collage: geo search, in-memory images, frame + caption.
    #[default]
    Framed,
    /// Public-domain export: JSON manifest, images on disk, 14-column strip, gold border.
    Export,
}

impl Profile {
    /// The profile's overrides on top of the stock defaults.
    pub fn overlay(self) -> toml::Value {
        match self {
            Profile::Framed => toml::Value::Table(toml::map::Map::new()),
            Profile::Export => toml::from_str(EXPORT_PROFILE)
                .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new())),
        }
    }
}

const EXPORT_PROFILE: &str = r#"
[search]
geo_location = false
public_domain_only = true

[images]
persist = true

[layout]
dpi = 100
tight_crop = false
max_columns = 14

[output]
dir = "."
finish = "border"
export_manifest = true
"#;

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default())
        .unwrap_or_else(|_| toml::Value::Table(toml::map::Map::new()))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    load_raw_config_file(&config_path).map(Some)
}

/// Load an explicitly named config file as a raw TOML value.
///
/// Unlike [`load_raw_config`], a missing file is an error.
pub fn load_raw_config_file(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(value)
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Resolve stock defaults + profile + an optional user overlay.
pub fn load_profile_config(
    profile: Profile,
    user: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let base = merge_toml(stock_defaults_value(), profile.overlay());
    resolve_config(base, user)
}

/// Load config from `config.toml` in the given directory on top of a profile.
pub fn load_config(dir: &Path, profile: Profile) -> Result<SiteConfig, ConfigError> {
    let overlay = load_raw_config(dir)?;
    load_profile_config(profile, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# museum-collage Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults of the "framed" profile.
#
# Layers, later ones win:
#   stock defaults -> --profile (framed | export) -> this file -> CLI flags
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Collection API
# ---------------------------------------------------------------------------
[api]
search_url = "https://collectionapi.metmuseum.org/public/collection/v1/search"
# The object id is appended as a path segment: <object_url>/<id>
object_url = "https://collectionapi.metmuseum.org/public/collection/v1/objects"
# Per-request timeout in seconds. Failed requests are never retried.
timeout_secs = 30

# ---------------------------------------------------------------------------
# Search
# ---------------------------------------------------------------------------
[search]
# Query used when none is given on the command line. Without either,
# the query is read interactively from standard input.
# query = "Spain"

# Send the query as the geoLocation filter as well as the keyword.
geo_location = true

# Only accept objects flagged as public domain.
public_domain_only = false

# ---------------------------------------------------------------------------
# Per-image normalization
# ---------------------------------------------------------------------------
[images]
# Images are shrunk (never enlarged) so neither side exceeds this.
max_dimension = 1000

# Solid padding around every image, in pixels.
border = 5
border_color = "#ffffff"

# Write downloads to <output.dir>/downloaded_images_<query>/ and reopen
# them before composing, instead of keeping them in memory.
persist = false

# ---------------------------------------------------------------------------
# Grid layout (sizes in inches, converted with dpi)
# ---------------------------------------------------------------------------
[layout]
cell_size = 3.0
dpi = 300

# Grid aspect ratio when there is no frame to match.
fallback_aspect = 1.5

# Space around each image inside its cell.
gutter = 0.1

# Crop the canvas to the drawn images, keeping `pad` around them.
tight_crop = true
pad = 0.1

background = "#d3d3d3"

# Fixed-width mode: at most max_columns columns on a canvas fixed_width
# inches wide. The frame's aspect ratio is ignored in this mode.
fixed_width = 35.0
# max_columns = 14

# ---------------------------------------------------------------------------
# Frame and caption (output.finish = "frame")
# ---------------------------------------------------------------------------
[frame]
path = "Imagen_de_marco.png"

# The collage is fitted inside (frame width - margin) x (frame height - margin).
margin = 400
background = "#d3d3d3"

caption_prefix = "The Metropolitan Museum of Art Collection: "
caption_size = 40.0
caption_color = "#000000"
caption_x = 10
caption_from_bottom = 50

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
dir = "output"

# frame  -> composite onto the frame image with a caption
# border -> expand the collage with a solid border
# plain  -> keep the grid as rendered
finish = "frame"

# Write objects_with_images_<query>.json listing accepted objects.
export_manifest = false

# Border width and color for finish = "border".
border = 20
border_color = "#ffd700"
"##
}
