//! # Museum Collage
//!
//! Builds a grid collage from the images of a public museum collection. A
//! free-text query (a keyword, a place, or both) goes to the collection's
//! search API; every matching object with a primary image contributes one
//! tile; the tiles are laid out in a grid and optionally set into a
//! decorative frame with a caption.
//!
//! # Architecture: Five Sequential Stages
//!
//! ```text
//! 1. Search    query       →  object IDs        (one search request)
//! 2. Fetch     object IDs  →  image URLs        (one request per object)
//! 3. Collect   image URLs  →  normalized images (download, thumbnail, border)
//! 4. Compose   images      →  collage PNG       (grid layout + rendering)
//! 5. Finish    collage     →  framed/bordered   (frame + caption, or border)
//! ```
//!
//! Each stage hands its output to the next; nothing is shared globally. Any
//! single object or image that fails is skipped and reported, and the run
//! carries on with the rest. A stage that ends up with nothing to pass on
//! ends the run cleanly.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Runs the stages in order and reports [`pipeline::PipelineEvent`]s |
//! | [`api`] | `CollectionApi` trait and the blocking HTTP client for the Met API |
//! | [`resolve`] | Stage 1: query validation, search, interactive prompt |
//! | [`fetch`] | Stage 2: object records → accepted `{objectID, imageURL}` pairs |
//! | [`manifest`] | JSON export of the accepted pairs |
//! | [`collect`] | Stage 3: download, in-memory or on-disk, thumbnail and border |
//! | [`layout`] | Grid shape from image count and frame aspect |
//! | [`compose`] | Stage 4: grid rendering onto a background canvas |
//! | [`frame`] | Stage 5: frame composite with caption, or solid border |
//! | [`imaging`] | Pure-Rust image operations: dimension math, colors, resize, captions |
//! | [`config`] | `config.toml` loading, profiles, validation, stock config |
//! | [`naming`] | Artifact filenames derived from the query and image URLs |
//! | [`output`] | CLI output formatting of events and inspection commands |
//! | [`types`] | Shared types passed between stages |
//!
//! # Design Decisions
//!
//! ## Profiles Over Variants
//!
//! Two ways of running the pipeline are common enough to get a name:
//! `framed` (the default: geo-filtered search, in-memory images, framed and
//! captioned result) and `export` (public-domain only, images and a JSON
//! manifest kept on disk, a wide 14-column strip with a gold border). A
//! profile is nothing more than a TOML overlay between the stock defaults and
//! the user's `config.toml`, so every setting it touches can still be
//! overridden individually.
//!
//! ## Native Grid Rendering
//!
//! The collage is rasterized directly with the `image` crate: sizes are given
//! in inches and converted at the configured dpi, each image is fitted into
//! its cell and centered, and the canvas is optionally cropped to its content.
//! No plotting library, no system dependencies.
//!
//! ## Trait-Backed HTTP
//!
//! Every network call goes through [`api::CollectionApi`]. The production
//! client is a blocking `reqwest` client; tests substitute a recording mock,
//! so the whole pipeline runs in unit tests without a network.

pub mod api;
pub mod collect;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod frame;
pub mod imaging;
pub mod layout;
pub mod manifest;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod resolve;
pub mod types;
