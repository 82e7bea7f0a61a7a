use clap::{Parser, Subcommand, ValueEnum};
use museum_collage::api::MetApi;
use museum_collage::config::{self, Finish, Profile, SiteConfig};
use museum_collage::layout::{CollageLayout, LayoutStrategy};
use museum_collage::{output, pipeline, resolve};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "museum-collage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Grid collages from a museum collection search")]
#[command(long_about = "\
Grid collages from a museum collection search

Searches The Metropolitan Museum of Art Collection API for a keyword and/or
geographic location, downloads the primary image of every matching object and
arranges them in a grid.

Artifacts (in the output directory, named after the query):

  collage_<query>.png                 Final collage
  collage_unframed_<query>.png        Only kept when framing failed
  objects_with_images_<query>.json    With --export-manifest
  downloaded_images_<query>/          With --persist-images

Profiles:
  framed   Geo search, frame + caption around the collage (default)
  export   Public domain only, manifest and images on disk, 14-column
           strip with a gold border

Run 'museum-collage gen-config' to generate a documented config.toml.")]
#[command(propagate_version = true)]
struct Cli {
    /// Config file [default: config.toml in the working directory, if present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Preset applied under the config file
    #[arg(long, value_enum, global = true, default_value_t = ProfileArg::Framed)]
    profile: ProfileArg,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: search → fetch → collect → compose → finish
    Build(BuildArgs),
    /// Search only: print the matching object IDs
    Search {
        /// Keyword and/or geographic location
        query: String,
        /// Do not send the query as a geoLocation filter
        #[arg(long)]
        no_geo: bool,
    },
    /// Print the grid that N images would get
    Layout {
        /// Number of images
        count: usize,
        /// Frame width/height ratio to match
        #[arg(long, conflicts_with = "max_columns")]
        aspect: Option<f64>,
        /// Fixed-width strip with at most this many columns
        #[arg(long)]
        max_columns: Option<usize>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args, Default)]
struct BuildArgs {
    /// Keyword and/or geographic location [default: search.query, then a prompt]
    query: Option<String>,
    /// Do not send the query as a geoLocation filter
    #[arg(long)]
    no_geo: bool,
    /// Only accept objects flagged as public domain
    #[arg(long)]
    public_domain_only: bool,
    /// Keep the downloaded images on disk
    #[arg(long)]
    persist_images: bool,
    /// Write the accepted objects as a JSON manifest
    #[arg(long)]
    export_manifest: bool,
    /// Fixed-width layout with at most this many columns
    #[arg(long)]
    max_columns: Option<usize>,
    /// Finishing step after the grid is rendered
    #[arg(long, value_enum)]
    finish: Option<FinishArg>,
    /// Frame image for the frame finish
    #[arg(long)]
    frame: Option<PathBuf>,
    /// Output directory
    #[arg(long)]
    output: Option<PathBuf>,
}

impl BuildArgs {
    /// CLI flags are the last config layer.
    fn apply(&self, config: &mut SiteConfig) {
        if self.no_geo {
            config.search.geo_location = false;
        }
        if self.public_domain_only {
            config.search.public_domain_only = true;
        }
        if self.persist_images {
            config.images.persist = true;
        }
        if self.export_manifest {
            config.output.export_manifest = true;
        }
        if let Some(max) = self.max_columns {
            config.layout.max_columns = Some(max);
        }
        if let Some(finish) = self.finish {
            config.output.finish = finish.into();
        }
        if let Some(frame) = &self.frame {
            config.frame.path = frame.to_string_lossy().into_owned();
        }
        if let Some(dir) = &self.output {
            config.output.dir = dir.to_string_lossy().into_owned();
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ProfileArg {
    Framed,
    Export,
}

impl From<ProfileArg> for Profile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::Framed => Profile::Framed,
            ProfileArg::Export => Profile::Export,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FinishArg {
    Frame,
    Border,
    Plain,
}

impl From<FinishArg> for Finish {
    fn from(arg: FinishArg) -> Self {
        match arg {
            FinishArg::Frame => Finish::Frame,
            FinishArg::Border => Finish::Border,
            FinishArg::Plain => Finish::Plain,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match &cli.command {
        Command::Build(args) => {
            let mut site_config = load_config(&cli)?;
            args.apply(&mut site_config);
            site_config.validate()?;

            let query = match args.query.clone().or_else(|| site_config.search.query.clone()) {
                Some(query) => query,
                None => resolve::prompt_query(&mut std::io::stdin().lock(), &mut std::io::stdout())?,
            };

            let api = MetApi::new(&site_config.api)?;
            let report = pipeline::run(
                &api,
                &site_config,
                &query,
                Path::new("."),
                &mut output::print_event,
            )?;
            output::print_run_summary(&report);
        }
        Command::Search { query, no_geo } => {
            let mut site_config = load_config(&cli)?;
            if *no_geo {
                site_config.search.geo_location = false;
            }
            let search = resolve::search_query(query, &site_config.search)?;
            let api = MetApi::new(&site_config.api)?;
            let ids = resolve::resolve(&api, &search)?;
            output::print_search(&search.text, &ids);
        }
        Command::Layout {
            count,
            aspect,
            max_columns,
        } => {
            let site_config = load_config(&cli)?;
            let strategy = match (aspect, max_columns) {
                (_, Some(max)) => LayoutStrategy::FixedWidth(*max),
                (Some(ratio), None) => LayoutStrategy::FrameAspect(*ratio),
                (None, None) => LayoutStrategy::choose(&site_config.layout, None),
            };
            match CollageLayout::plan(*count, strategy) {
                Some(layout) => output::print_layout(&layout),
                None => println!("No images, no grid"),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Diagnostics go to stderr; `RUST_LOG` overrides `-v`/`-q`.
fn init_tracing(verbose: u8, quiet: bool) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("museum_collage={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Stock defaults → profile → config file.
fn load_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    match &cli.config {
        Some(path) => {
            tracing::info!("Using config file: {}", path.display());
            let user = config::load_raw_config_file(path)?;
            config::load_profile_config(cli.profile.into(), Some(user))
        }
        None => config::load_config(Path::new("."), cli.profile.into()),
    }
}
