use clap::{Parser, Subcommand};
use masonry_gal::drawer;
use masonry_gal::gallery::Gallery;
use masonry_gal::imaging::{PreviewConfig, RustBackend};
use masonry_gal::masonry::{ColumnSet, ScrollMetrics, StoreFetcher, Viewport, drive};
use masonry_gal::render::{self, PageParts};
use masonry_gal::source::{self, FileFetcher, GallerySource, ResourceFetcher, tag_categories};
use masonry_gal::store::{DirStore, list_all};
use masonry_gal::tag_bar::TagBar;
use masonry_gal::types::GalleryManifest;
use masonry_gal::{config, manifest, output, previews};
use std::path::{Path, PathBuf};
use std::time::Duration;
use web_time::Instant;

/// Shared flag for commands that read a local bucket mirror.
#[derive(clap::Args, Clone)]
struct StoreArgs {
    /// Directory mirroring the object store (keys are relative paths)
    #[arg(long, default_value = "bucket")]
    store: PathBuf,
}

#[derive(Parser)]
#[command(name = "masonry-gal")]
#[command(about = "Masonry photo gallery over an object store")]
#[command(long_about = "\
Masonry photo gallery over an object store

Originals live at <category>/<file>; previews at
0_preview/<category>/<base>.webp. The manifest groups every original by
category and is what the gallery page loads.

Bucket layout:

  bucket/
  ├── Birds/
  │   ├── owl.jpg
  │   └── crow.png
  ├── Trees/
  │   └── oak.jpg
  └── 0_preview/
      ├── Birds/owl.webp
      └── Trees/oak.webp

Run 'masonry-gal gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the gallery manifest from the store
    Manifest {
        #[command(flatten)]
        store: StoreArgs,
        /// Write the manifest here (the static fallback snapshot)
        #[arg(long, default_value = "gallery-index.json")]
        out: PathBuf,
    },
    /// Generate missing preview images
    Previews {
        #[command(flatten)]
        store: StoreArgs,
        /// Regenerate every preview, even existing ones
        #[arg(long)]
        force: bool,
        /// Delete previews whose original is gone
        #[arg(long)]
        prune: bool,
    },
    /// List originals without previews and orphaned previews
    Check {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Run the masonry loader headlessly and print the column layout
    Simulate {
        #[command(flatten)]
        store: StoreArgs,
        /// Use this manifest instead of building one from the store
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Load the manifest and category tree from the [source] locations
        /// in config.toml, falling back to the snapshot
        #[arg(long, conflicts_with = "manifest")]
        from_source: bool,
        /// Tag to show
        #[arg(long, default_value = source::ALL_TAG)]
        tag: String,
        #[arg(long, default_value_t = 1920.0)]
        width: f64,
        #[arg(long, default_value_t = 1080.0)]
        height: f64,
        /// Number of scrolls to the bottom after the initial load
        #[arg(long, default_value_t = 0)]
        scrolls: usize,
        /// Also write an HTML snapshot of the final layout
        #[arg(long)]
        html: Option<PathBuf>,
    },
    /// Render the gallery page shell
    Shell {
        /// Manifest used for the tag bar
        #[arg(long)]
        manifest: Option<PathBuf>,
        /// Category tree JSON for the drawer (default: [source] categories_endpoint)
        #[arg(long)]
        categories: Option<PathBuf>,
        #[arg(long, default_value = "index.html")]
        out: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let load_config = || config::load_config(&cli.config_dir);

    match cli.command {
        Command::Manifest { store, out } => {
            let config = load_config()?;
            let store = DirStore::new(&store.store);
            let manifest = manifest::build_from_store(&store, &config.source.public_base_url)?;
            let json = serde_json::to_string_pretty(&manifest)?;
            std::fs::write(&out, json)?;
            output::print_manifest_summary(&manifest);
            println!("==> Wrote {}", out.display());
        }
        Command::Previews {
            store,
            force,
            prune,
        } => {
            let config = load_config()?;
            init_thread_pool(&config.previews);
            let store = DirStore::new(&store.store);
            let plan = previews::plan_previews(&list_all(&store, "")?, force);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_preview_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = previews::generate_previews(
                &store,
                &RustBackend::new(),
                &plan,
                &PreviewConfig::from(&config.previews),
                prune,
                Some(tx),
            );
            printer.join().map_err(|_| "progress printer panicked")?;
            output::print_preview_report(&result?);
        }
        Command::Check { store } => {
            load_config()?;
            let store = DirStore::new(&store.store);
            let plan = previews::plan_previews(&list_all(&store, "")?, false);
            output::print_check(&plan);
        }
        Command::Simulate {
            store,
            manifest,
            from_source,
            tag,
            width,
            height,
            scrolls,
            html,
        } => {
            let config = load_config()?;
            let base_url = config.source.public_base_url.as_str();
            let store = DirStore::new(&store.store);
            let viewport = Viewport::new(width, height);
            let mut gallery = if from_source {
                Gallery::from_config(&config, viewport)?
            } else {
                let manifest = match manifest {
                    Some(path) => read_manifest(&path)?,
                    None => manifest::build_from_store(&store, base_url)?,
                };
                Gallery::new(GallerySource::from_manifest(manifest), None, &config, viewport)
            };
            gallery.mount();
            if tag != source::ALL_TAG && gallery.select_tag(&tag).is_none() {
                log::warn!("no tag button for '{tag}', showing all images");
            }

            let backend = RustBackend::new();
            let fetcher = StoreFetcher::new(&store, &backend, base_url);
            let mut served = drive(gallery.loader_mut(), &fetcher);

            // Step past the throttle interval between scrolls.
            let step = Duration::from_millis(config.loading.scroll_throttle_ms + 1);
            let mut now = Instant::now();
            for _ in 0..scrolls {
                now += step;
                let loader = gallery.loader_mut();
                let document_height = loader.content_height();
                let metrics = ScrollMetrics {
                    scroll_y: (document_height - height).max(0.0),
                    document_height,
                };
                if !loader.on_scroll(now, metrics) {
                    break;
                }
                served += drive(loader, &fetcher);
            }

            output::print_layout(gallery.loader().columns());
            println!(
                "==> {} placed from {} requests{}",
                gallery.loader().columns().rendered_count(),
                served,
                if gallery.loader().is_exhausted() {
                    ", list exhausted"
                } else {
                    ""
                }
            );

            if let Some(path) = html {
                let rows = gallery.drawer().rows();
                let page = render::render_page(&PageParts {
                    title: "Gallery",
                    tag_bar: gallery.tag_bar(),
                    drawer_rows: &rows,
                    drawer_query: gallery.drawer().query(),
                    columns: gallery.loader().columns(),
                    revealed: true,
                });
                std::fs::write(&path, page.into_string())?;
                println!("==> Wrote {}", path.display());
            }
        }
        Command::Shell {
            manifest,
            categories,
            out,
        } => {
            let config = load_config()?;
            let manifest = match manifest {
                Some(path) => read_manifest(&path)?,
                None => GalleryManifest::default(),
            };
            let names = tag_categories(&manifest);
            let endpoint = &config.source.categories_endpoint;
            let fetcher: Option<Box<dyn ResourceFetcher>> = match categories {
                Some(path) => Some(Box::new(FileFetcher::new(path))),
                None if endpoint.is_empty() => None,
                None => Some(source::fetcher_for(
                    endpoint,
                    Duration::from_secs(config.source.request_timeout_secs),
                )?),
            };
            let tree = drawer::load_tree(fetcher.as_deref(), &names);
            let tag_bar = TagBar::new(&config.drawer.all_label, &names);
            let rows = drawer::render_rows(&tree, "", None);
            let columns = ColumnSet::new(config.layout.wide_columns);
            let page = render::render_page(&PageParts {
                title: "Gallery",
                tag_bar: &tag_bar,
                drawer_rows: &rows,
                drawer_query: "",
                columns: &columns,
                revealed: false,
            });
            std::fs::write(&out, page.into_string())?;
            println!("==> Wrote {}", out.display());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn read_manifest(path: &Path) -> Result<GalleryManifest, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Initialize the rayon thread pool based on preview config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(previews: &config::PreviewsConfig) {
    let threads = config::effective_threads(previews);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
