//! End-to-end flow over a local bucket: build the manifest, generate
//! previews, serve the manifest through the fallback path, mount the gallery
//! and drive the loader with real image bytes.

use masonry_gal::config::GalleryConfig;
use masonry_gal::gallery::Gallery;
use masonry_gal::imaging::{PreviewConfig, RustBackend};
use masonry_gal::manifest::build_from_store;
use masonry_gal::masonry::{
    LoaderEvent, StoreFetcher, ViewerCommand, ViewerInput, Viewport, drive, serve_viewer,
};
use masonry_gal::previews::{generate_previews, plan_previews};
use masonry_gal::source::{FileFetcher, GallerySource, ImageCatalog};
use masonry_gal::store::{DirStore, ObjectStore, list_all};
use std::io::Cursor;
use tempfile::TempDir;

const BASE: &str = "https://cdn.example";

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 90])
    });
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

/// Bucket with three categories and a mix of orientations.
fn bucket() -> (TempDir, DirStore) {
    let tmp = TempDir::new().unwrap();
    let store = DirStore::new(tmp.path().join("bucket"));
    let files: &[(&str, (u32, u32))] = &[
        ("Birds/owl.jpg", (600, 800)),
        ("Birds/crow.jpg", (800, 600)),
        ("Birds/wren.jpg", (500, 500)),
        ("Trees/oak.jpg", (900, 600)),
        ("Trees/pine.jpg", (400, 900)),
        ("Cities/rome.jpg", (1000, 500)),
    ];
    for (key, (w, h)) in files {
        store.put(key, &jpeg(*w, *h), "image/jpeg").unwrap();
    }
    (tmp, store)
}

fn generate_all(store: &DirStore) {
    let plan = plan_previews(&list_all(store, "").unwrap(), false);
    let report = generate_previews(
        store,
        &RustBackend::new(),
        &plan,
        &PreviewConfig::default(),
        false,
        None,
    )
    .unwrap();
    assert_eq!(report.failed, 0);
}

#[test]
fn manifest_and_previews_from_bucket() {
    let (_tmp, store) = bucket();
    let manifest = build_from_store(&store, BASE).unwrap();
    assert_eq!(manifest.total_images, 6);
    assert_eq!(
        manifest.categories(),
        vec!["Birds".to_string(), "Cities".into(), "Trees".into()]
    );

    generate_all(&store);
    let plan = plan_previews(&list_all(&store, "").unwrap(), false);
    assert!(plan.jobs.is_empty());
    assert_eq!(plan.up_to_date, 6);

    // Previews never enlarge and fit the 400px box.
    let preview = store.get("0_preview/Trees/pine.webp").unwrap();
    let decoded = image::load_from_memory(&preview).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (178, 400));

    // The manifest ignores the previews it now sees in the listing.
    assert_eq!(build_from_store(&store, BASE).unwrap().total_images, 6);
}

#[test]
fn gallery_loads_from_snapshot_and_places_everything() {
    let (tmp, store) = bucket();
    generate_all(&store);

    let snapshot = tmp.path().join("gallery-index.json");
    let manifest = build_from_store(&store, BASE).unwrap();
    std::fs::write(&snapshot, serde_json::to_vec(&manifest).unwrap()).unwrap();

    let source = GallerySource::new(
        Box::new(FileFetcher::new(tmp.path().join("missing.json"))),
        Some(Box::new(FileFetcher::new(&snapshot))),
    );
    let mut gallery = Gallery::new(
        source,
        None,
        &GalleryConfig::default(),
        Viewport::new(1920.0, 1080.0),
    );
    assert_eq!(gallery.mount().total_images, 6);

    let backend = RustBackend::new();
    let fetcher = StoreFetcher::new(&store, &backend, BASE);
    drive(gallery.loader_mut(), &fetcher);

    let loader = gallery.loader();
    assert_eq!(loader.columns().len(), 8);
    assert_eq!(loader.columns().rendered_count(), 6);
    assert!(loader.is_exhausted());
    assert!(
        loader
            .columns()
            .placed()
            .all(|p| p.src == p.descriptor.preview_url)
    );
    let events = gallery.loader_mut().drain_events();
    assert!(events.contains(&LoaderEvent::RevealGallery));
}

#[test]
fn missing_preview_falls_back_to_original() {
    let (_tmp, store) = bucket();
    generate_all(&store);
    store
        .delete(&["0_preview/Birds/owl.webp".to_string()])
        .unwrap();

    let manifest = build_from_store(&store, BASE).unwrap();
    let mut gallery = Gallery::new(
        GallerySource::from_manifest(manifest),
        None,
        &GalleryConfig::default(),
        Viewport::new(1920.0, 1080.0),
    );
    gallery.mount();
    assert!(gallery.select_tag("Birds").is_some());

    let backend = RustBackend::new();
    let fetcher = StoreFetcher::new(&store, &backend, BASE);
    drive(gallery.loader_mut(), &fetcher);

    let owl = gallery
        .loader()
        .columns()
        .placed()
        .find(|p| p.descriptor.name == "owl.jpg")
        .unwrap();
    assert_eq!(owl.src, format!("{BASE}/Birds/owl.jpg"));
    assert_eq!(gallery.loader().columns().rendered_count(), 3);
}

#[test]
fn viewer_walks_the_active_list_and_relayout_keeps_order() {
    let (_tmp, store) = bucket();
    generate_all(&store);
    let manifest = build_from_store(&store, BASE).unwrap();
    let mut gallery = Gallery::new(
        GallerySource::from_manifest(manifest),
        None,
        &GalleryConfig::default(),
        Viewport::new(1920.0, 1080.0),
    );
    gallery.mount();
    gallery.select_tag("Birds");

    let backend = RustBackend::new();
    let fetcher = StoreFetcher::new(&store, &backend, BASE);
    drive(gallery.loader_mut(), &fetcher);

    let list = gallery.loader().active_list().to_vec();
    assert_eq!(list.len(), 3);

    let loader = gallery.loader_mut();
    let commands = loader.open_viewer(&list[0].original_url);
    assert!(matches!(commands[0], ViewerCommand::Show { .. }));
    serve_viewer(loader, &fetcher, commands);
    assert_eq!(loader.viewer().state().unwrap().current_index, 0);

    // Previous at the start is a no-op.
    assert!(loader.viewer_input(ViewerInput::Previous).is_empty());
    for expected in [1, 2, 2] {
        let commands = loader.viewer_input(ViewerInput::Next);
        serve_viewer(loader, &fetcher, commands);
        assert_eq!(loader.viewer().state().unwrap().current_index, expected);
    }

    // Full resolution of the current image loads from the store.
    let commands = loader.viewer_input(ViewerInput::LoadOriginal);
    serve_viewer(loader, &fetcher, commands);
    let state = loader.viewer().state().unwrap();
    assert_eq!(state.display_url, list[2].original_url);
    assert!(!state.spinner);

    loader.viewer_input(ViewerInput::Close);
    assert!(!loader.viewer().is_open());

    let before: Vec<usize> = {
        let mut ordinals: Vec<usize> = loader.columns().placed().map(|p| p.ordinal).collect();
        ordinals.sort();
        ordinals
    };
    loader.resize(Viewport::new(500.0, 900.0));
    assert_eq!(loader.columns().len(), 4);
    let mut after: Vec<usize> = loader.columns().placed().map(|p| p.ordinal).collect();
    after.sort();
    assert_eq!(before, after);
    // Ordinals within each column stay increasing after the relayout.
    for column in loader.columns().columns() {
        assert!(column.images.windows(2).all(|w| w[0].ordinal < w[1].ordinal));
    }
}
