//! Synchronous host for the loader.
//!
//! Browser hosts answer [`FetchRequest`](super::FetchRequest)s from image
//! `onload`/`onerror` callbacks. Native hosts (the `simulate` command, tests)
//! use [`drive`], which answers them in a plain loop with an
//! [`ImageFetcher`].

use super::loader::{FetchOutcome, MasonryLoader};
use super::viewer::ViewerCommand;
use crate::imaging::ImageBackend;
use crate::keys;
use crate::store::ObjectStore;

/// Resolves an image URL to its pixel size, or a failure reason.
pub trait ImageFetcher {
    fn fetch(&self, url: &str) -> FetchOutcome;
}

/// Answer requests one at a time until the loader stops asking.
/// Returns the number of requests served.
pub fn drive(loader: &mut MasonryLoader, fetcher: &impl ImageFetcher) -> usize {
    let mut served = 0;
    while let Some(request) = loader.poll_request() {
        let outcome = fetcher.fetch(&request.url);
        loader.complete(request.ticket, outcome);
        served += 1;
    }
    served
}

/// Carry out viewer commands immediately.
///
/// Displays always succeed, EXIF always resolves to nothing, and a
/// full-resolution load succeeds when the fetcher can read the original.
pub fn serve_viewer(
    loader: &mut MasonryLoader,
    fetcher: &impl ImageFetcher,
    commands: Vec<ViewerCommand>,
) {
    for command in commands {
        match command {
            ViewerCommand::Show { token, .. } => loader.viewer_mut().display_loaded(token),
            ViewerCommand::RequestExif { token, .. } => loader.viewer_mut().apply_exif(token, None),
            ViewerCommand::RequestFullRes { token, url } => {
                let loaded = matches!(fetcher.fetch(&url), FetchOutcome::Loaded { .. });
                loader.viewer_mut().complete_full_res(token, loaded);
            }
            ViewerCommand::CancelFullRes | ViewerCommand::Closed => {}
        }
    }
}

/// Reads images out of an object store by mapping public URLs back to keys.
pub struct StoreFetcher<'a, S: ObjectStore, B: ImageBackend> {
    store: &'a S,
    backend: &'a B,
    base_url: String,
}

impl<'a, S: ObjectStore, B: ImageBackend> StoreFetcher<'a, S, B> {
    pub fn new(store: &'a S, backend: &'a B, base_url: impl Into<String>) -> Self {
        Self {
            store,
            backend,
            base_url: base_url.into(),
        }
    }
}

impl<S: ObjectStore, B: ImageBackend> ImageFetcher for StoreFetcher<'_, S, B> {
    fn fetch(&self, url: &str) -> FetchOutcome {
        let Some(key) = keys::key_from_url(&self.base_url, url) else {
            return FetchOutcome::Failed(format!("{url} is outside {}", self.base_url));
        };
        let bytes = match self.store.get(&key) {
            Ok(bytes) => bytes,
            Err(e) => return FetchOutcome::Failed(e.to_string()),
        };
        match self.backend.identify(&bytes) {
            Ok(dims) => FetchOutcome::Loaded {
                width: dims.width,
                height: dims.height,
            },
            Err(e) => FetchOutcome::Failed(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::RustBackend;
    use crate::masonry::{LoaderSettings, Viewport};
    use crate::store::DirStore;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn store_fetcher_reads_real_dimensions() {
        let tmp = TempDir::new().unwrap();
        let store = DirStore::new(tmp.path());
        store
            .put("0_preview/Cat/a.webp", &webp_bytes(40, 60), "image/webp")
            .unwrap();
        let backend = RustBackend::new();
        let fetcher = StoreFetcher::new(&store, &backend, "https://cdn.example");

        assert_eq!(
            fetcher.fetch("https://cdn.example/0_preview/Cat/a.webp"),
            FetchOutcome::Loaded {
                width: 40,
                height: 60
            }
        );
        assert!(matches!(
            fetcher.fetch("https://cdn.example/0_preview/Cat/missing.webp"),
            FetchOutcome::Failed(_)
        ));
        assert!(matches!(
            fetcher.fetch("https://elsewhere/0_preview/Cat/a.webp"),
            FetchOutcome::Failed(_)
        ));
    }

    #[test]
    fn store_fetcher_rejects_non_images() {
        let tmp = TempDir::new().unwrap();
        let store = DirStore::new(tmp.path());
        store.put("Cat/a.jpg", b"not an image", "image/jpeg").unwrap();
        let backend = RustBackend::new();
        let fetcher = StoreFetcher::new(&store, &backend, "");
        assert!(matches!(fetcher.fetch("/Cat/a.jpg"), FetchOutcome::Failed(_)));
    }

    #[test]
    fn drive_serves_every_request() {
        let manifest = manifest_with_count("Cat", 5);
        let mut loader = MasonryLoader::new(LoaderSettings::default(), Viewport::new(1920.0, 1080.0));
        loader.filter_images("Cat", &manifest);
        let fetcher = ScriptedFetcher::uniform(10, 10);
        assert_eq!(drive(&mut loader, &fetcher), 5);
        assert_eq!(drive(&mut loader, &fetcher), 0);
    }

    #[test]
    fn serve_viewer_settles_spinner_and_full_res() {
        let manifest = manifest_with_count("Cat", 2);
        let mut loader = MasonryLoader::new(LoaderSettings::default(), Viewport::new(1920.0, 1080.0));
        loader.filter_images("Cat", &manifest);
        let fetcher = ScriptedFetcher::uniform(10, 10);
        drive(&mut loader, &fetcher);

        let first = loader.active_list()[0].original_url.clone();
        let commands = loader.open_viewer(&first);
        serve_viewer(&mut loader, &fetcher, commands);
        assert!(!loader.viewer().state().unwrap().spinner);

        let commands = loader.viewer_input(crate::masonry::ViewerInput::LoadOriginal);
        serve_viewer(&mut loader, &fetcher, commands);
        let state = loader.viewer().state().unwrap();
        assert_eq!(state.display_url, first);
        assert!(state.exif.is_none());
    }
}
