//! Object store collaborator.
//!
//! The gallery's images live in a key-value blob store that offers prefix
//! listing with a continuation cursor, get, put (with content type) and batch
//! delete. [`ObjectStore`] is that contract; [`DirStore`] implements it over a
//! local directory that mirrors the bucket, one file per key.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
}

/// One page of a prefix listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub keys: Vec<String>,
    /// Pass back to [`ObjectStore::list`] for the next page; `None` when done.
    pub cursor: Option<String>,
}

pub trait ObjectStore: Sync {
    /// List keys starting with `prefix`, resuming after `cursor`.
    fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<ListPage, StoreError>;

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError>;

    /// Delete every key in `keys`. Missing keys are not an error.
    fn delete(&self, keys: &[String]) -> Result<(), StoreError>;
}

/// Follow continuation cursors until the listing is complete.
pub fn list_all(store: &impl ObjectStore, prefix: &str) -> Result<Vec<String>, StoreError> {
    let mut keys = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let page = store.list(prefix, cursor.as_deref())?;
        keys.extend(page.keys);
        match page.cursor {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }
    Ok(keys)
}

/// Content type for a key, from its extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Filesystem mirror of a bucket.
///
/// Listing is sorted by key so cursors are stable. The cursor is the last key
/// of the previous page.
pub struct DirStore {
    root: PathBuf,
    page_size: usize,
}

impl DirStore {
    pub const DEFAULT_PAGE_SIZE: usize = 1000;

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            page_size: Self::DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let invalid = key.is_empty()
            || key.starts_with('/')
            || key.contains('\\')
            || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..");
        if invalid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    fn all_keys(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(true) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.root)
                .map_err(|_| StoreError::InvalidKey(entry.path().display().to_string()))?;
            let key = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            keys.push(key);
        }
        keys.sort();
        Ok(keys)
    }
}

impl ObjectStore for DirStore {
    fn list(&self, prefix: &str, cursor: Option<&str>) -> Result<ListPage, StoreError> {
        let mut matching = self
            .all_keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .filter(|k| cursor.is_none_or(|c| k.as_str() > c));
        let keys: Vec<String> = matching.by_ref().take(self.page_size).collect();
        let cursor = match (matching.next(), keys.last()) {
            (Some(_), Some(last)) => Some(last.clone()),
            _ => None,
        };
        Ok(ListPage { keys, cursor })
    }

    fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(key)?;
        if !path.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        Ok(fs::read(path)?)
    }

    fn put(&self, key: &str, body: &[u8], content_type: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        log::debug!("put {key} ({content_type}, {} bytes)", body.len());
        fs::write(path, body)?;
        Ok(())
    }

    fn delete(&self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            let path = self.path_for(key)?;
            match fs::remove_file(&path) {
                Ok(()) => log::debug!("deleted {key}"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
