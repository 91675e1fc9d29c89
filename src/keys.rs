//! Object-key conventions for originals and previews.
//!
//! Originals live at `<category>/<file>` (deeper keys keep the first segment
//! as the category and the last as the file). Previews mirror them under a
//! reserved prefix with a fixed extension:
//!
//! - `Birds/owl.jpg` → `0_preview/Birds/owl.webp`
//! - `Trips/2024/rome.PNG` → `0_preview/Trips/rome.webp`
//!
//! Public URLs are the object key joined onto a configured base URL.

/// Reserved top-level prefix that holds previews. Never a category.
pub const PREVIEW_PREFIX: &str = "0_preview";

/// Extension written for every preview.
pub const PREVIEW_EXTENSION: &str = "webp";

/// Original-image extensions recognised in listings (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "webp"];

/// Result of parsing an original's object key like `Birds/owl.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalKey {
    /// First path segment.
    pub category: String,
    /// Last path segment, extension included.
    pub file_name: String,
    /// File name up to the last dot.
    pub base_name: String,
}

impl OriginalKey {
    /// Object key of this original's preview.
    pub fn preview_key(&self) -> String {
        format!(
            "{}/{}/{}.{}",
            PREVIEW_PREFIX, self.category, self.base_name, PREVIEW_EXTENSION
        )
    }

    /// Canonical key the manifest uses for the original.
    pub fn original_key(&self) -> String {
        format!("{}/{}", self.category, self.file_name)
    }
}

/// Returns true when the key ends in a recognised image extension.
pub fn is_image_key(key: &str) -> bool {
    key.rsplit_once('.')
        .map(|(_, ext)| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Parse an original's object key.
///
/// Returns `None` for preview keys, keys without a category segment and
/// non-image files:
/// - `"Birds/owl.jpg"` → category=`Birds`, file_name=`owl.jpg`, base_name=`owl`
/// - `"owl.jpg"` → `None`
/// - `"0_preview/Birds/owl.webp"` → `None`
/// - `"Birds/notes.txt"` → `None`
pub fn parse_original_key(key: &str) -> Option<OriginalKey> {
    if key.starts_with(&format!("{PREVIEW_PREFIX}/")) || !is_image_key(key) {
        return None;
    }
    let parts: Vec<&str> = key.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return None;
    }
    let category = parts[0];
    let file_name = parts[parts.len() - 1];
    let base_name = match file_name.rfind('.') {
        Some(0) | None => return None,
        Some(dot) => &file_name[..dot],
    };
    Some(OriginalKey {
        category: category.to_string(),
        file_name: file_name.to_string(),
        base_name: base_name.to_string(),
    })
}

/// Parse a preview key back into `(category, base_name)`.
///
/// `"0_preview/Birds/owl.webp"` → `Some(("Birds", "owl"))`
pub fn parse_preview_key(key: &str) -> Option<(String, String)> {
    let rest = key.strip_prefix(PREVIEW_PREFIX)?.strip_prefix('/')?;
    let (category, file) = rest.split_once('/')?;
    let base = file.strip_suffix(&format!(".{PREVIEW_EXTENSION}"))?;
    if category.is_empty() || base.is_empty() || base.contains('/') {
        return None;
    }
    Some((category.to_string(), base.to_string()))
}

/// Join a base URL and an object key with exactly one slash.
///
/// An empty base yields a root-relative URL (`/Birds/owl.jpg`).
pub fn public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

/// Inverse of [`public_url`]: recover the object key from a URL under `base`.
pub fn key_from_url(base: &str, url: &str) -> Option<String> {
    let base = base.trim_end_matches('/');
    let rest = url.strip_prefix(base)?.strip_prefix('/')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest.to_string())
    }
}
