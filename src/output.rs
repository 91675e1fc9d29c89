//! CLI output formatting for every command.
//!
//! Each command has a `format_*` function returning `Vec<String>` for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! Entities lead with a 3-digit positional index and their name; details are
//! indented four spaces per level underneath.
//!
//! ## Manifest
//!
//! ```text
//! Categories
//! 001 Birds (2 photos)
//!     001 owl.jpg
//!     002 crow.jpg
//!
//! 2 images in 1 category
//! ```
//!
//! ## Previews
//!
//! ```text
//! Birds/owl.jpg → 0_preview/Birds/owl.webp (400x300)
//! Birds/bad.jpg failed: Image processing failed: ...
//! pruned 0_preview/Birds/gone.webp
//! ```
//!
//! ## Simulate
//!
//! ```text
//! Column 001 (4 images, height 5.32)
//!     #003 owl.jpg
//!     #007 crow.jpg (original)
//! ```

use crate::masonry::ColumnSet;
use crate::previews::{PreviewEvent, PreviewPlan, PreviewReport};
use crate::types::GalleryManifest;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// manifest
// ============================================================================

pub fn format_manifest_summary(manifest: &GalleryManifest) -> Vec<String> {
    let mut lines = vec!["Categories".to_string()];
    for (i, entry) in manifest.gallery.values().enumerate() {
        lines.push(format!(
            "{} {} ({} photos)",
            format_index(i + 1),
            entry.name,
            entry.count
        ));
        for (j, image) in entry.images.iter().enumerate() {
            lines.push(format!("{}{} {}", indent(1), format_index(j + 1), image.name));
        }
    }
    lines.push(String::new());
    lines.push(format!(
        "{} in {}",
        plural(manifest.total_images, "image", "images"),
        plural(manifest.gallery.len(), "category", "categories")
    ));
    lines
}

pub fn print_manifest_summary(manifest: &GalleryManifest) {
    for line in format_manifest_summary(manifest) {
        println!("{}", line);
    }
}

// ============================================================================
// previews
// ============================================================================

/// Format a single preview progress event.
pub fn format_preview_event(event: &PreviewEvent) -> Vec<String> {
    match event {
        PreviewEvent::Generated {
            original_key,
            preview_key,
            width,
            height,
        } => vec![format!(
            "{} → {} ({}x{})",
            original_key, preview_key, width, height
        )],
        PreviewEvent::Failed {
            original_key,
            error,
        } => vec![format!("{} failed: {}", original_key, error)],
        PreviewEvent::Pruned { preview_key } => vec![format!("pruned {}", preview_key)],
    }
}

pub fn format_preview_report(report: &PreviewReport) -> Vec<String> {
    vec![format!("Previews: {}", report)]
}

pub fn print_preview_report(report: &PreviewReport) {
    for line in format_preview_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_check(plan: &PreviewPlan) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!("Missing previews ({})", plan.jobs.len()));
    for (i, job) in plan.jobs.iter().enumerate() {
        lines.push(format!(
            "{}{} {}",
            indent(1),
            format_index(i + 1),
            job.original_key
        ));
    }
    lines.push(format!("Orphaned previews ({})", plan.orphans.len()));
    for (i, key) in plan.orphans.iter().enumerate() {
        lines.push(format!("{}{} {}", indent(1), format_index(i + 1), key));
    }
    lines.push(format!("Up to date: {}", plan.up_to_date));
    lines
}

pub fn print_check(plan: &PreviewPlan) {
    for line in format_check(plan) {
        println!("{}", line);
    }
}

// ============================================================================
// simulate
// ============================================================================

/// One block per column, images in placement order with their list ordinal.
/// Images that only loaded from their original are marked.
pub fn format_layout(columns: &ColumnSet) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, column) in columns.columns().iter().enumerate() {
        lines.push(format!(
            "Column {} ({}, height {:.2})",
            format_index(i + 1),
            plural(column.images.len(), "image", "images"),
            column.virtual_height
        ));
        for image in &column.images {
            let fallback = if image.src == image.descriptor.original_url {
                " (original)"
            } else {
                ""
            };
            lines.push(format!(
                "{}#{} {}{}",
                indent(1),
                format_index(image.ordinal),
                image.descriptor.name,
                fallback
            ));
        }
    }
    lines
}

pub fn print_layout(columns: &ColumnSet) {
    for line in format_layout(columns) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::masonry::PlacedImage;
    use crate::previews::PreviewJob;
    use crate::test_helpers::{descriptor, manifest_of};

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn indent_levels() {
        assert_eq!(indent(0), "");
        assert_eq!(indent(2), "        ");
    }

    #[test]
    fn manifest_summary_lists_categories_and_images() {
        let manifest = manifest_of(&[("Birds", &["owl", "crow"]), ("Trees", &["oak"])]);
        let lines = format_manifest_summary(&manifest);
        assert_eq!(
            lines,
            vec![
                "Categories",
                "001 Birds (2 photos)",
                "    001 owl.jpg",
                "    002 crow.jpg",
                "002 Trees (1 photos)",
                "    001 oak.jpg",
                "",
                "3 images in 2 categories",
            ]
        );
    }

    #[test]
    fn empty_manifest_summary() {
        let lines = format_manifest_summary(&GalleryManifest::default());
        assert_eq!(lines.last().unwrap(), "0 images in 0 categories");
    }

    #[test]
    fn preview_events() {
        let generated = PreviewEvent::Generated {
            original_key: "Birds/owl.jpg".into(),
            preview_key: "0_preview/Birds/owl.webp".into(),
            width: 400,
            height: 300,
        };
        assert_eq!(
            format_preview_event(&generated),
            vec!["Birds/owl.jpg → 0_preview/Birds/owl.webp (400x300)"]
        );
        let pruned = PreviewEvent::Pruned {
            preview_key: "0_preview/Birds/gone.webp".into(),
        };
        assert_eq!(
            format_preview_event(&pruned),
            vec!["pruned 0_preview/Birds/gone.webp"]
        );
    }

    #[test]
    fn check_lists_missing_and_orphans() {
        let plan = PreviewPlan {
            jobs: vec![PreviewJob {
                original_key: "Birds/owl.jpg".into(),
                preview_key: "0_preview/Birds/owl.webp".into(),
                category: "Birds".into(),
            }],
            orphans: vec!["0_preview/Trees/gone.webp".into()],
            up_to_date: 4,
        };
        assert_eq!(
            format_check(&plan),
            vec![
                "Missing previews (1)",
                "    001 Birds/owl.jpg",
                "Orphaned previews (1)",
                "    001 0_preview/Trees/gone.webp",
                "Up to date: 4",
            ]
        );
    }

    #[test]
    fn layout_marks_original_fallbacks() {
        let mut columns = ColumnSet::new(1);
        let owl = descriptor("Birds", "owl");
        let crow = descriptor("Birds", "crow");
        columns.place(PlacedImage {
            src: owl.preview_url.clone(),
            descriptor: owl,
            aspect: 0.75,
            ordinal: 0,
        });
        columns.place(PlacedImage {
            src: crow.original_url.clone(),
            descriptor: crow,
            aspect: 1.5,
            ordinal: 3,
        });
        assert_eq!(
            format_layout(&columns),
            vec![
                "Column 001 (2 images, height 2.25)",
                "    #000 owl.jpg",
                "    #003 crow.jpg (original)",
            ]
        );
    }
}
