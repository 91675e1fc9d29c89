//! HTML rendering of the gallery page.
//!
//! Produces the markup the browser host binds to. Element IDs and classes are
//! part of the contract and must not change without updating the host:
//!
//! | Selector | Element |
//! |---|---|
//! | `.tag-bar` | Filter bar, one `button[data-tag]` per tag |
//! | `.gallery` | Masonry container, one `.column` per column |
//! | `#loading` | Batch loading indicator |
//! | `#myModal`, `#img01` | Viewer overlay and its image |
//! | `.prev-btn`, `.next-btn`, `.close` | Viewer controls |
//! | `#exif-info`, `#load-original-btn`, `#modal-loading` | Viewer panel, full-res button, spinner |
//! | `#negative-floor` | Drawer container |
//! | `#nf-search-input`, `#nf-tag-grid`, `#nf-close-btn` | Drawer search, rows, close button |
//!
//! Uses [maud](https://maud.lambda.xyz/); all interpolation is escaped.

use crate::drawer::{DrawerRow, RowKind};
use crate::masonry::{ColumnSet, ExifData};
use crate::tag_bar::TagBar;
use maud::{DOCTYPE, Markup, html};

const CSS: &str = include_str!("../static/gallery.css");

/// Everything the page shell needs.
pub struct PageParts<'a> {
    pub title: &'a str,
    pub tag_bar: &'a TagBar,
    pub drawer_rows: &'a [DrawerRow],
    pub drawer_query: &'a str,
    pub columns: &'a ColumnSet,
    /// Whether the first batch has finished and the gallery may be shown.
    pub revealed: bool,
}

pub fn render_page(parts: &PageParts) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (parts.title) }
                style { (CSS) }
            }
            body {
                (render_drawer(parts.drawer_rows, parts.drawer_query))
                (render_tag_bar(parts.tag_bar))
                (render_columns(parts.columns, parts.revealed))
                div id="loading" hidden { "Loading…" }
                (render_viewer())
            }
        }
    }
}

pub fn render_tag_bar(bar: &TagBar) -> Markup {
    html! {
        nav.tag-bar {
            @for button in bar.buttons() {
                button type="button" class=[button.active.then_some("active")]
                    data-tag=(button.value) {
                    (button.label)
                }
            }
        }
    }
}

/// The masonry container. Column snapshots are used for server-side first
/// paint and for the `simulate` command's HTML output.
pub fn render_columns(columns: &ColumnSet, revealed: bool) -> Markup {
    html! {
        div.gallery.revealed[revealed] data-columns=(columns.len()) {
            @for column in columns.columns() {
                div.column {
                    @for image in &column.images {
                        img src=(image.src) alt=(image.descriptor.name)
                            data-original=(image.descriptor.original_url)
                            data-ordinal=(image.ordinal)
                            loading="lazy";
                    }
                }
            }
        }
    }
}

fn render_viewer() -> Markup {
    html! {
        div id="myModal" class="modal" {
            button.close type="button" aria-label="Close" { "×" }
            button.prev-btn type="button" aria-label="Previous" { "‹" }
            img id="img01" class="modal-content" alt="";
            div id="modal-loading" hidden { "Loading…" }
            button.next-btn type="button" aria-label="Next" { "›" }
            button id="load-original-btn" type="button" hidden { "Load original" }
            div id="exif-info" {}
        }
    }
}

/// Contents of `#exif-info` once metadata resolves.
pub fn render_exif(exif: &ExifData) -> Markup {
    html! {
        @if exif.is_empty() {
            p.exif-empty { "No EXIF data" }
        } @else {
            dl {
                @for (label, value) in exif.lines() {
                    dt { (label) }
                    dd { (value) }
                }
            }
        }
    }
}

pub fn render_drawer(rows: &[DrawerRow], query: &str) -> Markup {
    html! {
        div id="negative-floor" {
            div.nf-header {
                input id="nf-search-input" type="search" placeholder="Search categories"
                    value=(query);
                button id="nf-close-btn" type="button" aria-label="Close" { "×" }
            }
            div id="nf-tag-grid" {
                @for row in rows {
                    (render_drawer_row(row))
                }
            }
        }
    }
}

fn render_drawer_row(row: &DrawerRow) -> Markup {
    let kind = match row.kind {
        RowKind::SectionTitle => "nf-section",
        RowKind::TagChip => "nf-tag",
    };
    let class = if row.active {
        format!("{kind} active")
    } else {
        kind.to_string()
    };
    html! {
        div class=(class) hidden[!row.visible]
            data-tag=(row.tag) data-depth=(row.depth)
            style={ "margin-left: " (row.depth * 16) "px" } {
            (row.label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drawer::{CategoryNode, CategoryTree, render_rows};
    use crate::masonry::PlacedImage;
    use crate::test_helpers::descriptor;

    fn abc_rows(query: &str) -> Vec<DrawerRow> {
        let tree = CategoryTree {
            roots: vec![CategoryNode::Branch {
                name: "A".into(),
                children: vec![CategoryNode::Leaf("C".into())],
            }],
        };
        render_rows(&tree, query, Some("C"))
    }

    #[test]
    fn page_carries_dom_contract() {
        let bar = TagBar::new("All", &["Birds"]);
        let rows = abc_rows("");
        let columns = ColumnSet::new(4);
        let html = render_page(&PageParts {
            title: "Gallery",
            tag_bar: &bar,
            drawer_rows: &rows,
            drawer_query: "",
            columns: &columns,
            revealed: false,
        })
        .into_string();

        assert!(html.starts_with("<!DOCTYPE html>"));
        for needle in [
            r#"class="gallery""#,
            r#"id="myModal""#,
            r#"id="img01""#,
            r#"class="prev-btn""#,
            r#"class="next-btn""#,
            r#"class="close""#,
            r#"id="exif-info""#,
            r#"id="load-original-btn""#,
            r#"id="modal-loading""#,
            r#"id="negative-floor""#,
            r#"id="nf-search-input""#,
            r#"id="nf-tag-grid""#,
            r#"id="nf-close-btn""#,
            r#"id="loading""#,
        ] {
            assert!(html.contains(needle), "missing {needle}");
        }
        assert_eq!(html.matches(r#"class="column""#).count(), 4);
    }

    #[test]
    fn tag_bar_marks_active_button() {
        let mut bar = TagBar::new("All", &["Birds", "Trees"]);
        bar.select_tag_by_value("Trees");
        let html = render_tag_bar(&bar).into_string();
        assert!(html.contains(r#"<button type="button" class="active" data-tag="Trees">"#));
        assert!(html.contains(r#"data-tag="all""#));
    }

    #[test]
    fn columns_render_placed_images() {
        let mut columns = ColumnSet::new(2);
        let owl = descriptor("Birds", "owl");
        columns.place(PlacedImage {
            src: owl.preview_url.clone(),
            descriptor: owl,
            aspect: 1.5,
            ordinal: 0,
        });
        let html = render_columns(&columns, true).into_string();
        assert!(html.contains(r#"class="gallery revealed""#));
        assert!(html.contains(r#"src="https://cdn.example/0_preview/Birds/owl.webp""#));
        assert!(html.contains(r#"data-original="https://cdn.example/Birds/owl.jpg""#));
    }

    #[test]
    fn hidden_drawer_rows_keep_their_markup() {
        let html = render_drawer(&abc_rows("zzz"), "zzz").into_string();
        assert_eq!(html.matches("hidden").count(), 2);
        assert!(html.contains(r#"value="zzz""#));
    }

    #[test]
    fn drawer_rows_indent_by_depth() {
        let html = render_drawer(&abc_rows(""), "").into_string();
        assert!(html.contains(r#"class="nf-section""#));
        assert!(html.contains(r#"data-depth="1""#));
        assert!(html.contains("margin-left: 16px"));
    }

    #[test]
    fn exif_panel_lists_present_fields() {
        let exif = ExifData {
            aperture: Some("f/2.8".into()),
            iso: Some("400".into()),
            ..ExifData::default()
        };
        let html = render_exif(&exif).into_string();
        assert!(html.contains("<dt>Aperture</dt><dd>f/2.8</dd>"));
        assert!(html.contains("<dt>ISO</dt><dd>400</dd>"));
        assert!(!html.contains("Lens"));

        let empty = render_exif(&ExifData::default()).into_string();
        assert!(empty.contains("No EXIF data"));
    }

    #[test]
    fn labels_are_escaped() {
        let bar = TagBar::new("All", &["<script>"]);
        let html = render_tag_bar(&bar).into_string();
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
