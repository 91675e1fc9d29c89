//! Category tree and its flattened, searchable rendering.
//!
//! The tree comes from the category endpoint:
//!
//! ```json
//! { "categories": [ { "id": "1", "name": "Travel", "children": [ ... ] } ] }
//! ```
//!
//! A node without children is a leaf. Rendering walks the tree once and emits
//! one [`DrawerRow`] per node: branches become section titles, leaves become
//! tag chips. Search hides a node unless its own label or any descendant's
//! label contains the query (case-insensitive); an empty query shows all.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryNode {
    Leaf(String),
    Branch {
        name: String,
        children: Vec<CategoryNode>,
    },
}

impl CategoryNode {
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(name) | Self::Branch { name, .. } => name,
        }
    }

    pub fn children(&self) -> &[CategoryNode] {
        match self {
            Self::Leaf(_) => &[],
            Self::Branch { children, .. } => children,
        }
    }

    /// Visible under `query`, which must already be lowercase.
    fn is_visible(&self, query: &str) -> bool {
        query.is_empty()
            || self.name().to_lowercase().contains(query)
            || self.children().iter().any(|c| c.is_visible(query))
    }
}

#[derive(Deserialize)]
struct RawTree {
    #[serde(default)]
    categories: Vec<RawNode>,
}

#[derive(Deserialize)]
struct RawNode {
    name: String,
    #[serde(default)]
    children: Vec<RawNode>,
}

impl From<RawNode> for CategoryNode {
    fn from(raw: RawNode) -> Self {
        if raw.children.is_empty() {
            Self::Leaf(raw.name)
        } else {
            Self::Branch {
                name: raw.name,
                children: raw.children.into_iter().map(Into::into).collect(),
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryTree {
    pub roots: Vec<CategoryNode>,
}

impl CategoryTree {
    /// Parse the category endpoint's JSON. Unknown fields such as `id` are ignored.
    pub fn parse_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawTree = serde_json::from_slice(bytes)?;
        Ok(Self {
            roots: raw.categories.into_iter().map(Into::into).collect(),
        })
    }

    /// Used when no category tree has been configured yet.
    pub fn default_tree() -> Self {
        Self {
            roots: (1..=3)
                .map(|i| CategoryNode::Leaf(format!("Category {i}")))
                .collect(),
        }
    }

    /// Flat tree with one leaf per manifest category.
    pub fn from_categories<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            roots: names
                .iter()
                .map(|n| CategoryNode::Leaf(n.as_ref().to_string()))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    SectionTitle,
    TagChip,
}

/// One rendered node. Hidden rows are kept with `visible = false`, the way the
/// page hides elements rather than removing them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawerRow {
    pub depth: usize,
    pub kind: RowKind,
    pub label: String,
    /// Tag selected when the row is tapped.
    pub tag: String,
    pub visible: bool,
    pub active: bool,
}

/// Flatten the tree into rows in depth-first order.
pub fn render_rows(tree: &CategoryTree, query: &str, active_tag: Option<&str>) -> Vec<DrawerRow> {
    let query = query.trim().to_lowercase();
    let mut rows = Vec::new();
    for node in &tree.roots {
        push_rows(node, 0, &query, active_tag, &mut rows);
    }
    rows
}

fn push_rows(
    node: &CategoryNode,
    depth: usize,
    query: &str,
    active_tag: Option<&str>,
    rows: &mut Vec<DrawerRow>,
) {
    let kind = match node {
        CategoryNode::Leaf(_) => RowKind::TagChip,
        CategoryNode::Branch { .. } => RowKind::SectionTitle,
    };
    rows.push(DrawerRow {
        depth,
        kind,
        label: node.name().to_string(),
        tag: node.name().to_string(),
        visible: node.is_visible(query),
        active: active_tag == Some(node.name()),
    });
    for child in node.children() {
        push_rows(child, depth + 1, query, active_tag, rows);
    }
}
