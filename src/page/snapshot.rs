//! Snapshot front-end: a captured JSON tree with computed styles and geometry

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::geometry::{BoundingBox, ViewportInfo};
use super::{NodeId, PageTree};

/// A page captured with layout information, one node per element
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportInfo>,
    pub root: SnapshotNode,
}

/// One captured element
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,
    /// Direct text content, stored ahead of any child elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Computed styles as captured; merged over any inline style
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub styles: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<BoundingBox>,
    /// Captured visibility verdict; false maps to display:none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SnapshotNode>,
}

pub(super) fn build(snapshot: PageSnapshot) -> PageTree {
    let mut tree = PageTree::new();
    tree.url = snapshot.url;
    tree.title = snapshot.title;
    tree.viewport = snapshot.viewport;
    let root = tree.root();
    append(&mut tree, root, &snapshot.root);
    tree
}

pub(super) fn build_json(json: &str) -> Result<PageTree> {
    let snapshot: PageSnapshot =
        serde_json::from_str(json).context("Failed to parse page snapshot")?;
    Ok(build(snapshot))
}

fn append(tree: &mut PageTree, parent: NodeId, node: &SnapshotNode) {
    let id = tree.push_element(parent, &node.tag, node.attrs.clone());
    for (property, value) in &node.styles {
        tree.insert_style(id, property, value);
    }
    if node.visible == Some(false) {
        tree.insert_style(id, "display", "none");
    }
    if let Some(bounds) = node.bounds {
        tree.set_bounds(id, bounds);
    }
    if let Some(text) = &node.text
        && !text.trim().is_empty()
    {
        tree.push_text(id, text);
    }
    for child in &node.children {
        append(tree, id, child);
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
