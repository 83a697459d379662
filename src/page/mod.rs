//! Offline page model: an owned arena tree with optional pixel geometry.
//!
//! Trees are loaded from raw HTML (no geometry) or from a JSON snapshot
//! captured with computed styles and bounding boxes. All analysis walks this
//! structure; nothing here talks to a live document.

pub mod geometry;
mod html;
mod snapshot;

pub use geometry::{BoundingBox, ViewportInfo};
pub use snapshot::{PageSnapshot, SnapshotNode};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Handle into the page arena. Ids are assigned in pre-order during
/// construction, so ordering node ids reproduces document order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// What a node is
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: HashMap<String, String>,
    },
    Text(String),
}

/// One node in the arena
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageNode {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Present only for snapshot-built trees
    pub bounds: Option<BoundingBox>,
    /// Inline or snapshot-computed styles, property names lowercased
    pub styles: HashMap<String, String>,
}

/// An owned page tree with an id index and optional page metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PageTree {
    nodes: Vec<PageNode>,
    root: NodeId,
    ids: HashMap<String, NodeId>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub viewport: Option<ViewportInfo>,
}

impl PageTree {
    /// Empty tree with a synthetic document root
    pub fn new() -> Self {
        let root = PageNode {
            kind: NodeKind::Element {
                tag: "#document".to_string(),
                attrs: HashMap::new(),
            },
            parent: None,
            children: Vec::new(),
            bounds: None,
            styles: HashMap::new(),
        };
        PageTree {
            nodes: vec![root],
            root: NodeId(0),
            ids: HashMap::new(),
            url: None,
            title: None,
            viewport: None,
        }
    }

    /// Parse an HTML document into a tree without geometry
    pub fn from_html(html: &str) -> anyhow::Result<Self> {
        html::build(html)
    }

    /// Build a tree from a captured snapshot
    pub fn from_snapshot(snapshot: PageSnapshot) -> Self {
        snapshot::build(snapshot)
    }

    /// Deserialize and build a tree from snapshot JSON
    pub fn from_snapshot_json(json: &str) -> anyhow::Result<Self> {
        snapshot::build_json(json)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // The synthetic root is always present
        self.nodes.len() <= 1
    }

    pub fn get(&self, id: NodeId) -> Option<&PageNode> {
        self.nodes.get(id.0)
    }

    pub fn node(&self, id: NodeId) -> &PageNode {
        &self.nodes[id.0]
    }

    /// Append an element under `parent`, registering its id attribute
    pub fn push_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let mut styles = HashMap::new();
        if let Some(style) = attrs.get("style") {
            styles = parse_inline_style(style);
        }
        let id = NodeId(self.nodes.len());
        if let Some(dom_id) = attrs.get("id")
            && !dom_id.is_empty()
        {
            self.ids.entry(dom_id.clone()).or_insert(id);
        }
        self.nodes.push(PageNode {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attrs,
            },
            parent: Some(parent),
            children: Vec::new(),
            bounds: None,
            styles,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a text node under `parent`
    pub fn push_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(PageNode {
            kind: NodeKind::Text(text.to_string()),
            parent: Some(parent),
            children: Vec::new(),
            bounds: None,
            styles: HashMap::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: BoundingBox) {
        self.nodes[id.0].bounds = Some(bounds);
    }

    pub fn insert_style(&mut self, id: NodeId, property: &str, value: &str) {
        self.nodes[id.0]
            .styles
            .insert(property.to_ascii_lowercase(), value.to_string());
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Element { .. })
    }

    /// Tag name, lowercase, for element nodes
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Element { attrs, .. } => attrs.get(name).map(|v| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Class attribute split on whitespace
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        self.attr(id, "class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// First element registered under this DOM id
    pub fn by_id(&self, dom_id: &str) -> Option<NodeId> {
        self.ids.get(dom_id).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Ancestors of `id`, nearest first, excluding `id` itself
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&n| self.parent(n))
    }

    /// Element siblings before `id`, nearest first
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        self.siblings_before(id, true)
    }

    /// Element siblings after `id`, nearest first
    pub fn following_siblings(&self, id: NodeId) -> Vec<NodeId> {
        self.siblings_before(id, false)
    }

    fn siblings_before(&self, id: NodeId, before: bool) -> Vec<NodeId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        let siblings = self.children(parent);
        let Some(pos) = siblings.iter().position(|&s| s == id) else {
            return Vec::new();
        };
        let picked: Vec<NodeId> = if before {
            siblings[..pos].iter().rev().copied().collect()
        } else {
            siblings[pos + 1..].to_vec()
        };
        picked.into_iter().filter(|&s| self.is_element(s)).collect()
    }

    /// Subtree of `id` in pre-order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// Element nodes of the subtree in pre-order
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|&n| self.is_element(n))
            .collect()
    }

    /// Every element on the page in document order
    pub fn all_elements(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root)
    }

    /// True if `node` is `ancestor` or inside its subtree
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        if ancestor == node {
            return true;
        }
        self.ancestors(node).any(|a| a == ancestor)
    }

    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Recursive text content, whitespace collapsed
    pub fn text_content(&self, id: NodeId) -> String {
        let mut pieces = Vec::new();
        if let NodeKind::Text(t) = &self.node(id).kind {
            pieces.push(t.as_str());
        }
        for n in self.descendants(id) {
            if let NodeKind::Text(t) = &self.node(n).kind {
                pieces.push(t.as_str());
            }
        }
        collapse_whitespace(&pieces.join(" "))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.node(id).styles.get(property).map(|v| v.as_str())
    }

    pub fn bounds(&self, id: NodeId) -> Option<BoundingBox> {
        self.node(id).bounds
    }

    /// True when at least one element carries a bounding box
    pub fn has_geometry(&self) -> bool {
        self.nodes.iter().any(|n| n.bounds.is_some())
    }

    /// False when the node or any ancestor is styled or marked hidden
    pub fn is_displayed(&self, id: NodeId) -> bool {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if let Some(display) = self.style(n, "display")
                && display.eq_ignore_ascii_case("none")
            {
                return false;
            }
            if let Some(visibility) = self.style(n, "visibility")
                && visibility.eq_ignore_ascii_case("hidden")
            {
                return false;
            }
            if self.is_element(n) && self.attr(n, "hidden").is_some() {
                return false;
            }
            cur = self.parent(n);
        }
        true
    }

    /// True when the node or any ancestor carries `name="value"`
    pub fn has_self_or_ancestor_attr(&self, id: NodeId, name: &str, value: &str) -> bool {
        if self.attr(id, name) == Some(value) {
            return true;
        }
        self.ancestors(id).any(|a| self.attr(a, name) == Some(value))
    }

    /// 1-based position among element siblings with the same tag
    pub fn nth_of_type(&self, id: NodeId) -> usize {
        let Some(tag) = self.tag(id) else { return 1 };
        let Some(parent) = self.parent(id) else {
            return 1;
        };
        let mut nth = 0;
        for &sibling in self.children(parent) {
            if self.tag(sibling) == Some(tag) {
                nth += 1;
            }
            if sibling == id {
                break;
            }
        }
        nth.max(1)
    }

    /// Set or replace an attribute on an element node
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if name == "style" {
            self.nodes[id.0].styles = parse_inline_style(value);
        }
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.insert(name.to_string(), value.to_string());
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let NodeKind::Element { attrs, .. } = &mut self.nodes[id.0].kind {
            attrs.remove(name);
        }
    }

    /// Replace an element's content with a single text node. Detached
    /// descendants are unlinked and dropped from the id index.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        let removed: Vec<NodeId> = self.children(id).to_vec();
        for child in removed {
            self.detach(child);
        }
        self.nodes[id.0].children.clear();
        self.push_text(id, text);
    }

    fn detach(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            if let Some(dom_id) = self.attr(n, "id").map(|s| s.to_string())
                && self.ids.get(&dom_id) == Some(&n)
            {
                self.ids.remove(&dom_id);
            }
            stack.extend(self.node(n).children.iter().copied());
            self.nodes[n.0].parent = None;
        }
    }
}

impl Default for PageTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse whitespace runs to single spaces and trim
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parse an inline style declaration list into a property map
pub fn parse_inline_style(style: &str) -> HashMap<String, String> {
    let mut out = HashMap::new();
    for declaration in style.split(';') {
        if let Some((property, value)) = declaration.split_once(':') {
            let property = property.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if !property.is_empty() && !value.is_empty() {
                out.insert(property, value);
            }
        }
    }
    out
}
