//! Form container discovery and field enumeration

use std::cmp::Reverse;
use std::collections::HashSet;
use tracing::debug;

use crate::page::{NodeId, PageTree};

/// Input types that are never fillable fields
const EXCLUDED_INPUT_TYPES: [&str; 5] = ["hidden", "submit", "button", "reset", "image"];

/// A discovered form scope. Containers are recomputed on every pass and
/// never persisted.
#[derive(Clone, Debug)]
pub struct FormContainer {
    /// The form, div or section element
    pub node: NodeId,
    /// True for a native `form` element
    pub native: bool,
    /// Fillable fields claimed by this container, in document order
    pub fields: Vec<NodeId>,
}

/// True for input/select/textarea and contenteditable elements
pub fn is_form_control(tree: &PageTree, node: NodeId) -> bool {
    match tree.tag(node) {
        Some("input") | Some("select") | Some("textarea") => true,
        Some(_) => is_contenteditable(tree, node),
        None => false,
    }
}

/// contenteditable="" counts the same as contenteditable="true"
pub fn is_contenteditable(tree: &PageTree, node: NodeId) -> bool {
    match tree.attr(node, "contenteditable") {
        Some(value) => value.is_empty() || value.eq_ignore_ascii_case("true"),
        None => false,
    }
}

/// Whether a control must be skipped: non-fillable input types, elements
/// that are not displayed, and anything under aria-hidden.
pub fn is_excluded(tree: &PageTree, node: NodeId) -> bool {
    if tree.tag(node) == Some("input")
        && let Some(input_type) = tree.attr(node, "type")
        && EXCLUDED_INPUT_TYPES
            .iter()
            .any(|t| input_type.eq_ignore_ascii_case(t))
    {
        return true;
    }
    if !tree.is_displayed(node) {
        return true;
    }
    tree.has_self_or_ancestor_attr(node, "aria-hidden", "true")
}

/// Fillable controls inside a scope, exclusions applied, document order
pub fn enumerate_fields(tree: &PageTree, scope: NodeId) -> Vec<NodeId> {
    tree.descendant_elements(scope)
        .into_iter()
        .filter(|&n| is_form_control(tree, n) && !is_excluded(tree, n))
        .collect()
}

/// input/select/textarea descendants that survive exclusion; used to decide
/// whether a div or section qualifies as an implicit container
fn basic_control_count(tree: &PageTree, scope: NodeId) -> usize {
    tree.descendant_elements(scope)
        .into_iter()
        .filter(|&n| {
            matches!(tree.tag(n), Some("input") | Some("select") | Some("textarea"))
                && !is_excluded(tree, n)
        })
        .count()
}

/// Discover form containers on a page.
///
/// Native `form` elements come first and claim their fields in document
/// order. Remaining `div`/`section` elements holding at least two controls
/// are considered deepest-first; a candidate that claims no field that is
/// still unclaimed is discarded. Every field belongs to exactly one
/// container per pass.
pub fn discover_containers(tree: &PageTree) -> Vec<FormContainer> {
    let mut claimed: HashSet<NodeId> = HashSet::new();
    let mut containers = Vec::new();

    for node in tree.all_elements() {
        if tree.tag(node) != Some("form") {
            continue;
        }
        let fields: Vec<NodeId> = enumerate_fields(tree, node)
            .into_iter()
            .filter(|f| !claimed.contains(f))
            .collect();
        claimed.extend(fields.iter().copied());
        containers.push(FormContainer {
            node,
            native: true,
            fields,
        });
    }

    let mut candidates: Vec<NodeId> = tree
        .all_elements()
        .into_iter()
        .filter(|&n| matches!(tree.tag(n), Some("div") | Some("section")))
        .filter(|&n| basic_control_count(tree, n) >= 2)
        .collect();
    candidates.sort_by_key(|&n| (Reverse(tree.depth(n)), n));

    for node in candidates {
        let fields: Vec<NodeId> = enumerate_fields(tree, node)
            .into_iter()
            .filter(|f| !claimed.contains(f))
            .collect();
        if fields.is_empty() {
            continue;
        }
        claimed.extend(fields.iter().copied());
        containers.push(FormContainer {
            node,
            native: false,
            fields,
        });
    }

    containers.sort_by_key(|c| c.node);
    debug!(
        "Discovered {} containers claiming {} fields",
        containers.len(),
        claimed.len()
    );
    containers
}

#[cfg(test)]
#[path = "discover_test.rs"]
mod discover_test;
