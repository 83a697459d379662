//! Multi-strategy element re-acquisition.
//!
//! Strategies run in the order they are recorded in the `SelectorSet`; the
//! first one matching exactly one element wins. A strategy matching zero or
//! several elements is passed over, never guessed from.

use std::time::Duration;
use tracing::debug;

use crate::page::{NodeId, PageTree};
use crate::types::{ClassTypeSelector, FieldDescriptor, SelectorStrategy, StructuralPattern};

use super::discover::is_contenteditable;

/// A successfully re-acquired element and the strategy that found it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub node: NodeId,
    pub strategy: SelectorStrategy,
}

/// Try every recorded strategy once. `title` backs the last-resort text
/// heuristic used when the descriptor carries no selector at all.
pub fn resolve(tree: &PageTree, desc: &FieldDescriptor, title: Option<&str>) -> Option<Resolution> {
    let set = &desc.selectors;

    if set.is_empty() {
        return title
            .and_then(|t| exactly_one(by_near_text(tree, desc, t)))
            .map(|node| Resolution {
                node,
                strategy: SelectorStrategy::TextFallback,
            });
    }

    if let Some(id) = &set.id
        && let Some(node) = exactly_one(by_dom_id(tree, id, desc))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::Id,
        });
    }
    if let Some(path) = &set.css_path
        && let Some(node) = exactly_one(by_css_path(tree, path, desc))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::CssPath,
        });
    }
    if let Some(pattern) = &set.structural
        && let Some(node) = exactly_one(by_structural(tree, pattern, desc))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::Structural,
        });
    }
    if let Some(name) = &set.name
        && let Some(node) = exactly_one(by_name(tree, name, desc))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::Name,
        });
    }
    if let Some(class_type) = &set.class_type
        && let Some(node) = exactly_one(by_class_type(tree, class_type, desc))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::ClassType,
        });
    }
    if let Some(text) = &set.near_text
        && let Some(node) = exactly_one(by_near_text(tree, desc, text))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::NearText,
        });
    }
    if let Some(placeholder) = &set.placeholder
        && let Some(node) = exactly_one(by_placeholder(tree, placeholder))
    {
        return Some(Resolution {
            node,
            strategy: SelectorStrategy::Placeholder,
        });
    }
    None
}

/// Resolve with one fixed-delay retry. Returns the outcome together with
/// the number of attempts made.
pub async fn resolve_with_retry(
    tree: &PageTree,
    desc: &FieldDescriptor,
    title: Option<&str>,
    delay: Duration,
) -> (Option<Resolution>, u32) {
    if let Some(found) = resolve(tree, desc, title) {
        return (Some(found), 1);
    }
    debug!("Field '{}' not found, retrying once", desc.key);
    tokio::time::sleep(delay).await;
    (resolve(tree, desc, title), 2)
}

fn exactly_one(mut matches: Vec<NodeId>) -> Option<NodeId> {
    matches.dedup();
    if matches.len() == 1 {
        Some(matches[0])
    } else {
        None
    }
}

/// Scan rather than trust the id index; a page with duplicate ids must not
/// resolve through this strategy.
fn by_dom_id(tree: &PageTree, dom_id: &str, desc: &FieldDescriptor) -> Vec<NodeId> {
    tree.all_elements()
        .into_iter()
        .filter(|&n| tree.attr(n, "id") == Some(dom_id))
        .filter(|&n| kind_matches(tree, n, desc))
        .collect()
}

fn by_name(tree: &PageTree, name: &str, desc: &FieldDescriptor) -> Vec<NodeId> {
    tree.all_elements()
        .into_iter()
        .filter(|&n| tree.attr(n, "name") == Some(name))
        .filter(|&n| kind_matches(tree, n, desc))
        .collect()
}

fn by_placeholder(tree: &PageTree, placeholder: &str, desc: &FieldDescriptor) -> Vec<NodeId> {
    tree.all_elements()
        .into_iter()
        .filter(|&n| tree.attr(n, "placeholder") == Some(placeholder))
        .filter(|&n| kind_matches(tree, n, desc))
        .collect()
}

fn by_class_type(tree: &PageTree, selector: &ClassTypeSelector, desc: &FieldDescriptor) -> Vec<NodeId> {
    tree.all_elements()
        .into_iter()
        .filter(|&n| {
            tree.classes(n).contains(&selector.class.as_str())
                && tree
                    .attr(n, "type")
                    .is_some_and(|t| t.eq_ignore_ascii_case(&selector.input_type))
        })
        .filter(|&n| kind_matches(tree, n, desc))
        .collect()
}

fn kind_matches(tree: &PageTree, node: NodeId, desc: &FieldDescriptor) -> bool {
    let tag_ok = match desc.kind.tag() {
        Some(tag) => tree.tag(node) == Some(tag),
        None => is_contenteditable(tree, node),
    };
    if !tag_ok {
        return false;
    }
    match (&desc.input_type, tree.attr(node, "type")) {
        (Some(wanted), Some(actual)) => wanted.eq_ignore_ascii_case(actual),
        (Some(_), None) => false,
        (None, _) => true,
    }
}

fn by_structural(tree: &PageTree, pattern: &StructuralPattern, desc: &FieldDescriptor) -> Vec<NodeId> {
    let mut out = Vec::new();
    for holder in tree.all_elements() {
        if !tree.classes(holder).contains(&pattern.container_class.as_str()) {
            continue;
        }
        if let Some(labelled_by) = &pattern.labelled_by {
            out.extend(
                tree.descendant_elements(holder)
                    .into_iter()
                    .filter(|&n| tree.attr(n, "aria-labelledby") == Some(labelled_by))
                    .filter(|&n| kind_matches(tree, n, desc)),
            );
        } else if let Some(inner_text) = &pattern.inner_text {
            if tree.text_content(holder).contains(inner_text.as_str()) {
                out.extend(
                    tree.descendant_elements(holder)
                        .into_iter()
                        .filter(|&n| kind_matches(tree, n, desc)),
                );
            }
        }
    }
    out.sort();
    out
}

/// Controls of the right kind whose nearby container text mentions the
/// title. "Nearby" is any ancestor within three levels.
fn by_near_text(tree: &PageTree, desc: &FieldDescriptor, text: &str) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = tree
        .all_elements()
        .into_iter()
        .filter(|&n| kind_matches(tree, n, desc))
        .filter(|&n| {
            tree.ancestors(n)
                .take(3)
                .any(|a| tree.tag(a) != Some("#document") && tree.text_content(a).contains(text))
        })
        .collect();
    out.sort();
    out
}

/// Resolve a generated CSS path over the arena. Supports exactly the
/// segments the generator emits: `tag#id` anchors and `tag:nth-of-type(n)`
/// steps joined by " > ".
fn by_css_path(tree: &PageTree, path: &str, desc: &FieldDescriptor) -> Vec<NodeId> {
    let segments: Vec<&str> = path.split(" > ").collect();
    let Some((first, rest)) = segments.split_first() else {
        return Vec::new();
    };

    let mut current = anchor_candidates(tree, first);
    for segment in rest {
        let mut next = Vec::new();
        for &node in &current {
            next.extend(
                tree.children(node)
                    .iter()
                    .copied()
                    .filter(|&c| segment_matches(tree, c, segment)),
            );
        }
        current = next;
    }
    current.retain(|&n| kind_matches(tree, n, desc));
    current
}

fn anchor_candidates(tree: &PageTree, segment: &str) -> Vec<NodeId> {
    if segment.contains('#') {
        // Id anchors can sit anywhere in the document
        tree.all_elements()
            .into_iter()
            .filter(|&n| segment_matches(tree, n, segment))
            .collect()
    } else {
        tree.children(tree.root())
            .iter()
            .copied()
            .filter(|&n| segment_matches(tree, n, segment))
            .collect()
    }
}

fn segment_matches(tree: &PageTree, node: NodeId, segment: &str) -> bool {
    let Some(tag) = tree.tag(node) else {
        return false;
    };
    if let Some((seg_tag, id)) = segment.split_once('#') {
        return tag == seg_tag && tree.attr(node, "id") == Some(id);
    }
    if let Some((seg_tag, rest)) = segment.split_once(":nth-of-type(") {
        let nth: usize = rest.trim_end_matches(')').parse().unwrap_or(0);
        return tag == seg_tag && tree.nth_of_type(node) == nth;
    }
    tag == segment
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod resolve_test;
