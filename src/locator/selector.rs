//! Selector set generation for re-acquisition

use lazy_static::lazy_static;
use regex::Regex;

use crate::page::{NodeId, PageTree};
use crate::types::{ClassTypeSelector, SelectorSet, StructuralPattern};

lazy_static! {
    /// Utility classes from common CSS frameworks; useless as anchors
    /// because they repeat across unrelated elements.
    static ref FRAMEWORK_CLASS: Regex = Regex::new(
        r"(?x)^(?:
            col|row|container|grid|flex|btn|input-group|
            form-(?:control|group|select|check|label)|
            d|p|m|pt|pb|ps|pe|px|py|mt|mb|ms|me|mx|my|
            w|h|g|gap|text|bg|border|rounded|shadow|
            justify|align|items|self|order|float|position
        )(?:-.+)?$"
    )
    .unwrap();
}

/// Classes too generic to identify an element across visits
pub(crate) fn is_framework_class(class: &str) -> bool {
    class.len() <= 2 || FRAMEWORK_CLASS.is_match(class)
}

/// Generated CSS path from the nearest id anchor (or the tree top) down to
/// the element: `tag#id` segments anchor, everything else is
/// `tag:nth-of-type(n)` among same-tag siblings.
pub fn css_path(tree: &PageTree, node: NodeId) -> String {
    let mut segments = Vec::new();
    let mut current = Some(node);
    while let Some(n) = current {
        let Some(tag) = tree.tag(n) else { break };
        if tag == "#document" {
            break;
        }
        if let Some(id) = tree.attr(n, "id")
            && !id.is_empty()
        {
            segments.push(format!("{}#{}", tag, id));
            break;
        }
        segments.push(format!("{}:nth-of-type({})", tag, tree.nth_of_type(n)));
        current = tree.parent(n);
    }
    segments.reverse();
    segments.join(" > ")
}

/// Nearest ancestor class (bounded by the container) that repeats on at
/// least two elements page-wide. The repeated class marks the per-field
/// item wrapper in list-style forms.
fn repeated_container_class(tree: &PageTree, field: NodeId, container: NodeId) -> Option<String> {
    let all = tree.all_elements();
    for ancestor in tree.ancestors(field) {
        for class in tree.classes(ancestor) {
            if is_framework_class(class) {
                continue;
            }
            let occurrences = all
                .iter()
                .filter(|&&e| tree.classes(e).contains(&class))
                .count();
            if occurrences >= 2 {
                return Some(class.to_string());
            }
        }
        if ancestor == container {
            break;
        }
    }
    None
}

/// Record every re-acquisition strategy the element supports, strongest
/// first. `title` is the already-resolved field title; the structural and
/// near-text strategies need it.
pub fn build_selector_set(
    tree: &PageTree,
    field: NodeId,
    container: NodeId,
    title: Option<&str>,
) -> SelectorSet {
    let mut set = SelectorSet::default();

    if let Some(id) = tree.attr(field, "id")
        && !id.is_empty()
    {
        set.id = Some(id.to_string());
    }

    let path = css_path(tree, field);
    if !path.is_empty() {
        set.css_path = Some(path);
    }

    if let Some(container_class) = repeated_container_class(tree, field, container) {
        let labelled_by = tree
            .attr(field, "aria-labelledby")
            .filter(|v| !v.is_empty())
            .map(String::from);
        let inner_text = if labelled_by.is_none() {
            title.map(String::from)
        } else {
            None
        };
        if labelled_by.is_some() || inner_text.is_some() {
            set.structural = Some(StructuralPattern {
                container_class,
                labelled_by,
                inner_text,
            });
        }
    }

    if let Some(name) = tree.attr(field, "name")
        && !name.is_empty()
    {
        set.name = Some(name.to_string());
    }

    if let Some(input_type) = tree.attr(field, "type")
        && let Some(class) = tree
            .classes(field)
            .into_iter()
            .find(|c| !is_framework_class(c))
    {
        set.class_type = Some(ClassTypeSelector {
            class: class.to_string(),
            input_type: input_type.to_string(),
        });
    }

    set.near_text = title.map(String::from);

    if let Some(placeholder) = tree.attr(field, "placeholder")
        && !placeholder.is_empty()
    {
        set.placeholder = Some(placeholder.to_string());
    }

    set
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod selector_test;
