//! Context clue gathering.
//!
//! Nine independent signal sources are evaluated for every field, in a fixed
//! order, with no early exit. Title resolution later picks one winner; the
//! full clue list is kept on the analysis report so callers can see what the
//! field looked like to the engine.

use crate::page::{BoundingBox, NodeId, PageTree, collapse_whitespace};
use crate::types::{ContextClue, ContextSource};

/// Preceding-text and sibling-text clues keep at most this many characters.
const TEXT_CLIP: usize = 100;

/// Headings further than this from the field are ignored in geometric mode.
const HEADING_RANGE_PX: f64 = 500.0;

const HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

/// Container-scoped elements that commonly hold help text
const TOOLTIP_CLASSES: [&str; 4] = ["tooltip", "help-text", "hint", "help"];

/// Gather every context clue for `field`, bounded by `container` where a
/// source is container-scoped.
pub fn gather_clues(tree: &PageTree, field: NodeId, container: NodeId) -> Vec<ContextClue> {
    let mut clues = Vec::new();

    // 1. aria-labelledby referenced text
    let labelled = aria_labelledby_text(tree, field);
    if let Some(text) = &labelled {
        clues.push(clue(ContextSource::AriaLabelledby, text, 1.0));
    }

    // 2. Explicit label, suppressed when aria-labelledby already spoke
    let label = if labelled.is_none() {
        explicit_label_text(tree, field, container)
    } else {
        None
    };
    if let Some(text) = &label {
        clues.push(clue(ContextSource::ExplicitLabel, text, 0.9));
    }

    // 3. Heading-semantics ancestor, only when neither 1 nor 2 spoke
    if labelled.is_none()
        && label.is_none()
        && let Some(text) = heading_ancestor_text(tree, field)
    {
        clues.push(clue(ContextSource::HeadingRole, &text, 0.95));
    }

    // 4. aria-label, else title attribute
    if let Some(text) = nonblank_attr(tree, field, "aria-label")
        .or_else(|| nonblank_attr(tree, field, "title"))
    {
        clues.push(clue(ContextSource::AriaLabel, &text, 0.85));
    }

    // 5. Up to two nearby headings
    for text in nearby_headings(tree, field) {
        clues.push(clue(ContextSource::NearbyHeading, &text, 0.6));
    }

    // 6. Nearest preceding text node, container-bounded
    if let Some(text) = preceding_text(tree, field, container) {
        clues.push(clue(ContextSource::PrecedingText, &text, 0.8));
    }

    // 7. Tooltip / help text
    if let Some(text) = tooltip_text(tree, field, container) {
        clues.push(clue(ContextSource::Tooltip, &text, 0.7));
    }

    // 8. Up to three nearby sibling texts
    for text in nearby_sibling_texts(tree, field) {
        clues.push(clue(ContextSource::NearbyElement, &text, 0.7));
    }

    // 9. Placeholder
    if let Some(text) = nonblank_attr(tree, field, "placeholder") {
        clues.push(clue(ContextSource::Placeholder, &text, 0.75));
    }

    clues
}

/// Reduce a gathered clue list to the compact form kept in the size-limited
/// persistence tier: the two highest-precedence entries among
/// aria-labelledby, explicit label, aria-label and the first nearby heading.
pub fn compact_clues(clues: &[ContextClue]) -> Vec<ContextClue> {
    let precedence = [
        ContextSource::AriaLabelledby,
        ContextSource::ExplicitLabel,
        ContextSource::AriaLabel,
        ContextSource::NearbyHeading,
    ];
    let mut kept = Vec::new();
    for source in precedence {
        if let Some(c) = clues.iter().find(|c| c.source == source) {
            kept.push(c.clone());
            if kept.len() == 2 {
                break;
            }
        }
    }
    kept
}

fn clue(source: ContextSource, text: &str, weight: f64) -> ContextClue {
    ContextClue {
        source,
        text: text.to_string(),
        weight,
    }
}

fn nonblank_attr(tree: &PageTree, node: NodeId, name: &str) -> Option<String> {
    tree.attr(node, name)
        .map(collapse_whitespace)
        .filter(|t| !t.is_empty())
}

fn aria_labelledby_text(tree: &PageTree, field: NodeId) -> Option<String> {
    let refs = tree.attr(field, "aria-labelledby")?;
    let pieces: Vec<String> = refs
        .split_whitespace()
        .filter_map(|id| tree.by_id(id))
        .map(|n| tree.text_content(n))
        .filter(|t| !t.is_empty())
        .collect();
    if pieces.is_empty() {
        None
    } else {
        Some(pieces.join(" "))
    }
}

/// `<label for=id>` anywhere on the page, else the nearest `<label>`
/// ancestor inside the container.
fn explicit_label_text(tree: &PageTree, field: NodeId, container: NodeId) -> Option<String> {
    if let Some(field_id) = tree.attr(field, "id") {
        let labelled = tree
            .all_elements()
            .into_iter()
            .find(|&n| tree.tag(n) == Some("label") && tree.attr(n, "for") == Some(field_id))
            .map(|n| tree.text_content(n))
            .filter(|t| !t.is_empty());
        if labelled.is_some() {
            return labelled;
        }
    }
    for anc in tree.ancestors(field) {
        if tree.tag(anc) == Some("label") {
            let text = tree.text_content(anc);
            if !text.is_empty() {
                return Some(text);
            }
        }
        if anc == container {
            break;
        }
    }
    None
}

fn has_heading_semantics(tree: &PageTree, node: NodeId) -> bool {
    if tree
        .attr(node, "role")
        .is_some_and(|r| r.eq_ignore_ascii_case("heading"))
    {
        return true;
    }
    tree.tag(node).is_some_and(|t| HEADING_TAGS.contains(&t))
}

fn heading_ancestor_text(tree: &PageTree, field: NodeId) -> Option<String> {
    tree.ancestors(field)
        .find(|&a| has_heading_semantics(tree, a))
        .map(|a| tree.text_content(a))
        .filter(|t| !t.is_empty())
}

/// Closest two headings. With geometry this ranks page-wide headings that
/// start above the field by vertical gap, capped at [`HEADING_RANGE_PX`].
/// Without, it climbs the tree scanning preceding-sibling subtrees.
fn nearby_headings(tree: &PageTree, field: NodeId) -> Vec<String> {
    if let Some(field_bounds) = tree.bounds(field) {
        let mut ranked: Vec<(f64, NodeId)> = tree
            .all_elements()
            .into_iter()
            .filter(|&n| tree.tag(n).is_some_and(|t| HEADING_TAGS.contains(&t)))
            .filter_map(|n| tree.bounds(n).map(|b| (n, b)))
            .filter(|(_, b)| b.y < field_bounds.y)
            .map(|(n, b)| (field_bounds.gap_above(&b), n))
            .filter(|(gap, _)| *gap <= HEADING_RANGE_PX)
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
        return ranked
            .into_iter()
            .map(|(_, n)| tree.text_content(n))
            .filter(|t| !t.is_empty())
            .take(2)
            .collect();
    }

    let mut texts = Vec::new();
    let mut current = field;
    while let Some(parent) = tree.parent(current) {
        for sib in tree.preceding_siblings(current) {
            for heading in subtree_headings(tree, sib) {
                let text = tree.text_content(heading);
                if !text.is_empty() {
                    texts.push(text);
                    if texts.len() == 2 {
                        return texts;
                    }
                }
            }
        }
        current = parent;
    }
    texts
}

/// Headings within a sibling subtree, nearest the field first
fn subtree_headings(tree: &PageTree, root: NodeId) -> Vec<NodeId> {
    let mut headings: Vec<NodeId> = std::iter::once(root)
        .chain(tree.descendant_elements(root))
        .filter(|&n| tree.tag(n).is_some_and(|t| HEADING_TAGS.contains(&t)))
        .collect();
    headings.reverse();
    headings
}

/// Nearest preceding non-empty text node, clipped to its final
/// [`TEXT_CLIP`] characters. The scan never leaves the container.
fn preceding_text(tree: &PageTree, field: NodeId, container: NodeId) -> Option<String> {
    let mut current = field;
    while current != container {
        let parent = tree.parent(current)?;
        let siblings = tree.children(parent);
        let pos = siblings.iter().position(|&s| s == current)?;
        for &sib in siblings[..pos].iter().rev() {
            if let Some(text) = last_text_in(tree, sib) {
                return Some(tail_chars(&text, TEXT_CLIP));
            }
        }
        current = parent;
    }
    None
}

/// Last non-blank text node inside `root` (itself included), in document
/// order; the last one sits closest to whatever follows the subtree.
fn last_text_in(tree: &PageTree, root: NodeId) -> Option<String> {
    std::iter::once(root)
        .chain(tree.descendants(root))
        .filter(|&n| !tree.is_element(n))
        .map(|n| tree.text_content(n))
        .filter(|t| !t.is_empty())
        .next_back()
}

fn tail_chars(text: &str, limit: usize) -> String {
    let count = text.chars().count();
    if count <= limit {
        text.to_string()
    } else {
        text.chars().skip(count - limit).collect()
    }
}

/// Help text attached to the field: own tooltip-ish attributes first, then
/// the aria-describedby target, then the first tooltip-like element found
/// walking outward from the field's parent to the container.
fn tooltip_text(tree: &PageTree, field: NodeId, container: NodeId) -> Option<String> {
    if let Some(text) = nonblank_attr(tree, field, "data-tooltip")
        .or_else(|| nonblank_attr(tree, field, "aria-description"))
        .or_else(|| nonblank_attr(tree, field, "title"))
    {
        return Some(text);
    }
    if let Some(described) = tree
        .attr(field, "aria-describedby")
        .and_then(|id| tree.by_id(id))
    {
        let text = tree.text_content(described);
        if !text.is_empty() {
            return Some(text);
        }
    }

    let mut scope = tree.parent(field);
    while let Some(holder) = scope {
        if let Some(found) = tree
            .descendant_elements(holder)
            .into_iter()
            .filter(|&n| n != field)
            .find(|&n| is_tooltip_like(tree, n))
        {
            let text = tree.text_content(found);
            if !text.is_empty() {
                return Some(text);
            }
        }
        if holder == container {
            break;
        }
        scope = tree.parent(holder);
    }
    None
}

fn is_tooltip_like(tree: &PageTree, node: NodeId) -> bool {
    if tree
        .attr(node, "role")
        .is_some_and(|r| r.eq_ignore_ascii_case("tooltip"))
        || tree.attr(node, "data-tooltip").is_some()
    {
        return true;
    }
    tree.classes(node)
        .iter()
        .any(|c| TOOLTIP_CLASSES.contains(c))
}

/// Texts of up to three sibling elements, non-empty and shorter than
/// [`TEXT_CLIP`] characters, closest first.
fn nearby_sibling_texts(tree: &PageTree, field: NodeId) -> Vec<String> {
    ranked_siblings(tree, field)
        .into_iter()
        .map(|n| tree.text_content(n))
        .filter(|t| !t.is_empty() && t.chars().count() < TEXT_CLIP)
        .take(3)
        .collect()
}

/// Element siblings ranked by vertical proximity when geometry is present,
/// by alternating sibling distance otherwise.
fn ranked_siblings(tree: &PageTree, field: NodeId) -> Vec<NodeId> {
    let preceding = tree.preceding_siblings(field);
    let following = tree.following_siblings(field);

    if let Some(field_bounds) = tree.bounds(field) {
        let mut all: Vec<NodeId> = preceding.into_iter().chain(following).collect();
        all.sort_by(|&a, &b| {
            sibling_distance(tree, field_bounds, a).total_cmp(&sibling_distance(tree, field_bounds, b))
        });
        return all;
    }

    let mut out = Vec::new();
    let mut before = preceding.into_iter();
    let mut after = following.into_iter();
    loop {
        let (p, f) = (before.next(), after.next());
        if p.is_none() && f.is_none() {
            break;
        }
        out.extend(p);
        out.extend(f);
    }
    out
}

fn sibling_distance(tree: &PageTree, field_bounds: BoundingBox, node: NodeId) -> f64 {
    tree.bounds(node)
        .map(|b| field_bounds.center_distance(&b))
        .unwrap_or(f64::MAX)
}

#[cfg(test)]
#[path = "clues_test.rs"]
mod clues_test;
