//! Title resolution over gathered clues.
//!
//! One fixed precedence: aria-labelledby first, then attribute sniffing
//! (name / id / placeholder), then the structural label clues. See
//! DESIGN.md for the ordering decision.

use lazy_static::lazy_static;
use regex::Regex;

use crate::page::{NodeId, PageTree, collapse_whitespace};
use crate::types::{ContextClue, ContextSource, FieldTitle};

/// Attribute values this short never make a meaningful title.
const MIN_ATTR_LEN: usize = 4;

lazy_static! {
    static ref GENERIC_NAME: Regex = Regex::new(r"(?i)^field\d+$").unwrap();
    static ref GENERIC_ID: Regex = Regex::new(r"(?i)^input\d+$").unwrap();
    static ref CAMEL_BOUNDARY: Regex = Regex::new(r"([a-z0-9])([A-Z])").unwrap();
}

/// Resolve one best title for `field`, first match wins. `None` means the
/// field has no usable context at all and is dropped from the report.
pub fn resolve_title(tree: &PageTree, field: NodeId, clues: &[ContextClue]) -> Option<FieldTitle> {
    if let Some(c) = first(clues, ContextSource::AriaLabelledby) {
        return Some(from_clue(c));
    }

    if let Some(name) = tree
        .attr(field, "name")
        .filter(|n| is_meaningful(n, &GENERIC_NAME))
    {
        return Some(FieldTitle {
            text: humanize(name),
            source: ContextSource::NameAttribute,
            confidence: 0.8,
        });
    }

    if let Some(dom_id) = tree
        .attr(field, "id")
        .filter(|i| is_meaningful(i, &GENERIC_ID))
    {
        return Some(FieldTitle {
            text: humanize(dom_id),
            source: ContextSource::IdAttribute,
            confidence: 0.7,
        });
    }

    if let Some(c) =
        first(clues, ContextSource::Placeholder).filter(|c| c.text.chars().count() >= MIN_ATTR_LEN)
    {
        return Some(from_clue(c));
    }

    for source in [
        ContextSource::HeadingRole,
        ContextSource::ExplicitLabel,
        ContextSource::AriaLabel,
        ContextSource::PrecedingText,
        ContextSource::NearbyElement,
        ContextSource::Tooltip,
        ContextSource::NearbyHeading,
    ] {
        if let Some(c) = first(clues, source) {
            return Some(from_clue(c));
        }
    }

    None
}

/// Turn an attribute identifier into label-ish text: camelCase boundaries
/// become spaces, `_` / `-` / `.` become spaces, lowercased.
pub fn humanize(raw: &str) -> String {
    let spaced = CAMEL_BOUNDARY.replace_all(raw, "$1 $2");
    let separated: String = spaced
        .chars()
        .map(|c| if matches!(c, '_' | '-' | '.') { ' ' } else { c })
        .collect();
    collapse_whitespace(&separated).to_lowercase()
}

fn first<'a>(clues: &'a [ContextClue], source: ContextSource) -> Option<&'a ContextClue> {
    clues.iter().find(|c| c.source == source)
}

fn from_clue(clue: &ContextClue) -> FieldTitle {
    FieldTitle {
        text: clue.text.clone(),
        source: clue.source,
        confidence: clue.weight,
    }
}

fn is_meaningful(value: &str, generic: &Regex) -> bool {
    value.chars().count() >= MIN_ATTR_LEN && !generic.is_match(value)
}

#[cfg(test)]
#[path = "title_test.rs"]
mod title_test;
