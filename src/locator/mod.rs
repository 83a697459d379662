//! Field locator: form container discovery, selector generation and
//! multi-strategy element re-acquisition.

mod discover;
mod resolve;
mod selector;

pub use discover::{FormContainer, discover_containers, enumerate_fields, is_excluded, is_form_control};
pub use resolve::{Resolution, resolve, resolve_with_retry};
pub use selector::{build_selector_set, css_path};

use crate::page::{NodeId, PageTree};
use crate::types::FieldKind;

/// Classify a control element. `None` for nodes that are not fillable.
pub fn field_kind(tree: &PageTree, node: NodeId) -> Option<FieldKind> {
    match tree.tag(node)? {
        "input" => Some(FieldKind::Input),
        "select" => Some(FieldKind::Select),
        "textarea" => Some(FieldKind::Textarea),
        _ if discover::is_contenteditable(tree, node) => Some(FieldKind::Editable),
        _ => None,
    }
}
