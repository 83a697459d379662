//! HTML front-end: html5ever into the page arena

use anyhow::{Context, Result};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use std::collections::HashMap;

use super::{NodeId, PageTree};

/// Parse an HTML document and walk it into a `PageTree`.
/// Comments, doctype and whitespace-only text are dropped.
pub(super) fn build(html: &str) -> Result<PageTree> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())
        .context("Failed to parse HTML")?;

    let mut tree = PageTree::new();
    let root = tree.root();
    for child in dom.document.children.borrow().iter() {
        append(&mut tree, root, child);
    }
    Ok(tree)
}

fn append(tree: &mut PageTree, parent: NodeId, handle: &Handle) {
    match &handle.data {
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref().to_string();
            let attrs: HashMap<String, String> = attrs
                .borrow()
                .iter()
                .map(|a| (a.name.local.as_ref().to_string(), a.value.to_string()))
                .collect();
            let id = tree.push_element(parent, &tag, attrs);

            if tag == "title" && tree.title.is_none() {
                let text = title_text(handle);
                if !text.is_empty() {
                    tree.title = Some(text);
                }
            }

            for child in handle.children.borrow().iter() {
                append(tree, id, child);
            }
        }
        NodeData::Text { contents } => {
            let text = contents.borrow();
            if !text.trim().is_empty() {
                tree.push_text(parent, &text);
            }
        }
        // Comments, doctype and processing instructions carry no field context
        _ => {}
    }
}

fn title_text(handle: &Handle) -> String {
    let mut out = String::new();
    for child in handle.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            out.push_str(contents.borrow().trim());
        }
    }
    out
}

#[cfg(test)]
#[path = "html_test.rs"]
mod html_test;
