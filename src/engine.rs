//! Analysis orchestration: container discovery, per-field scoring, report
//! assembly. A pure synchronous tree walk; two runs over an unchanged tree
//! produce identical titles and confidences.

use std::collections::HashSet;

use chrono::Utc;
use tracing::debug;

use crate::errors::EngineError;
use crate::locator;
use crate::page::PageTree;
use crate::scorer;
use crate::types::{AnalysisReport, AnalyzedField, ContextClue, FieldDescriptor, StoredField, StoredFieldMap};

/// Analyze every form container on the page.
///
/// Fields without a resolvable title are dropped (logged, never fatal);
/// a page with no containers at all is the only fatal outcome.
pub fn analyze(tree: &PageTree, url: &str) -> Result<AnalysisReport, EngineError> {
    let containers = locator::discover_containers(tree);
    if containers.is_empty() {
        return Err(EngineError::NoFormsFound);
    }

    let mut fields = Vec::new();
    let mut taken = HashSet::new();
    let mut position = 0usize;

    for container in &containers {
        for &node in &container.fields {
            let index = position;
            position += 1;

            let Some(kind) = locator::field_kind(tree, node) else {
                continue;
            };
            let clues = scorer::gather_clues(tree, node, container.node);
            let Some(title) = scorer::resolve_title(tree, node, &clues) else {
                debug!("No meaningful title for field at position {index}, dropping");
                continue;
            };

            let base = tree
                .attr(node, "id")
                .or_else(|| tree.attr(node, "name"))
                .map(str::to_string)
                .unwrap_or_else(|| format!("field_{index}"));
            let key = unique_key(base, &mut taken);

            let selectors = locator::build_selector_set(tree, node, container.node, Some(&title.text));
            let descriptor = FieldDescriptor {
                key,
                kind,
                input_type: tree.attr(node, "type").map(|t| t.to_ascii_lowercase()),
                selectors,
                placeholder: tree.attr(node, "placeholder").map(str::to_string),
            };
            fields.push(AnalyzedField {
                descriptor,
                title,
                clues,
            });
        }
    }

    debug!(
        "Analyzed {} fields across {} containers",
        fields.len(),
        containers.len()
    );
    Ok(AnalysisReport {
        url: url.to_string(),
        analyzed_at: Utc::now(),
        container_count: containers.len(),
        fields,
    })
}

fn unique_key(base: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Stored form of a report with the full clue history.
pub fn to_stored(report: &AnalysisReport) -> StoredFieldMap {
    stored_with(report, <[ContextClue]>::to_vec)
}

/// Stored form reduced for the size-limited tier.
pub fn to_compact(report: &AnalysisReport) -> StoredFieldMap {
    stored_with(report, |clues| scorer::compact_clues(clues))
}

fn stored_with(
    report: &AnalysisReport,
    reduce: impl Fn(&[ContextClue]) -> Vec<ContextClue>,
) -> StoredFieldMap {
    StoredFieldMap {
        url: report.url.clone(),
        analyzed_at: report.analyzed_at,
        fields: report
            .fields
            .iter()
            .map(|f| StoredField {
                key: f.descriptor.key.clone(),
                kind: f.descriptor.kind,
                input_type: f.descriptor.input_type.clone(),
                title: f.title.clone(),
                selectors: f.descriptor.selectors.clone(),
                placeholder: f.descriptor.placeholder.clone(),
                clues: reduce(&f.clues),
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;
