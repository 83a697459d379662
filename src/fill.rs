//! Fill engine: re-acquire each stored field and write a value into the
//! page tree. Every field is independently fault-isolated; one failure is
//! recorded in that field's outcome and the batch continues.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::EngineError;
use crate::locator::resolve_with_retry;
use crate::page::{NodeId, PageTree};
use crate::suggest::{SuggestionProvider, build_query};
use crate::types::{FieldEvent, FieldKind, FillOutcome, FillReport, FillStatus, StoredField, StoredFieldMap};

/// One field and the value to write into it
#[derive(Clone, Debug)]
pub struct FillPlan {
    pub field: StoredField,
    pub value: String,
}

/// Pair stored fields with values. Explicit values are matched by field
/// key, then by the recorded `name` selector so one `--set name=value`
/// covers a whole radio group. Fields with no explicit value are included
/// only when `suggest` is on, valued by the provider one at a time.
pub async fn build_plans(
    map: &StoredFieldMap,
    values: &HashMap<String, String>,
    suggest: bool,
    provider: &dyn SuggestionProvider,
) -> Vec<FillPlan> {
    let mut plans = Vec::new();
    for field in &map.fields {
        let explicit = values.get(&field.key).or_else(|| {
            field
                .selectors
                .name
                .as_deref()
                .and_then(|name| values.get(name))
        });
        let value = match explicit {
            Some(v) => v.clone(),
            None if suggest => {
                let query = build_query(
                    &field.title.text,
                    field.input_type.as_deref(),
                    field.placeholder.as_deref(),
                    None,
                );
                match provider.suggest(&query).await.into_iter().next() {
                    Some(suggestion) => {
                        debug!(
                            "Suggested '{}' for field '{}'",
                            suggestion.value, field.key
                        );
                        suggestion.value
                    }
                    None => continue,
                }
            }
            None => continue,
        };
        plans.push(FillPlan {
            field: field.clone(),
            value,
        });
    }
    plans
}

/// Execute a batch of fill plans against the page tree.
pub async fn fill_fields(
    tree: &mut PageTree,
    url: &str,
    plans: &[FillPlan],
    retry_delay: Duration,
) -> FillReport {
    let mut outcomes = Vec::new();
    for plan in plans {
        let outcome = fill_one(tree, plan, retry_delay).await;
        if outcome.status == FillStatus::Failed
            && let Some(error) = &outcome.error
        {
            warn!("Fill failed for '{}': {}", outcome.key, error);
        }
        outcomes.push(outcome);
    }

    let filled = outcomes.iter().filter(|o| o.status == FillStatus::Filled).count();
    let failed = outcomes.iter().filter(|o| o.status == FillStatus::Failed).count();
    FillReport {
        url: url.to_string(),
        outcomes,
        filled,
        failed,
    }
}

async fn fill_one(tree: &mut PageTree, plan: &FillPlan, retry_delay: Duration) -> FillOutcome {
    let descriptor = plan.field.descriptor();
    let title = plan.field.title.text.as_str();
    let (resolution, attempts) =
        resolve_with_retry(tree, &descriptor, Some(title), retry_delay).await;

    let Some(found) = resolution else {
        let err = EngineError::ElementNotFound {
            key: descriptor.key.clone(),
            attempts,
        };
        return FillOutcome {
            key: descriptor.key,
            status: FillStatus::Failed,
            strategy: None,
            attempts,
            events: Vec::new(),
            error: Some(err.to_string()),
        };
    };

    match apply_value(tree, found.node, &plan.field, &plan.value) {
        Ok(Applied::Written) => FillOutcome {
            key: descriptor.key,
            status: FillStatus::Filled,
            strategy: Some(found.strategy),
            attempts,
            // The notifications a host page observes after a write
            events: vec![FieldEvent::Input, FieldEvent::Change, FieldEvent::Blur],
            error: None,
        },
        Ok(Applied::Skipped) => FillOutcome {
            key: descriptor.key,
            status: FillStatus::Skipped,
            strategy: Some(found.strategy),
            attempts,
            events: Vec::new(),
            error: None,
        },
        Err(message) => FillOutcome {
            key: descriptor.key,
            status: FillStatus::Failed,
            strategy: Some(found.strategy),
            attempts,
            events: Vec::new(),
            error: Some(message),
        },
    }
}

enum Applied {
    Written,
    Skipped,
}

fn apply_value(
    tree: &mut PageTree,
    node: NodeId,
    field: &StoredField,
    value: &str,
) -> Result<Applied, String> {
    match field.kind {
        FieldKind::Select => select_option(tree, node, value),
        FieldKind::Editable => {
            tree.set_text(node, value);
            Ok(Applied::Written)
        }
        FieldKind::Input | FieldKind::Textarea => match field.input_type.as_deref() {
            Some("checkbox") => {
                if is_truthy(value) {
                    tree.set_attr(node, "checked", "");
                } else {
                    tree.remove_attr(node, "checked");
                }
                Ok(Applied::Written)
            }
            Some("radio") => {
                if tree.attr(node, "value") == Some(value) {
                    tree.set_attr(node, "checked", "");
                    Ok(Applied::Written)
                } else {
                    Ok(Applied::Skipped)
                }
            }
            _ => {
                tree.set_attr(node, "value", value);
                Ok(Applied::Written)
            }
        },
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on" | "checked"
    )
}

/// Mark the option matching by value attribute or visible text, unmarking
/// every other option of the select.
fn select_option(tree: &mut PageTree, select: NodeId, value: &str) -> Result<Applied, String> {
    let options: Vec<NodeId> = tree
        .descendant_elements(select)
        .into_iter()
        .filter(|&n| tree.tag(n) == Some("option"))
        .collect();
    let target = options
        .iter()
        .copied()
        .find(|&n| tree.attr(n, "value") == Some(value) || tree.text_content(n) == value);

    let Some(target) = target else {
        return Err(format!("no matching option for '{value}'"));
    };
    for &option in &options {
        tree.remove_attr(option, "selected");
    }
    tree.set_attr(target, "selected", "");
    Ok(Applied::Written)
}

#[cfg(test)]
#[path = "fill_test.rs"]
mod fill_test;
