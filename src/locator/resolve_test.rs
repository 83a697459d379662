// Unit tests for field re-acquisition

use super::*;
use crate::page::PageTree;
use crate::types::{ClassTypeSelector, FieldDescriptor, FieldKind, SelectorSet, StructuralPattern};
use std::time::Duration;

fn descriptor(kind: FieldKind, input_type: Option<&str>, selectors: SelectorSet) -> FieldDescriptor {
    FieldDescriptor {
        key: "field".to_string(),
        kind,
        input_type: input_type.map(str::to_string),
        selectors,
        placeholder: None,
    }
}

#[test]
fn test_id_strategy_wins_when_unique() {
    let tree = PageTree::from_html(
        "<html><body><form><input id='email' type='email' name='email'></form></body></html>",
    )
    .unwrap();

    let selectors = SelectorSet {
        id: Some("email".to_string()),
        name: Some("email".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("email"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::Id);
    assert_eq!(tree.attr(resolution.node, "type"), Some("email"));
}

#[test]
fn test_duplicate_id_falls_through_to_next_strategy() {
    // Invalid markup in the wild: two elements sharing an id. The id
    // strategy must refuse the ambiguous match rather than guess.
    let tree = PageTree::from_html(
        r#"<html><body>
            <input id="dup" type="text">
            <input id="dup" type="text" name="surname">
        </body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        id: Some("dup".to_string()),
        name: Some("surname".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::Name);
    assert_eq!(tree.attr(resolution.node, "name"), Some("surname"));
}

#[test]
fn test_css_path_strategy() {
    let tree = PageTree::from_html(
        r#"<html><body>
            <div id="app">
                <div><input type="text"></div>
                <div><input type="text"></div>
            </div>
        </body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        css_path: Some("div#app > div:nth-of-type(2) > input:nth-of-type(1)".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::CssPath);
    let parent = tree.parent(resolution.node).unwrap();
    let grandparent = tree.parent(parent).unwrap();
    assert_eq!(tree.children(grandparent).last(), Some(&parent));
}

#[test]
fn test_structural_strategy_by_labelled_wrapper() {
    let tree = PageTree::from_html(
        r#"<html><body><form>
            <div class="fld"><span id="a">First</span><input type="text" aria-labelledby="a"></div>
            <div class="fld"><span id="b">Last</span><input type="text" aria-labelledby="b"></div>
        </form></body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        structural: Some(StructuralPattern {
            container_class: "fld".to_string(),
            labelled_by: Some("b".to_string()),
            inner_text: None,
        }),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::Structural);
    assert_eq!(tree.attr(resolution.node, "aria-labelledby"), Some("b"));
}

#[test]
fn test_structural_strategy_by_inner_text() {
    let tree = PageTree::from_html(
        r#"<html><body><form>
            <div class="fld"><span>City</span><input type="text"></div>
            <div class="fld"><span>Country</span><input type="text"></div>
        </form></body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        structural: Some(StructuralPattern {
            container_class: "fld".to_string(),
            labelled_by: None,
            inner_text: Some("Country".to_string()),
        }),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::Structural);
    let wrapper = tree.parent(resolution.node).unwrap();
    assert!(tree.text_content(wrapper).contains("Country"));
}

#[test]
fn test_class_type_strategy() {
    let tree = PageTree::from_html(
        r#"<html><body>
            <input class="subscriber-email" type="email">
            <input class="subscriber-email" type="text">
        </body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        class_type: Some(ClassTypeSelector {
            class: "subscriber-email".to_string(),
            input_type: "email".to_string(),
        }),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("email"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::ClassType);
    assert_eq!(tree.attr(resolution.node, "type"), Some("email"));
}

#[test]
fn test_near_text_strategy() {
    let tree = PageTree::from_html(
        r#"<html><body>
            <div><span>Shipping address</span><input type="text"></div>
            <div><span>Billing notes</span><textarea></textarea></div>
        </body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        near_text: Some("Billing notes".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Textarea, None, selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::NearText);
    assert_eq!(tree.tag(resolution.node), Some("textarea"));
}

#[test]
fn test_placeholder_strategy() {
    let tree = PageTree::from_html(
        r#"<html><body>
            <input type="text" placeholder="Search products">
            <input type="text" placeholder="Coupon code">
        </body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        placeholder: Some("Coupon code".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::Placeholder);
    assert_eq!(tree.attr(resolution.node, "placeholder"), Some("Coupon code"));
}

#[test]
fn test_empty_selector_set_uses_text_fallback() {
    let tree = PageTree::from_html(
        r#"<html><body>
            <div><label>Email address</label><input type="email"></div>
        </body></html>"#,
    )
    .unwrap();

    let desc = descriptor(FieldKind::Input, Some("email"), SelectorSet::default());

    let resolution = resolve(&tree, &desc, Some("Email address")).unwrap();
    assert_eq!(resolution.strategy, SelectorStrategy::TextFallback);
    assert_eq!(tree.tag(resolution.node), Some("input"));
}

#[test]
fn test_empty_selector_set_without_title_fails() {
    let tree =
        PageTree::from_html("<html><body><input type='text'></body></html>").unwrap();
    let desc = descriptor(FieldKind::Input, Some("text"), SelectorSet::default());
    assert!(resolve(&tree, &desc, None).is_none());
}

#[test]
fn test_kind_mismatch_rejected() {
    // A select reusing the id an input once held must not satisfy an
    // input descriptor.
    let tree = PageTree::from_html(
        "<html><body><select id='country'><option>US</option></select></body></html>",
    )
    .unwrap();

    let selectors = SelectorSet {
        id: Some("country".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);
    assert!(resolve(&tree, &desc, None).is_none());
}

#[test]
fn test_input_type_constraint() {
    let tree = PageTree::from_html(
        r#"<html><body>
            <input name="contact" type="text">
            <input name="contact" type="email">
        </body></html>"#,
    )
    .unwrap();

    let selectors = SelectorSet {
        name: Some("contact".to_string()),
        ..Default::default()
    };

    // With a recorded type the name strategy narrows to one element.
    let desc = descriptor(FieldKind::Input, Some("email"), selectors.clone());
    let resolution = resolve(&tree, &desc, None).unwrap();
    assert_eq!(tree.attr(resolution.node, "type"), Some("email"));

    // Without one, both candidates match and the strategy is skipped.
    let desc = descriptor(FieldKind::Input, None, selectors);
    assert!(resolve(&tree, &desc, None).is_none());
}

#[tokio::test]
async fn test_retry_counts_attempts() {
    let tree = PageTree::from_html("<html><body><input id='x' type='text'></body></html>")
        .unwrap();

    let selectors = SelectorSet {
        id: Some("x".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let (found, attempts) =
        resolve_with_retry(&tree, &desc, None, Duration::from_millis(1)).await;
    assert!(found.is_some());
    assert_eq!(attempts, 1);
}

#[tokio::test]
async fn test_retry_exhausts_after_second_attempt() {
    let tree = PageTree::from_html("<html><body><p>No fields here.</p></body></html>").unwrap();

    let selectors = SelectorSet {
        id: Some("missing".to_string()),
        ..Default::default()
    };
    let desc = descriptor(FieldKind::Input, Some("text"), selectors);

    let (found, attempts) =
        resolve_with_retry(&tree, &desc, None, Duration::from_millis(1)).await;
    assert!(found.is_none());
    assert_eq!(attempts, 2);
}
