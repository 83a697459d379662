// Unit tests for analysis orchestration

use super::*;
use crate::types::{ContextSource, FieldKind};

const SIGNUP: &str = r#"<html><body>
    <h1>Create account</h1>
    <form id="signup">
        <label for="email">Email address</label>
        <input id="email" type="email" name="email">
        <input type="text" name="firstName" placeholder="First name">
        <input type="hidden" name="csrf" value="token">
        <textarea name="bio" aria-label="Short bio"></textarea>
    </form>
</body></html>"#;

#[test]
fn test_analyze_reports_visible_fields() {
    let tree = PageTree::from_html(SIGNUP).unwrap();
    let report = analyze(&tree, "https://example.com/signup").unwrap();

    assert_eq!(report.url, "https://example.com/signup");
    assert_eq!(report.container_count, 1);
    let keys: Vec<&str> = report.fields.iter().map(|f| f.descriptor.key.as_str()).collect();
    assert_eq!(keys, vec!["email", "firstName", "bio"]);
}

#[test]
fn test_keys_prefer_id_then_name_then_position() {
    let tree = PageTree::from_html(
        r#"<html><body><form>
            <input id="alpha" name="a-name" type="text" aria-label="Alpha">
            <input name="beta" type="text" aria-label="Beta">
            <input type="text" aria-label="Gamma">
        </form></body></html>"#,
    )
    .unwrap();
    let report = analyze(&tree, "test").unwrap();

    let keys: Vec<&str> = report.fields.iter().map(|f| f.descriptor.key.as_str()).collect();
    assert_eq!(keys, vec!["alpha", "beta", "field_2"]);
}

#[test]
fn test_radio_group_keys_get_suffixes() {
    let tree = PageTree::from_html(
        r#"<html><body><form>
            <label>Red <input type="radio" name="color" value="red"></label>
            <label>Green <input type="radio" name="color" value="green"></label>
            <label>Blue <input type="radio" name="color" value="blue"></label>
        </form></body></html>"#,
    )
    .unwrap();
    let report = analyze(&tree, "test").unwrap();

    let keys: Vec<&str> = report.fields.iter().map(|f| f.descriptor.key.as_str()).collect();
    assert_eq!(keys, vec!["color", "color_2", "color_3"]);
}

#[test]
fn test_untitled_field_dropped() {
    // The checkbox has no attributes, no label and no text anywhere near
    // it, so no clue source can speak for it.
    let tree = PageTree::from_html(
        r#"<html><body><form>
            <input type="checkbox">
            <input type="text" aria-label="Known">
        </form></body></html>"#,
    )
    .unwrap();
    let report = analyze(&tree, "test").unwrap();

    assert_eq!(report.fields.len(), 1);
    assert_eq!(report.fields[0].descriptor.key, "field_1");
    assert_eq!(report.fields[0].title.text, "Known");
}

#[test]
fn test_no_containers_is_an_error() {
    let tree =
        PageTree::from_html("<html><body><p>Nothing to fill here.</p></body></html>").unwrap();
    assert!(matches!(
        analyze(&tree, "test"),
        Err(EngineError::NoFormsFound)
    ));
}

#[test]
fn test_analysis_is_idempotent() {
    let tree = PageTree::from_html(SIGNUP).unwrap();
    let first = analyze(&tree, "test").unwrap();
    let second = analyze(&tree, "test").unwrap();

    let summarize = |r: &AnalysisReport| -> Vec<(String, String, String)> {
        r.fields
            .iter()
            .map(|f| {
                (
                    f.descriptor.key.clone(),
                    f.title.text.clone(),
                    format!("{:.2}", f.title.confidence),
                )
            })
            .collect()
    };
    assert_eq!(summarize(&first), summarize(&second));
}

#[test]
fn test_titles_and_types_recorded() {
    let tree = PageTree::from_html(SIGNUP).unwrap();
    let report = analyze(&tree, "test").unwrap();

    let email = &report.fields[0];
    assert_eq!(email.descriptor.kind, FieldKind::Input);
    assert_eq!(email.descriptor.input_type.as_deref(), Some("email"));
    assert_eq!(email.title.source, ContextSource::NameAttribute);
    assert_eq!(email.title.text, "email");

    let bio = &report.fields[2];
    assert_eq!(bio.descriptor.kind, FieldKind::Textarea);
    assert_eq!(bio.descriptor.input_type, None);
}

#[test]
fn test_stored_forms_share_shape_but_not_clues() {
    let tree = PageTree::from_html(SIGNUP).unwrap();
    let report = analyze(&tree, "https://example.com/signup").unwrap();

    let full = to_stored(&report);
    let compact = to_compact(&report);

    assert_eq!(full.url, compact.url);
    assert_eq!(full.fields.len(), compact.fields.len());
    for (f, c) in full.fields.iter().zip(&compact.fields) {
        assert_eq!(f.key, c.key);
        assert_eq!(f.title, c.title);
        assert!(c.clues.len() <= 2);
        assert!(c.clues.len() <= f.clues.len());
    }

    // The email field gathered an explicit label; the compact record
    // keeps it.
    let email = compact.field("email").unwrap();
    assert_eq!(email.clues[0].source, ContextSource::ExplicitLabel);
}
