// Unit tests for the snapshot front-end

use super::super::PageTree;

const SNAPSHOT: &str = r#"{
    "url": "https://app.example.com/signup?step=2",
    "title": "Sign up",
    "viewport": { "width": 1280.0, "height": 800.0 },
    "root": {
        "tag": "body",
        "children": [
            { "tag": "h2", "text": "Contact details",
              "bounds": { "x": 40.0, "y": 100.0, "width": 300.0, "height": 28.0 } },
            { "tag": "input",
              "attrs": { "id": "phone", "type": "tel" },
              "bounds": { "x": 40.0, "y": 160.0, "width": 240.0, "height": 32.0 } },
            { "tag": "input",
              "attrs": { "id": "honeypot", "type": "text" },
              "visible": false }
        ]
    }
}"#;

#[test]
fn test_snapshot_builds_tree_with_geometry() {
    let tree = PageTree::from_snapshot_json(SNAPSHOT).unwrap();

    assert_eq!(tree.url.as_deref(), Some("https://app.example.com/signup?step=2"));
    assert_eq!(tree.title.as_deref(), Some("Sign up"));
    assert!(tree.has_geometry());

    let phone = tree.by_id("phone").unwrap();
    let bounds = tree.bounds(phone).unwrap();
    assert_eq!(bounds.y, 160.0);
    assert_eq!(tree.attr(phone, "type"), Some("tel"));
}

#[test]
fn test_invisible_snapshot_node_maps_to_display_none() {
    let tree = PageTree::from_snapshot_json(SNAPSHOT).unwrap();
    let honeypot = tree.by_id("honeypot").unwrap();
    assert!(!tree.is_displayed(honeypot));
}

#[test]
fn test_snapshot_text_becomes_child_text_node() {
    let tree = PageTree::from_snapshot_json(SNAPSHOT).unwrap();
    let h2 = tree
        .all_elements()
        .into_iter()
        .find(|&n| tree.tag(n) == Some("h2"))
        .unwrap();
    assert_eq!(tree.text_content(h2), "Contact details");
}

#[test]
fn test_bad_snapshot_json_errors() {
    assert!(PageTree::from_snapshot_json("{ not json").is_err());
    assert!(PageTree::from_snapshot_json(r#"{"root": 5}"#).is_err());
}
