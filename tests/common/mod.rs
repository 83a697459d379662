// Common test utilities and fixtures

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a page fixture into a temp dir and return its path
#[allow(dead_code)]
pub fn write_page(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture page");
    path
}

/// Mock pages for testing
pub mod fixtures {
    /// A checkout form covering every context source the analyzer ranks:
    /// aria-labelledby, explicit labels, attribute-derived titles, a hidden
    /// control that must be excluded, a select, a textarea and a checkbox.
    pub const CHECKOUT_PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Checkout</title></head>
    <body>
        <h1>Checkout</h1>
        <form id="checkout">
            <h2>Contact details</h2>
            <span id="email-label">Email address</span>
            <input id="email" type="email" name="email" aria-labelledby="email-label">
            <label for="first-name">First name</label>
            <input id="first-name" type="text" name="firstName">
            <input type="tel" name="phoneNumber">
            <input type="hidden" name="csrf" value="token-1">
            <h2>Shipping</h2>
            <label for="country">Country</label>
            <select id="country" name="country">
                <option value="us">United States</option>
                <option value="fr">France</option>
                <option value="jp">Japan</option>
            </select>
            <label for="notes">Delivery notes</label>
            <textarea id="notes" name="notes" placeholder="Gate codes, preferred drop-off"></textarea>
            <input id="subscribe" type="checkbox" name="subscribe" aria-label="Subscribe to offers">
        </form>
    </body>
    </html>
    "#;

    /// The checkout page after a deploy renamed the email field's id.
    /// A map recorded against [`CHECKOUT_PAGE`] still resolves the field
    /// here, through the name strategy.
    #[allow(dead_code)]
    pub const CHECKOUT_PAGE_SHIFTED: &str = r#"
    <!DOCTYPE html>
    <html>
    <head><title>Checkout</title></head>
    <body>
        <h1>Checkout</h1>
        <form id="checkout">
            <h2>Contact details</h2>
            <span id="email-label">Email address</span>
            <input id="contact-email" type="email" name="email" aria-labelledby="email-label">
            <label for="first-name">First name</label>
            <input id="first-name" type="text" name="firstName">
            <input type="tel" name="phoneNumber">
            <input type="hidden" name="csrf" value="token-1">
            <h2>Shipping</h2>
            <label for="country">Country</label>
            <select id="country" name="country">
                <option value="us">United States</option>
                <option value="fr">France</option>
                <option value="jp">Japan</option>
            </select>
            <label for="notes">Delivery notes</label>
            <textarea id="notes" name="notes" placeholder="Gate codes, preferred drop-off"></textarea>
            <input id="subscribe" type="checkbox" name="subscribe" aria-label="Subscribe to offers">
        </form>
    </body>
    </html>
    "#;

    /// A contact form whose ids are too short to title anything, so the
    /// email falls back to its explicit label and the phone to its name.
    #[allow(dead_code)]
    pub const CONTACT_PAGE: &str = r#"
    <!DOCTYPE html>
    <html>
    <body>
        <form id="contact">
            <label for="e1">Email Address</label>
            <input id="e1" type="email">
            <label for="p1">Phone</label>
            <input id="p1" type="tel" name="phoneNumber">
        </form>
    </body>
    </html>
    "#;

    /// Two controls without any markup context except one aria-label.
    /// The bare checkbox has no derivable title and must be dropped.
    #[allow(dead_code)]
    pub const BARE_CONTROLS_PAGE: &str = r#"
    <html><body>
        <form><input type="checkbox"><input type="text" aria-label="Known field"></form>
    </body></html>
    "#;

    /// No form, no controls
    #[allow(dead_code)]
    pub const NO_FORM_PAGE: &str = r#"
    <html><body><h1>About us</h1><p>No forms here.</p></body></html>
    "#;

    /// A captured snapshot with geometry. The "Account" heading sits more
    /// than 500px above the card-number input, so only "Payment details"
    /// is in heading range for it; the invisible input must be excluded.
    #[allow(dead_code)]
    pub const PROFILE_SNAPSHOT: &str = r#"{
        "url": "https://app.example.test/profile",
        "title": "Profile",
        "viewport": {"width": 1280.0, "height": 800.0},
        "root": {
            "tag": "html",
            "children": [
                {
                    "tag": "body",
                    "children": [
                        {
                            "tag": "form",
                            "attrs": {"id": "profile"},
                            "bounds": {"x": 0.0, "y": 60.0, "width": 800.0, "height": 700.0},
                            "children": [
                                {
                                    "tag": "h2",
                                    "text": "Account",
                                    "bounds": {"x": 0.0, "y": 80.0, "width": 200.0, "height": 28.0}
                                },
                                {
                                    "tag": "input",
                                    "attrs": {"id": "display-name", "name": "displayName", "type": "text"},
                                    "bounds": {"x": 0.0, "y": 130.0, "width": 320.0, "height": 32.0}
                                },
                                {
                                    "tag": "h2",
                                    "text": "Payment details",
                                    "bounds": {"x": 0.0, "y": 650.0, "width": 200.0, "height": 28.0}
                                },
                                {
                                    "tag": "input",
                                    "attrs": {"name": "ccn", "type": "text"},
                                    "bounds": {"x": 0.0, "y": 700.0, "width": 320.0, "height": 32.0}
                                },
                                {
                                    "tag": "input",
                                    "attrs": {"name": "internal", "type": "text"},
                                    "visible": false,
                                    "bounds": {"x": 0.0, "y": 740.0, "width": 320.0, "height": 32.0}
                                }
                            ]
                        }
                    ]
                }
            ]
        }
    }"#;
}
