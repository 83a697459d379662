//! # formprobe
#![allow(clippy::uninlined_format_args)]
//!
//! Form field context inference for LLMs and automation.
//!
//! Finds the form fields on a page, infers what each one is for from the
//! surrounding markup, and can re-acquire and fill those fields later even
//! after the page structure has shifted.
//!
//! ## Primary Use Case
//!
//! This crate is primarily designed as a CLI tool for LLMs and scripts that
//! need to understand and drive HTML forms without a browser. While it can
//! be used as a library, the main interface is through the command line.
//!
//! ## Installation
//!
//! ```bash
//! cargo install formprobe
//! ```
//!
//! ## CLI Usage
//!
//! ### Basic Commands
//!
//! ```bash
//! # Analyze a page: discover fields, infer titles, cache the result
//! formprobe analyze checkout.html --url "https://shop.example/checkout"
//!
//! # Analyze a captured snapshot (geometry-aware heading detection)
//! formprobe analyze checkout.json
//!
//! # Re-acquire one field on a newer version of the page
//! formprobe resolve checkout-v2.html email --url "https://shop.example/checkout"
//!
//! # Fill fields with explicit values
//! formprobe fill checkout.html --set email=user@example.com --set country=France
//!
//! # Fill everything else from the suggestion provider
//! formprobe fill checkout.html --set email=user@example.com --suggest
//!
//! # Ask for candidate values directly
//! formprobe suggest "Phone number" --type tel
//! ```
//!
//! ### Cache Management
//!
//! ```bash
//! # List cached page analyses
//! formprobe cache list
//!
//! # Show the stored field map for a page
//! formprobe cache show "https://shop.example/checkout"
//!
//! # Drop one page, or everything
//! formprobe cache clear "https://shop.example/checkout"
//! formprobe cache clear
//! ```
//!
//! ### Suggestion Endpoint
//!
//! ```bash
//! # Point at an HTTP provider instead of the built-in static values
//! formprobe suggest "Work email" --type email \
//!   --endpoint "https://suggest.example/v1" --api-key "$KEY"
//!
//! # Or configure it once via the environment
//! export FORMPROBE_SUGGEST_URL="https://suggest.example/v1"
//! export FORMPROBE_API_KEY="..."
//! formprobe fill checkout.html --suggest
//! ```
//!
//! ### JSON Output and Processing with jq
//!
//! ```bash
//! # Field keys and inferred titles
//! formprobe analyze checkout.html | jq '.fields[] | {key: .descriptor.key, title: .title.text}'
//!
//! # Titles with low confidence
//! formprobe analyze checkout.html | jq '.fields[] | select(.title.confidence < 0.7)'
//!
//! # Which selector strategy re-acquired the field
//! formprobe resolve checkout.html email | jq '.strategy'
//!
//! # Keys of fields that failed to fill
//! formprobe fill checkout.html --suggest | jq '.outcomes[] | select(.status == "failed") | .key'
//! ```
//!
//! Errors print a JSON object to stdout and exit with a stable code:
//! `2` when no fields were found, `3` when an element could not be
//! re-acquired, `4` when persistence failed in both tiers, `5` when the
//! suggestion endpoint failed, `1` otherwise.
//!
//! ## Library Usage
//!
//! ```no_run
//! use formprobe::engine;
//! use formprobe::page::PageTree;
//!
//! # fn example() -> anyhow::Result<()> {
//! let tree = PageTree::from_html("<form><label for='email'>Email</label><input id='email'></form>")?;
//! let report = engine::analyze(&tree, "https://example.com/signup")?;
//! for field in &report.fields {
//!     println!("{} -> {}", field.descriptor.key, field.title.text);
//! }
//! # Ok(())
//! # }
//! ```

/// Analysis orchestration: containers to keyed, titled fields
pub mod engine;

/// Error taxonomy and exit-code mapping
pub mod errors;

/// Fill engine with per-field fault isolation
pub mod fill;

/// Container discovery, selector sets and re-acquisition
pub mod locator;

/// Arena page tree with geometry, built from HTML or snapshots
pub mod page;

/// Request/response protocol served by the engine task
pub mod protocol;

/// Context-clue gathering and title resolution
pub mod scorer;

/// Session configuration and provider wiring
pub mod session;

/// Tiered field-map persistence
pub mod store;

/// Suggestion providers: static table and HTTP endpoint
pub mod suggest;

/// Type definitions for descriptors, clues, reports and outcomes
pub mod types;

pub use errors::{EngineError, EngineFault, FormprobeError};
pub use page::PageTree;
pub use protocol::{EngineHandle, EngineRequest, EngineResponse};
pub use session::{Session, SessionConfig};
pub use store::{FieldStore, Tier, TieredStore};
pub use suggest::{StaticProvider, SuggestionProvider};
pub use types::{
    AnalysisReport, ContextClue, ContextSource, FieldDescriptor, FieldKind, FieldTitle,
    FillOutcome, FillReport, OutputFormat, ResolveReport, SelectorSet, SelectorStrategy,
    StoredField, StoredFieldMap, Suggestion, SuggestionQuery,
};
