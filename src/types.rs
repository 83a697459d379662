use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Output format for CLI results
#[derive(Clone, Copy, Debug, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format for programmatic consumption
    Json,
    /// Human-readable simple format
    Simple,
}

/// Kind of form control a field descriptor refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Input,
    Select,
    Textarea,
    /// Any element carrying contenteditable
    Editable,
}

impl FieldKind {
    /// Tag name this kind matches, if it is tag-determined
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            FieldKind::Input => Some("input"),
            FieldKind::Select => Some("select"),
            FieldKind::Textarea => Some("textarea"),
            FieldKind::Editable => None,
        }
    }
}

/// Where a piece of field context (or a resolved title) came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextSource {
    AriaLabelledby,
    ExplicitLabel,
    HeadingRole,
    AriaLabel,
    NearbyHeading,
    PrecedingText,
    Tooltip,
    NearbyElement,
    Placeholder,
    NameAttribute,
    IdAttribute,
}

/// A piece of context text gathered near a field, with its ranking weight
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContextClue {
    /// Which gathering strategy produced this clue
    pub source: ContextSource,
    /// The (whitespace-collapsed) text
    pub text: String,
    /// Fixed weight of the source, 0.0 to 1.0
    pub weight: f64,
}

/// The inferred human-readable title of a field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldTitle {
    /// Inferred title text
    pub text: String,
    /// Strategy that produced the title
    pub source: ContextSource,
    /// Fixed confidence of the winning strategy
    pub confidence: f64,
}

/// Structural re-acquisition pattern: a repeated item-container class plus
/// either an aria-labelledby reference or the title as inner text
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuralPattern {
    /// Class shared by the repeated field containers
    pub container_class: String,
    /// aria-labelledby value on the control, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labelled_by: Option<String>,
    /// Title text expected inside the matching container
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_text: Option<String>,
}

/// Class-plus-type re-acquisition pattern
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassTypeSelector {
    /// First non-framework class on the control
    pub class: String,
    /// The control's type attribute
    pub input_type: String,
}

/// All re-acquisition strategies recorded for one field, strongest first.
/// Resolution tries them in declaration order and keeps the first strategy
/// matching exactly one element.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectorSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub css_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural: Option<StructuralPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_type: Option<ClassTypeSelector>,
    /// Title text expected near a control of the field's type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub near_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl SelectorSet {
    /// True when no strategy carries a value
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.css_path.is_none()
            && self.structural.is_none()
            && self.name.is_none()
            && self.class_type.is_none()
            && self.near_text.is_none()
            && self.placeholder.is_none()
    }
}

/// Which selector strategy matched during re-acquisition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectorStrategy {
    Id,
    CssPath,
    Structural,
    Name,
    ClassType,
    NearText,
    Placeholder,
    /// Last-resort type-plus-text heuristic used when the set is empty
    TextFallback,
}

/// Everything needed to find one field again on a later visit
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Stable key: the element id, else its name, else a positional key
    pub key: String,
    pub kind: FieldKind,
    /// The type attribute for inputs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    pub selectors: SelectorSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// One field with its inferred context, as produced by analysis
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyzedField {
    pub descriptor: FieldDescriptor,
    pub title: FieldTitle,
    /// Every clue gathered for the field, in gathering order
    pub clues: Vec<ContextClue>,
}

/// Result of analyzing one page
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Page URL the analysis was keyed on
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    /// Form containers that claimed at least one field
    pub container_count: usize,
    /// Fields that resolved to a meaningful title
    pub fields: Vec<AnalyzedField>,
}

/// Persisted form of one analyzed field
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredField {
    pub key: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    pub title: FieldTitle,
    pub selectors: SelectorSet,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Retained clues; the compact record keeps at most two
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub clues: Vec<ContextClue>,
}

impl StoredField {
    /// Rebuild the descriptor used for re-acquisition
    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            key: self.key.clone(),
            kind: self.kind,
            input_type: self.input_type.clone(),
            selectors: self.selectors.clone(),
            placeholder: self.placeholder.clone(),
        }
    }
}

/// Persisted field map for one page URL
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredFieldMap {
    pub url: String,
    pub analyzed_at: DateTime<Utc>,
    /// Fields in analysis order
    pub fields: Vec<StoredField>,
}

impl StoredFieldMap {
    /// Look up a stored field by its key
    pub fn field(&self, key: &str) -> Option<&StoredField> {
        self.fields.iter().find(|f| f.key == key)
    }
}

/// Result of re-acquiring a single cached field
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResolveReport {
    pub key: String,
    /// Strategy that matched
    pub strategy: SelectorStrategy,
    /// Acquisition attempts, including the retry
    pub attempts: u32,
    /// Tag of the matched element
    pub tag: String,
}

/// Notifications a host page would observe after a value is written
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldEvent {
    Input,
    Change,
    Blur,
}

/// Per-field result status of a fill pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStatus {
    Filled,
    Skipped,
    Failed,
}

/// Outcome of filling one field
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FillOutcome {
    pub key: String,
    pub status: FillStatus,
    /// Strategy that re-acquired the element, when acquisition succeeded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<SelectorStrategy>,
    /// Acquisition attempts, including the retry
    pub attempts: u32,
    /// Events recorded after a successful write, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<FieldEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one fill pass over a page
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FillReport {
    pub url: String,
    pub outcomes: Vec<FillOutcome>,
    pub filled: usize,
    pub failed: usize,
}

/// Query sent to a suggestion provider for one field
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestionQuery {
    /// Search string built from the title, placeholder and type keywords
    pub search_query: String,
    pub field_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Free-form user instructions forwarded to the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
}

/// Where a suggested value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionOrigin {
    KnowledgeBase,
    Generative,
    Fallback,
}

/// One candidate value for a field, best first
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub value: String,
    pub source: SuggestionOrigin,
    pub confidence: f64,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
