//! Canvas Element Types
//!
//! This module defines the element model for the funnel canvas.
//! A step owns an ordered list of elements; list order is rendering order.

use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

/// Ordered list of elements belonging to one step
pub type ElementList = Vec<Element>;

/// Stable element identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub Uuid);

impl ElementId {
    /// Generate a fresh identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host-provided step key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepId(pub String);

impl StepId {
    /// Create a step id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw key
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StepId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StepId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renderable element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Headline text
    Heading,
    /// Paragraph text
    Text,
    /// Call-to-action button
    Button,
    /// Static image
    Image,
    /// Embedded video
    Video,
    /// Lead capture form
    Form,
    /// Single input field
    Input,
    /// Horizontal rule
    Divider,
    /// Vertical whitespace
    Spacer,
    /// Countdown timer
    Countdown,
    /// Customer quote
    Testimonial,
    /// Pricing table
    Pricing,
}

impl ElementKind {
    /// Every kind, in palette order
    pub const ALL: [ElementKind; 12] = [
        Self::Heading,
        Self::Text,
        Self::Button,
        Self::Image,
        Self::Video,
        Self::Form,
        Self::Input,
        Self::Divider,
        Self::Spacer,
        Self::Countdown,
        Self::Testimonial,
        Self::Pricing,
    ];

    /// Get the kind as a string
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heading => "heading",
            Self::Text => "text",
            Self::Button => "button",
            Self::Image => "image",
            Self::Video => "video",
            Self::Form => "form",
            Self::Input => "input",
            Self::Divider => "divider",
            Self::Spacer => "spacer",
            Self::Countdown => "countdown",
            Self::Testimonial => "testimonial",
            Self::Pricing => "pricing",
        }
    }

    /// Default content payload for a freshly added element
    #[must_use]
    pub fn default_content(&self) -> serde_json::Value {
        match self {
            Self::Heading => json!({ "text": "Your headline here", "level": 1 }),
            Self::Text => json!({ "text": "Write something compelling." }),
            Self::Button => json!({ "label": "Click me", "href": "#", "variant": "primary" }),
            Self::Image => json!({ "src": "", "alt": "" }),
            Self::Video => json!({ "url": "", "autoplay": false }),
            Self::Form => json!({
                "fields": [
                    { "name": "email", "label": "Email", "required": true }
                ],
                "submit_label": "Submit"
            }),
            Self::Input => json!({ "name": "field", "label": "Label", "placeholder": "" }),
            Self::Divider => json!({ "style": "solid" }),
            Self::Spacer => json!({ "height": 32 }),
            Self::Countdown => json!({ "ends_at": null, "expired_text": "Offer expired" }),
            Self::Testimonial => json!({ "quote": "", "author": "", "avatar": "" }),
            Self::Pricing => json!({ "plans": [] }),
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display-only layout hints
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Horizontal offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Vertical offset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Rendered width
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Rendered height
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

/// Transient editor flags. Never persisted and ignored by equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementFlags {
    /// Element is rendered in preview mode
    pub preview: bool,
    /// Pointer is over the element
    pub hovered: bool,
}

/// One visual unit on a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Element {
    /// Unique identifier within the step
    pub id: ElementId,

    /// Element kind
    #[serde(rename = "type")]
    pub kind: ElementKind,

    /// Kind-specific payload, opaque to the engine
    #[serde(default)]
    pub content: serde_json::Value,

    /// Optional layout hints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<Layout>,

    /// Transient flags
    #[serde(skip)]
    pub flags: ElementFlags,
}

impl Element {
    /// Create an element of `kind` with its default content and a fresh id
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            content: kind.default_content(),
            layout: None,
            flags: ElementFlags::default(),
        }
    }

    /// Replace the content payload
    #[must_use]
    pub fn with_content(mut self, content: serde_json::Value) -> Self {
        self.content = content;
        self
    }

    /// Set layout hints
    #[must_use]
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Clone under a new identifier with transient flags reset
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: ElementId::new(),
            kind: self.kind,
            content: self.content.clone(),
            layout: self.layout,
            flags: ElementFlags::default(),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.kind == other.kind
            && self.content == other.content
            && self.layout == other.layout
    }
}

/// Index of the element with `id`
#[must_use]
pub fn position_of(list: &[Element], id: ElementId) -> Option<usize> {
    list.iter().position(|e| e.id == id)
}

/// Whether `list` holds an element with `id`
#[must_use]
pub fn contains(list: &[Element], id: ElementId) -> bool {
    position_of(list, id).is_some()
}

/// Whether all identifiers in `list` are distinct
#[must_use]
pub fn has_unique_ids(list: &[Element]) -> bool {
    let mut seen = std::collections::HashSet::with_capacity(list.len());
    list.iter().all(|e| seen.insert(e.id))
}
