//! Display representations produced by the renderer.

use serde::Serialize;
use serde_json::Value;

/// A single badge: a label with an optional color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Badge {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Badge {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            color: None,
        }
    }
}

/// What a cell or attribute shows.
///
/// Views are plain data; a front end maps each variant to a widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "kebab-case")]
pub enum FieldView {
    Text { text: String },
    Number { text: String },
    Uuid { full: String, short: String },
    Multiline { lines: Vec<String> },
    Boolean { value: bool },
    Thumbnail { src: String },
    Images { srcs: Vec<String> },
    RichText { html: String },
    Time { text: String },
    Link { href: String, label: String },
    LinkButton { href: String },
    LinkFile { href: String, file_name: String },
    Badge(Badge),
    Badges { badges: Vec<Badge> },
    QrCode { payload: String },
    BarCode { payload: String },
    InputBox { text: String },
    Icon { name: String },
    Location {
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        latitude: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        longitude: Option<f64>,
    },
    Custom { value: Value },
    /// Shown while an enrichment lookup is outstanding.
    Loading,
    /// Fallback for unknown kinds and unparseable values.
    Raw { text: String },
}

impl FieldView {
    pub fn text(text: impl Into<String>) -> Self {
        FieldView::Text { text: text.into() }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        FieldView::Raw { text: text.into() }
    }

    /// Plain-text rendition, for text front ends, exports and tests.
    pub fn plain_text(&self) -> String {
        match self {
            FieldView::Text { text }
            | FieldView::Number { text }
            | FieldView::Time { text }
            | FieldView::InputBox { text }
            | FieldView::Raw { text } => text.clone(),
            FieldView::Uuid { full, .. } => full.clone(),
            FieldView::Multiline { lines } => lines.join("\n"),
            FieldView::Boolean { value } => value.to_string(),
            FieldView::Thumbnail { src } => src.clone(),
            FieldView::Images { srcs } => srcs.join(", "),
            FieldView::RichText { html } => html.clone(),
            FieldView::Link { label, .. } => label.clone(),
            FieldView::LinkButton { href } => href.clone(),
            FieldView::LinkFile { file_name, .. } => file_name.clone(),
            FieldView::Badge(badge) => badge.label.clone(),
            FieldView::Badges { badges } => badges
                .iter()
                .map(|b| b.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            FieldView::QrCode { payload } | FieldView::BarCode { payload } => payload.clone(),
            FieldView::Icon { name } => name.clone(),
            FieldView::Location { address, .. } => address.clone().unwrap_or_default(),
            FieldView::Custom { value } => rollbook_common::display_raw(value),
            FieldView::Loading => "Loading...".to_string(),
        }
    }
}
