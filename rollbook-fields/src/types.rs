//! Field kinds and column descriptors.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use rollbook_common::{ApiError, EnumOption, SortOrder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The kind of a field, which decides how its value is displayed.
///
/// Serialized as the snake_case tag used by page descriptors
/// (`"time_date"`, `"badge_api"`). Any other tag becomes
/// [`FieldType::Unknown`] and is displayed raw.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Uuid,
    Text,
    Number,
    MultilineText,
    Boolean,
    Thumbnail,
    MultipleImages,
    RichText,
    TimeFull,
    TimeDate,
    TimeHour,
    TimeMonth,
    LinkButton,
    Link,
    LinkFile,
    Length,
    BadgeApi,
    MultiBadgeApi,
    QrCode,
    BarCode,
    InputBox,
    Icon,
    LocationCard,
    Custom,
    /// A tag no renderer handles; displayed as the raw value.
    Unknown(String),
}

impl FieldType {
    /// Every known kind, in declaration order.
    pub const KNOWN: [FieldType; 24] = [
        FieldType::Uuid,
        FieldType::Text,
        FieldType::Number,
        FieldType::MultilineText,
        FieldType::Boolean,
        FieldType::Thumbnail,
        FieldType::MultipleImages,
        FieldType::RichText,
        FieldType::TimeFull,
        FieldType::TimeDate,
        FieldType::TimeHour,
        FieldType::TimeMonth,
        FieldType::LinkButton,
        FieldType::Link,
        FieldType::LinkFile,
        FieldType::Length,
        FieldType::BadgeApi,
        FieldType::MultiBadgeApi,
        FieldType::QrCode,
        FieldType::BarCode,
        FieldType::InputBox,
        FieldType::Icon,
        FieldType::LocationCard,
        FieldType::Custom,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Uuid => "uuid",
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::MultilineText => "multiline_text",
            FieldType::Boolean => "boolean",
            FieldType::Thumbnail => "thumbnail",
            FieldType::MultipleImages => "multiple_images",
            FieldType::RichText => "rich_text",
            FieldType::TimeFull => "time_full",
            FieldType::TimeDate => "time_date",
            FieldType::TimeHour => "time_hour",
            FieldType::TimeMonth => "time_month",
            FieldType::LinkButton => "link_button",
            FieldType::Link => "link",
            FieldType::LinkFile => "link_file",
            FieldType::Length => "length",
            FieldType::BadgeApi => "badge_api",
            FieldType::MultiBadgeApi => "multi_badge_api",
            FieldType::QrCode => "qr_code",
            FieldType::BarCode => "bar_code",
            FieldType::InputBox => "input_box",
            FieldType::Icon => "icon",
            FieldType::LocationCard => "location_card",
            FieldType::Custom => "custom",
            FieldType::Unknown(tag) => tag,
        }
    }

    /// Kinds whose display waits on an enrichment lookup when one is given.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FieldType::BadgeApi | FieldType::MultiBadgeApi | FieldType::Link | FieldType::Custom
        )
    }
}

impl From<&str> for FieldType {
    fn from(tag: &str) -> Self {
        FieldType::KNOWN
            .iter()
            .find(|kind| kind.as_str() == tag)
            .cloned()
            .unwrap_or_else(|| FieldType::Unknown(tag.to_string()))
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        FieldType::from(tag.as_str())
    }
}

impl From<FieldType> for String {
    fn from(kind: FieldType) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an enrichment lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Enriched {
    One(EnumOption),
    Many(Vec<EnumOption>),
    /// A custom value, used by [`FieldType::Custom`].
    Value(Value),
}

impl Enriched {
    pub fn empty() -> Self {
        Enriched::Many(Vec::new())
    }

    /// The options in this result matching `raw` by value or id.
    pub fn matching(&self, raw: &Value) -> Vec<EnumOption> {
        match self {
            Enriched::One(opt) if opt.matches(raw) => vec![opt.clone()],
            Enriched::Many(opts) => opts.iter().filter(|o| o.matches(raw)).cloned().collect(),
            _ => Vec::new(),
        }
    }
}

/// Secondary asynchronous lookup that augments a displayed value.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    async fn lookup(&self, value: &Value) -> Result<Enriched, ApiError>;
}

/// Adapts an async closure into an [`EnrichmentSource`].
pub struct FnSource<F>(pub F);

#[async_trait]
impl<F, Fut> EnrichmentSource for FnSource<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Enriched, ApiError>> + Send,
{
    async fn lookup(&self, value: &Value) -> Result<Enriched, ApiError> {
        (self.0)(value.clone()).await
    }
}

/// Pure value transform applied before kind dispatch.
pub type Formatter = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Declarative description of one column or attribute.
#[derive(Clone)]
pub struct FieldDescriptor {
    /// Dotted property path on the record.
    pub key: String,
    pub title: String,
    pub field_type: FieldType,
    pub api_action: Option<Arc<dyn EnrichmentSource>>,
    pub formatter: Option<Formatter>,
    /// Explicit ordering for this column. Tables sort by the first column
    /// that declares one.
    pub sort: Option<SortOrder>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, title: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            field_type,
            api_action: None,
            formatter: None,
            sort: None,
        }
    }

    pub fn with_api_action(mut self, source: Arc<dyn EnrichmentSource>) -> Self {
        self.api_action = Some(source);
        self
    }

    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.sort = Some(order);
        self
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("field_type", &self.field_type)
            .field("has_api_action", &self.api_action.is_some())
            .field("has_formatter", &self.formatter.is_some())
            .field("sort", &self.sort)
            .finish()
    }
}
