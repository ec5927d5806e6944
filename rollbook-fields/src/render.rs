//! The field renderer.
//!
//! `render` is synchronous and never fails. Kinds backed by an enrichment
//! lookup come back as [`FieldView::Loading`] together with an [`Enrichment`]
//! that resolves to the final view.

use std::fmt;
use std::sync::Arc;

use chrono::FixedOffset;
use rollbook_common::{display_raw, value_at};
use rollbook_config::DisplayConfig;
use serde_json::Value;
use tracing::{trace, warn};

use crate::time::{format_timestamp, offset_from_minutes};
use crate::types::{Enriched, EnrichmentSource, FieldDescriptor, FieldType, Formatter};
use crate::view::{Badge, FieldView};

/// Sub-path read by [`FieldType::Length`].
const LENGTH_PATH: &str = "length";

/// Maps field kinds and values to views.
#[derive(Debug, Clone)]
pub struct FieldRenderer {
    display: DisplayConfig,
    offset: FixedOffset,
}

impl Default for FieldRenderer {
    fn default() -> Self {
        Self::new(DisplayConfig::default())
    }
}

impl FieldRenderer {
    pub fn new(display: DisplayConfig) -> Self {
        let offset = offset_from_minutes(display.utc_offset_minutes);
        Self { display, offset }
    }

    /// Render the value at `field.key` on a record.
    pub fn render_cell(&self, field: &FieldDescriptor, record: &Value) -> Rendered {
        let value = value_at(record, &field.key).cloned().unwrap_or(Value::Null);
        self.render(field, value)
    }

    /// Render a value with a descriptor's kind, api action and formatter.
    pub fn render(&self, field: &FieldDescriptor, value: Value) -> Rendered {
        self.render_value(
            &field.field_type,
            value,
            field.api_action.as_ref(),
            field.formatter.as_ref(),
        )
    }

    /// Render a value. The formatter, if any, runs before kind dispatch.
    pub fn render_value(
        &self,
        field_type: &FieldType,
        value: Value,
        api_action: Option<&Arc<dyn EnrichmentSource>>,
        formatter: Option<&Formatter>,
    ) -> Rendered {
        let value = match formatter {
            Some(f) => f(value),
            None => value,
        };

        if field_type.is_remote() {
            if let Some(source) = api_action {
                return Rendered::pending(field_type.clone(), value, Arc::clone(source));
            }
        }

        Rendered::ready(self.dispatch(field_type, &value))
    }

    fn dispatch(&self, field_type: &FieldType, value: &Value) -> FieldView {
        match field_type {
            FieldType::Uuid => {
                let full = display_raw(value);
                let short = full.chars().take(8).collect();
                FieldView::Uuid { full, short }
            }
            FieldType::Text => FieldView::text(display_raw(value)),
            FieldType::Number => FieldView::Number {
                text: display_raw(value),
            },
            FieldType::MultilineText => FieldView::Multiline {
                lines: display_raw(value).lines().map(str::to_string).collect(),
            },
            FieldType::Boolean => FieldView::Boolean {
                value: truthy(value),
            },
            FieldType::Thumbnail => FieldView::Thumbnail {
                src: display_raw(value),
            },
            FieldType::MultipleImages => FieldView::Images {
                srcs: string_list(value),
            },
            FieldType::RichText => FieldView::RichText {
                html: display_raw(value),
            },
            FieldType::TimeFull => self.time(value, &self.display.time_full),
            FieldType::TimeDate => self.time(value, &self.display.time_date),
            FieldType::TimeHour => self.time(value, &self.display.time_hour),
            FieldType::TimeMonth => self.time(value, &self.display.time_month),
            FieldType::LinkButton => FieldView::LinkButton {
                href: display_raw(value),
            },
            FieldType::Link => {
                let href = display_raw(value);
                FieldView::Link {
                    label: href.clone(),
                    href,
                }
            }
            FieldType::LinkFile => {
                let href = display_raw(value);
                FieldView::LinkFile {
                    file_name: file_name(&href),
                    href,
                }
            }
            FieldType::Length => FieldView::text(length_of(value).to_string()),
            FieldType::BadgeApi => FieldView::Badge(Badge::plain(display_raw(value))),
            FieldType::MultiBadgeApi => FieldView::Badges {
                badges: string_list(value).into_iter().map(Badge::plain).collect(),
            },
            FieldType::QrCode => FieldView::QrCode {
                payload: display_raw(value),
            },
            FieldType::BarCode => FieldView::BarCode {
                payload: display_raw(value),
            },
            FieldType::InputBox => FieldView::InputBox {
                text: display_raw(value),
            },
            FieldType::Icon => FieldView::Icon {
                name: display_raw(value),
            },
            FieldType::LocationCard => location(value),
            FieldType::Custom => FieldView::raw(display_raw(value)),
            FieldType::Unknown(tag) => {
                trace!(%tag, "unknown field type, rendering raw value");
                FieldView::raw(display_raw(value))
            }
        }
    }

    fn time(&self, value: &Value, pattern: &str) -> FieldView {
        match format_timestamp(value, pattern, self.offset) {
            Some(text) => FieldView::Time { text },
            None => FieldView::raw(display_raw(value)),
        }
    }
}

/// A rendered field: the view to show now, plus any outstanding lookup.
pub struct Rendered {
    pub view: FieldView,
    pub enrichment: Option<Enrichment>,
}

impl Rendered {
    pub fn ready(view: FieldView) -> Self {
        Self {
            view,
            enrichment: None,
        }
    }

    fn pending(kind: FieldType, value: Value, source: Arc<dyn EnrichmentSource>) -> Self {
        Self {
            view: FieldView::Loading,
            enrichment: Some(Enrichment {
                kind,
                value,
                source,
            }),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.enrichment.is_some()
    }

    /// Wait for the lookup, if any, and return the final view.
    pub async fn resolve(self) -> FieldView {
        match self.enrichment {
            Some(enrichment) => enrichment.resolve().await,
            None => self.view,
        }
    }
}

impl fmt::Debug for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("view", &self.view)
            .field("pending", &self.enrichment.is_some())
            .finish()
    }
}

/// An outstanding enrichment lookup for one field.
pub struct Enrichment {
    kind: FieldType,
    value: Value,
    source: Arc<dyn EnrichmentSource>,
}

impl Enrichment {
    /// The (formatted) value the lookup is for.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Run the lookup. Failures resolve as an empty result.
    pub async fn resolve(self) -> FieldView {
        let enriched = match self.source.lookup(&self.value).await {
            Ok(enriched) => enriched,
            Err(err) => {
                warn!(kind = %self.kind, error = %err, "enrichment lookup failed, using empty result");
                Enriched::empty()
            }
        };
        finish(&self.kind, &self.value, enriched)
    }
}

fn finish(kind: &FieldType, value: &Value, enriched: Enriched) -> FieldView {
    match kind {
        FieldType::BadgeApi => {
            let matched = enriched.matching(value).into_iter().next().or(match enriched {
                Enriched::One(opt) => Some(opt),
                _ => None,
            });
            match matched {
                Some(opt) => FieldView::Badge(Badge {
                    label: opt.label,
                    color: opt.color,
                }),
                None => FieldView::Badge(Badge::plain(display_raw(value))),
            }
        }
        FieldType::MultiBadgeApi => {
            let items = match value {
                Value::Array(items) => items.clone(),
                Value::Null => Vec::new(),
                other => vec![other.clone()],
            };
            let badges = items
                .iter()
                .filter_map(|item| enriched.matching(item).into_iter().next())
                .map(|opt| Badge {
                    label: opt.label,
                    color: opt.color,
                })
                .collect();
            FieldView::Badges { badges }
        }
        FieldType::Link => {
            let href = display_raw(value);
            let label = match &enriched {
                Enriched::One(opt) => Some(opt.label.clone()),
                Enriched::Many(_) => enriched.matching(value).into_iter().next().map(|o| o.label),
                Enriched::Value(v) => Some(display_raw(v)),
            };
            FieldView::Link {
                label: label.unwrap_or_else(|| href.clone()),
                href,
            }
        }
        FieldType::Custom => match enriched {
            Enriched::Value(v) => FieldView::Custom { value: v },
            Enriched::One(opt) => FieldView::Badge(Badge {
                label: opt.label,
                color: opt.color,
            }),
            Enriched::Many(opts) if opts.is_empty() => FieldView::raw(display_raw(value)),
            Enriched::Many(opts) => FieldView::Badges {
                badges: opts
                    .into_iter()
                    .map(|o| Badge {
                        label: o.label,
                        color: o.color,
                    })
                    .collect(),
            },
        },
        _ => FieldView::raw(display_raw(value)),
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "1" | "yes"),
        Value::Null => false,
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().map(display_raw).collect(),
        Value::Null => Vec::new(),
        other => vec![display_raw(other)],
    }
}

fn file_name(href: &str) -> String {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
        .to_string()
}

/// Element count of the collection at the `length` sub-path, 0 if absent.
fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::String(s) => s.chars().count(),
        Value::Object(_) => match value_at(value, LENGTH_PATH) {
            Some(Value::Number(n)) => n.as_u64().map_or(0, |n| n as usize),
            Some(inner @ (Value::Array(_) | Value::String(_))) => length_of(inner),
            _ => 0,
        },
        _ => 0,
    }
}

fn location(value: &Value) -> FieldView {
    let number = |keys: &[&str]| {
        keys.iter()
            .find_map(|k| value_at(value, k))
            .and_then(|v| match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.parse().ok(),
                _ => None,
            })
    };
    let address = match value {
        Value::String(s) => Some(s.clone()),
        _ => ["address", "name"]
            .iter()
            .find_map(|k| value_at(value, k))
            .map(display_raw),
    };
    FieldView::Location {
        address,
        latitude: number(&["latitude", "lat"]),
        longitude: number(&["longitude", "lng"]),
    }
}
