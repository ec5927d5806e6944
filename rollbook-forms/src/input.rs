//! Form input descriptors.

use std::fmt;
use std::sync::Arc;

use rollbook_common::EnumOption;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::source::OptionSource;

/// The kind of control an input renders as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    Textarea,
    Number,
    Password,
    Email,
    Checkbox,
    Date,
    DateTime,
    Time,
    Select,
    SelectApiOption,
    MultiSelectApiOption,
}

impl InputKind {
    /// Kinds whose choices come from an option list.
    pub fn is_select(&self) -> bool {
        matches!(
            self,
            InputKind::Select | InputKind::SelectApiOption | InputKind::MultiSelectApiOption
        )
    }

    pub fn is_multi(&self) -> bool {
        matches!(self, InputKind::MultiSelectApiOption)
    }
}

/// Called with the raw value every time an input changes.
pub type ChangeHook = Arc<dyn Fn(&Value) + Send + Sync>;

/// Kind-specific input options.
#[derive(Clone, Default)]
pub struct FieldProps {
    pub option_source: Option<Arc<dyn OptionSource>>,
    /// Fixed choices, used when there is no option source
    pub options: Vec<EnumOption>,
    pub disabled: bool,
    pub placeholder: Option<String>,
}

impl FieldProps {
    pub fn with_source(source: impl OptionSource + 'static) -> Self {
        Self {
            option_source: Some(Arc::new(source)),
            ..Self::default()
        }
    }

    pub fn with_options(options: Vec<EnumOption>) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }
}

impl fmt::Debug for FieldProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldProps")
            .field("option_source", &self.option_source.is_some())
            .field("options", &self.options.len())
            .field("disabled", &self.disabled)
            .field("placeholder", &self.placeholder)
            .finish()
    }
}

/// One input of a form.
#[derive(Clone)]
pub struct FormFieldDescriptor {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub props: FieldProps,
    /// Grid columns the input spans
    pub span: Option<u8>,
    pub on_change_extra: Option<ChangeHook>,
}

impl FormFieldDescriptor {
    pub fn new(name: impl Into<String>, label: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            props: FieldProps::default(),
            span: None,
            on_change_extra: None,
        }
    }

    pub fn with_props(mut self, props: FieldProps) -> Self {
        self.props = props;
        self
    }

    pub fn with_span(mut self, span: u8) -> Self {
        self.span = Some(span);
        self
    }

    pub fn on_change_extra<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.on_change_extra = Some(Arc::new(hook));
        self
    }
}

impl fmt::Debug for FormFieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormFieldDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("props", &self.props)
            .field("span", &self.span)
            .field("on_change_extra", &self.on_change_extra.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn kind_tags() {
        assert_eq!(
            serde_json::to_value(InputKind::SelectApiOption).unwrap(),
            json!("select_api_option")
        );
        let kind: InputKind = serde_json::from_value(json!("date_time")).unwrap();
        assert_eq!(kind, InputKind::DateTime);
        assert!(InputKind::MultiSelectApiOption.is_select());
        assert!(!InputKind::Textarea.is_select());
    }

    #[test]
    fn builder_sets_props() {
        let field = FormFieldDescriptor::new("grade", "Grade", InputKind::Select)
            .with_props(FieldProps::with_options(vec![EnumOption::new(6, "6")]).disabled())
            .with_span(2)
            .on_change_extra(|_| {});
        assert!(field.props.disabled);
        assert_eq!(field.span, Some(2));
        assert!(field.on_change_extra.is_some());
        assert!(format!("{field:?}").contains("grade"));
    }
}
