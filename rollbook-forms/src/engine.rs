//! The form engine: state, option loading and guarded submission.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rollbook_common::{ApiError, EnumOption, Notification, Pretty};
use rollbook_config::MessageTemplates;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{FormError, Result};
use crate::input::{FormFieldDescriptor, InputKind};
use crate::source::SubmitAction;
use crate::validation::{FieldErrors, ValidationSchema};

/// Result of one `submit` call.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; the action was not called.
    Invalid(FieldErrors),
    /// The action accepted the values.
    Succeeded(Value),
    /// The action rejected the values; the form stays editable.
    Failed(ApiError),
    /// Another submission was already in flight.
    Ignored,
}

impl SubmitOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmitOutcome::Succeeded(_))
    }

    /// The notification to show for this outcome, if any.
    pub fn notification(&self, success_message: &str) -> Option<Notification> {
        match self {
            SubmitOutcome::Succeeded(_) => Some(Notification::success(success_message)),
            SubmitOutcome::Failed(err) => Some(Notification::from_error(err)),
            SubmitOutcome::Invalid(_) | SubmitOutcome::Ignored => None,
        }
    }
}

#[derive(Debug, Default)]
struct FormState {
    values: Map<String, Value>,
    errors: FieldErrors,
}

/// Builds a [`FormEngine`].
pub struct FormBuilder {
    fields: Vec<FormFieldDescriptor>,
    schema: ValidationSchema,
    defaults: Map<String, Value>,
    messages: MessageTemplates,
    action: Arc<dyn SubmitAction>,
}

impl FormBuilder {
    pub fn field(mut self, field: FormFieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    pub fn fields(mut self, fields: impl IntoIterator<Item = FormFieldDescriptor>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn schema(mut self, schema: ValidationSchema) -> Self {
        self.schema = schema;
        self
    }

    /// Initial values. Non-object values are ignored.
    pub fn defaults(mut self, defaults: Value) -> Self {
        if let Value::Object(map) = defaults {
            self.defaults = map;
        }
        self
    }

    pub fn messages(mut self, messages: MessageTemplates) -> Self {
        self.messages = messages;
        self
    }

    pub fn build(self) -> FormEngine {
        let state = FormState {
            values: self.defaults.clone(),
            errors: FieldErrors::new(),
        };
        FormEngine {
            fields: self.fields,
            schema: self.schema,
            defaults: self.defaults,
            messages: self.messages,
            action: self.action,
            state: Mutex::new(state),
            in_flight: AtomicBool::new(false),
        }
    }
}

/// Snapshot of one input for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputView {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<u8>,
}

/// Snapshot of a whole form for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    pub inputs: Vec<InputView>,
    pub submitting: bool,
}

/// Owns a form's values and errors and runs its submissions.
///
/// All methods take `&self`; the engine can be shared behind an `Arc` between
/// the input handlers and the submit button.
pub struct FormEngine {
    fields: Vec<FormFieldDescriptor>,
    schema: ValidationSchema,
    defaults: Map<String, Value>,
    messages: MessageTemplates,
    action: Arc<dyn SubmitAction>,
    state: Mutex<FormState>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when a submission ends, even if it is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FormEngine {
    pub fn builder(action: impl SubmitAction + 'static) -> FormBuilder {
        Self::builder_with(Arc::new(action))
    }

    pub fn builder_with(action: Arc<dyn SubmitAction>) -> FormBuilder {
        FormBuilder {
            fields: Vec::new(),
            schema: ValidationSchema::default(),
            defaults: Map::new(),
            messages: MessageTemplates::default(),
            action,
        }
    }

    fn state(&self) -> MutexGuard<'_, FormState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn field(&self, name: &str) -> Option<&FormFieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn label_of(&self, name: &str) -> String {
        self.field(name)
            .map(|f| f.label.clone())
            .unwrap_or_else(|| name.to_string())
    }

    pub fn fields(&self) -> &[FormFieldDescriptor] {
        &self.fields
    }

    /// Set an input's value, clear its error and call its change hook.
    ///
    /// Names without an input are stored too, so hidden values can be set.
    pub fn set_value(&self, name: &str, value: Value) {
        {
            let mut state = self.state();
            state.errors.shift_remove(name);
            state.values.insert(name.to_string(), value.clone());
        }
        if let Some(hook) = self.field(name).and_then(|f| f.on_change_extra.as_ref()) {
            hook(&value);
        }
    }

    pub fn value(&self, name: &str) -> Option<Value> {
        self.state().values.get(name).cloned()
    }

    /// All current values, including defaults for fields with no input.
    pub fn values(&self) -> Map<String, Value> {
        self.state().values.clone()
    }

    pub fn errors(&self) -> FieldErrors {
        self.state().errors.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Restore the defaults and clear all errors.
    pub fn reset(&self) {
        let mut state = self.state();
        state.values = self.defaults.clone();
        state.errors.clear();
    }

    /// Load choices for a select input.
    ///
    /// Option source failures degrade to an empty list. Inputs with static
    /// options are filtered by `search` locally.
    pub async fn load_options(&self, name: &str, search: &str) -> Result<Vec<EnumOption>> {
        let field = self
            .field(name)
            .ok_or_else(|| FormError::field_not_found(name))?;

        if let Some(source) = &field.props.option_source {
            return Ok(match source.options(search).await {
                Ok(options) => {
                    debug!(field = name, search, count = options.len(), "loaded options");
                    options
                }
                Err(err) => {
                    warn!(field = name, search, error = %err, "option lookup failed, using no options");
                    Vec::new()
                }
            });
        }

        if field.props.options.is_empty() {
            return Err(FormError::no_option_source(name));
        }
        Ok(field
            .props
            .options
            .iter()
            .filter(|o| o.matches_search(search))
            .cloned()
            .collect())
    }

    /// Validate and submit.
    ///
    /// Returns [`SubmitOutcome::Ignored`] without validating when another
    /// submission of this engine is pending.
    pub async fn submit(&self) -> SubmitOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("submission already in flight, ignoring");
            return SubmitOutcome::Ignored;
        }
        let _guard = InFlight(&self.in_flight);

        let values = self.values();
        let errors = self
            .schema
            .validate(&values, |name| self.label_of(name), &self.messages);
        self.state().errors = errors.clone();
        if !errors.is_empty() {
            debug!(errors = %Pretty(&errors), "form invalid, not submitting");
            return SubmitOutcome::Invalid(errors);
        }

        debug!(values = %Pretty(&values), "submitting form");
        match self.action.submit(Value::Object(values)).await {
            Ok(response) => {
                info!("form submitted");
                SubmitOutcome::Succeeded(response)
            }
            Err(err) => {
                warn!(status = ?err.status, error = %err, "form submission rejected");
                SubmitOutcome::Failed(err)
            }
        }
    }

    /// Snapshot for display.
    pub fn view(&self) -> FormView {
        let state = self.state();
        let inputs = self
            .fields
            .iter()
            .map(|f| InputView {
                name: f.name.clone(),
                label: f.label.clone(),
                kind: f.kind,
                value: state.values.get(&f.name).cloned().unwrap_or(Value::Null),
                error: state.errors.get(&f.name).cloned(),
                disabled: f.props.disabled,
                placeholder: f.props.placeholder.clone(),
                span: f.span,
            })
            .collect();
        FormView {
            inputs,
            submitting: self.is_submitting(),
        }
    }
}

impl std::fmt::Debug for FormEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormEngine")
            .field("fields", &self.fields)
            .field("schema", &self.schema)
            .field("submitting", &self.is_submitting())
            .finish()
    }
}
