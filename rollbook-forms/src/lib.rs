//! Declarative forms
//!
//! A [`FormEngine`] is built from [`FormFieldDescriptor`]s, a
//! [`ValidationSchema`], default values and a [`SubmitAction`]. It owns the
//! current values and field errors, loads select options through
//! [`OptionSource`]s, and reports each submission as a [`SubmitOutcome`].
//!
//! Only one submission runs at a time per engine; a second `submit` while one
//! is pending returns [`SubmitOutcome::Ignored`] without calling the action.

pub mod engine;
pub mod error;
pub mod input;
pub mod source;
pub mod validation;

pub use engine::{FormBuilder, FormEngine, FormView, InputView, SubmitOutcome};
pub use error::{FormError, Result};
pub use input::{ChangeHook, FieldProps, FormFieldDescriptor, InputKind};
pub use source::{FnOptions, FnSubmit, OptionSource, SubmitAction};
pub use validation::{FieldErrors, Rule, ValidationSchema, ValueType};
