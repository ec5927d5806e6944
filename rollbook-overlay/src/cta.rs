//! Call-to-action buttons with an optional confirmation step.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use rollbook_common::{ApiError, Notification};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{OverlayError, Result};

pub const DEFAULT_CONFIRM_MESSAGE: &str = "Are you sure you want to do this?";

/// The work a CTA performs, such as a delete request.
#[async_trait]
pub trait ConfirmAction: Send + Sync {
    async fn run(&self) -> std::result::Result<Value, ApiError>;
}

/// Adapts an async closure into a [`ConfirmAction`].
pub struct FnAction<F>(pub F);

#[async_trait]
impl<F, Fut> ConfirmAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = std::result::Result<Value, ApiError>> + Send,
{
    async fn run(&self) -> std::result::Result<Value, ApiError> {
        (self.0)().await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CtaOutcome {
    Succeeded(Value),
    Failed(ApiError),
    /// The user declined the confirmation; nothing ran.
    Declined,
    /// The action was already running.
    Ignored,
}

impl CtaOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CtaOutcome::Succeeded(_))
    }

    pub fn notification(&self, success_message: &str) -> Option<Notification> {
        match self {
            CtaOutcome::Succeeded(_) => Some(Notification::success(success_message)),
            CtaOutcome::Failed(err) => Some(Notification::from_error(err)),
            CtaOutcome::Declined | CtaOutcome::Ignored => None,
        }
    }
}

/// What pressing the button did.
#[derive(Debug, Clone, PartialEq)]
pub enum CtaTrigger {
    /// Show this message and wait for [`Cta::confirm`] or [`Cta::decline`].
    NeedsConfirmation(String),
    /// No confirmation was required; the action ran.
    Completed(CtaOutcome),
}

/// Clears the running flag when the action ends or is dropped.
struct Running<'a>(&'a AtomicBool);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A button around a [`ConfirmAction`].
pub struct Cta {
    label: String,
    confirm_message: Option<String>,
    action: Arc<dyn ConfirmAction>,
    awaiting_confirmation: AtomicBool,
    in_flight: AtomicBool,
}

impl Cta {
    pub fn new(label: impl Into<String>, action: impl ConfirmAction + 'static) -> Self {
        Self::with_action(label, Arc::new(action))
    }

    pub fn with_action(label: impl Into<String>, action: Arc<dyn ConfirmAction>) -> Self {
        Self {
            label: label.into(),
            confirm_message: None,
            action,
            awaiting_confirmation: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Require confirmation with a custom message.
    pub fn confirm_with(mut self, message: impl Into<String>) -> Self {
        self.confirm_message = Some(message.into());
        self
    }

    /// Require confirmation with the default message.
    pub fn confirmed(self) -> Self {
        self.confirm_with(DEFAULT_CONFIRM_MESSAGE)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_awaiting_confirmation(&self) -> bool {
        self.awaiting_confirmation.load(Ordering::Acquire)
    }

    pub async fn trigger(&self) -> CtaTrigger {
        match &self.confirm_message {
            Some(message) => {
                self.awaiting_confirmation.store(true, Ordering::Release);
                CtaTrigger::NeedsConfirmation(message.clone())
            }
            None => CtaTrigger::Completed(self.execute().await),
        }
    }

    /// Accept the pending confirmation and run the action once.
    pub async fn confirm(&self) -> Result<CtaOutcome> {
        if !self.awaiting_confirmation.swap(false, Ordering::AcqRel) {
            return Err(OverlayError::nothing_to_confirm(&self.label));
        }
        Ok(self.execute().await)
    }

    pub fn decline(&self) -> CtaOutcome {
        self.awaiting_confirmation.store(false, Ordering::Release);
        debug!(label = %self.label, "confirmation declined");
        CtaOutcome::Declined
    }

    async fn execute(&self) -> CtaOutcome {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            debug!(label = %self.label, "action already running");
            return CtaOutcome::Ignored;
        }
        let result = {
            let _running = Running(&self.in_flight);
            self.action.run().await
        };
        match result {
            Ok(value) => {
                info!(label = %self.label, "action succeeded");
                CtaOutcome::Succeeded(value)
            }
            Err(err) => {
                warn!(label = %self.label, error = %err, "action failed");
                CtaOutcome::Failed(err)
            }
        }
    }
}

impl std::fmt::Debug for Cta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cta")
            .field("label", &self.label)
            .field("confirm_message", &self.confirm_message)
            .field("awaiting_confirmation", &self.is_awaiting_confirmation())
            .finish()
    }
}
