//! Overlay wrappers
//!
//! - [`Overlay`]: a modal or drawer with its own open state. Content is built
//!   with a [`CloseHandle`] so nested forms can close their container.
//! - [`Cta`]: a call-to-action button around a [`ConfirmAction`], optionally
//!   guarded by a confirmation step.

pub mod cta;
pub mod error;
pub mod overlay;

pub use cta::{ConfirmAction, Cta, CtaOutcome, CtaTrigger, FnAction, DEFAULT_CONFIRM_MESSAGE};
pub use error::{OverlayError, Result};
pub use overlay::{CloseHandle, Overlay, OverlayKind};
