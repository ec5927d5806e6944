//! # Rollbook Common
//!
//! Foundational types shared by every Rollbook crate:
//!
//! - [`record`] - dotted-path lookup and raw display of JSON records
//! - [`option`] - the `{id, label, value}` option shape returned by lookups
//! - [`error`] - [`ApiError`] and the severity classification
//! - [`session`] - the explicit [`SessionContext`] passed into page composition
//! - [`notification`] - typed notifications replacing toasts
//! - [`logging`] - helpers for structured log output
//! - [`sort`] - the sort direction shared by tables and clients

pub mod error;
pub mod logging;
pub mod notification;
pub mod option;
pub mod record;
pub mod session;
pub mod sort;

pub use error::{ApiError, ErrorSeverity, Severity};
pub use logging::Pretty;
pub use notification::{Notification, NotificationLevel};
pub use option::EnumOption;
pub use record::{display_raw, loose_eq, value_at, Record};
pub use session::{Role, SessionContext};
pub use sort::SortOrder;
