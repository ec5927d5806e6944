//! # Rollbook
//!
//! Building blocks for data-management dashboards: declare columns, inputs
//! and validation rules, and Rollbook renders tables, runs forms inside
//! modals and drawers, and keeps cached row sets in step with mutations.
//!
//! The crates, leaf to root:
//!
//! - [`fields`]: renders a value of a declared kind into a view
//! - [`forms`]: form state, validation and guarded submission
//! - [`table`]: cached, filterable, paginated tables
//! - [`overlay`]: modals, drawers and confirmation buttons
//! - [`client`]: REST collaborators for all of the above
//!
//! This crate adds page-level composition: [`ResourcePage`] wires a table to
//! create, edit and delete overlays, and [`RoleScopedQuery`] picks a row
//! source from the [`SessionContext`](common::SessionContext).

pub use rollbook_client as client;
pub use rollbook_common as common;
pub use rollbook_config as config;
pub use rollbook_fields as fields;
pub use rollbook_forms as forms;
pub use rollbook_overlay as overlay;
pub use rollbook_table as table;

pub mod page;
pub mod params;
pub mod scope;

pub use page::{
    ModalForm, PageEvent, PageMessages, ResourcePage, ResourcePageBuilder, RowActions, RowDelete,
};
pub use params::PageParams;
pub use scope::{RoleScopedQuery, Scope};
