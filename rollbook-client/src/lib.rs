//! # Rollbook Client
//!
//! A `reqwest` based client for the school management REST API, plus adapters
//! that plug its endpoints into tables, forms and action buttons:
//!
//! - [`RestResource`] implements `QueryApi`
//! - [`CreateAction`] and [`UpdateAction`] implement `SubmitAction`
//! - [`DeleteAction`] implements `ConfirmAction`
//!
//! ```no_run
//! # async fn demo() -> rollbook_client::Result<()> {
//! use rollbook_client::RestClient;
//! use rollbook_common::SessionContext;
//!
//! let config = rollbook_config::ApiConfig::default();
//! let session = SessionContext::anonymous().with_token("secret");
//! let client = RestClient::new(&config)?.with_session(&session);
//! let rows = client.resource("class-groups").list(&Default::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod client;
pub mod error;

pub use actions::{CreateAction, DeleteAction, UpdateAction};
pub use client::{RestClient, RestResource};
pub use error::{ClientError, Result};
