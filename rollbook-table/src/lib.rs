//! # Rollbook Table
//!
//! A [`TableEngine`] fetches rows through a [`QueryApi`], renders each column
//! with the field renderer, and pages the result client-side.
//!
//! Row sets are cached in a [`QueryCache`] under a [`SourceKey`]. Anything that
//! mutates the underlying data (a form submission, a delete) calls
//! [`QueryCache::invalidate`]; every engine sharing the key refetches on its
//! next render, and subscribers receive a [`CacheEvent`].

pub mod cache;
pub mod engine;
pub mod error;
pub mod filter;
pub mod query;

pub use cache::{CacheEvent, FetchTicket, QueryCache, SourceKey};
pub use engine::{ColumnHeader, TableBuilder, TableEngine, TableRow, TableView};
pub use error::{Result, TableError};
pub use filter::{Comparator, FilterCondition, FilterDescriptor, QueryParams};
pub use query::{FnQuery, QueryApi, StaticRows};
