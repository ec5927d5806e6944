//! Rollbook configuration management using Figment
//!
//! Configuration is merged from, in increasing precedence:
//!
//! - built-in defaults ([`RollbookConfig::default`])
//! - `~/.rollbook/rollbook.{toml,yaml,yml,json}`
//! - `./.rollbook/rollbook.{toml,yaml,yml,json}`
//! - `ROLLBOOK_` environment variables, `__` separating nested keys
//!
//! ```no_run
//! let config = rollbook_config::load_configuration()?;
//! println!("page size: {}", config.table.page_size);
//! # Ok::<(), rollbook_config::ConfigError>(())
//! ```
//!
//! ## Example TOML
//!
//! ```toml
//! [display]
//! time_date = "%Y-%m-%d"
//! utc_offset_minutes = 420
//!
//! [messages]
//! required = "Please enter {label}"
//!
//! [table]
//! page_size = 20
//!
//! [api]
//! base_url = "https://school.example.com/api"
//! ```

pub mod discovery;
pub mod error;
pub mod provider;
pub mod types;

pub use discovery::{ConfigFile, ConfigFormat, ConfigScope, FileDiscovery};
pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{ApiConfig, DisplayConfig, MessageTemplates, RollbookConfig, TableConfig};

/// Load configuration from all default sources.
pub fn load_configuration() -> ConfigResult<RollbookConfig> {
    ConfigProvider::new().load()
}
