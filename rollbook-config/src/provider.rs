//! Configuration provider using Figment

use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use tracing::{debug, info, trace};

use crate::discovery::{ConfigFile, ConfigFormat, FileDiscovery};
use crate::error::ConfigResult;
use crate::types::RollbookConfig;

/// Environment variable prefix. `__` separates nested keys, so
/// `ROLLBOOK_TABLE__PAGE_SIZE=25` sets `table.page_size`.
pub const ENV_PREFIX: &str = "ROLLBOOK_";

/// Loads [`RollbookConfig`] from every source in precedence order.
///
/// No caching is performed; each call reads the sources again.
#[derive(Debug, Clone, Default)]
pub struct ConfigProvider {
    discovery: FileDiscovery,
}

impl ConfigProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific discovery (explicit directories).
    pub fn with_discovery(discovery: FileDiscovery) -> Self {
        Self { discovery }
    }

    /// Load and validate the configuration.
    pub fn load(&self) -> ConfigResult<RollbookConfig> {
        let config: RollbookConfig = self.build_figment().extract()?;
        config.validate()?;
        info!(
            page_size = config.table.page_size,
            base_url = %config.api.base_url,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Sources, later overriding earlier:
    /// 1. Serialized defaults
    /// 2. Discovered files (global, then project)
    /// 3. `ROLLBOOK_` environment variables
    fn build_figment(&self) -> Figment {
        debug!("Building figment configuration with precedence order");

        let mut figment = Figment::from(Serialized::defaults(RollbookConfig::default()));
        for file in self.discovery.discover_all() {
            trace!("Merging config file: {}", file.path.display());
            figment = figment.merge(file_provider(&file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

fn file_provider(file: &ConfigFile) -> Figment {
    match file.format {
        ConfigFormat::Toml => Figment::from(Toml::file(&file.path)),
        ConfigFormat::Yaml => Figment::from(Yaml::file(&file.path)),
        ConfigFormat::Json => Figment::from(Json::file(&file.path)),
    }
}
