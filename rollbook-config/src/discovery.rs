//! Configuration file discovery
//!
//! Looks for `rollbook.{toml,yaml,yml,json}` in the global directory
//! (`~/.rollbook/`) and the project directory (`./.rollbook/`). Project files
//! take precedence over global ones.

use std::path::{Path, PathBuf};

use tracing::{debug, trace, warn};

/// Name of the configuration directory in both scopes.
pub const CONFIG_DIR_NAME: &str = ".rollbook";

const FILE_NAMES: [&str; 4] = [
    "rollbook.toml",
    "rollbook.yaml",
    "rollbook.yml",
    "rollbook.json",
];

/// A discovered configuration file
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub format: ConfigFormat,
    pub scope: ConfigScope,
}

/// Configuration file format detected from file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Where a file was found. Later scopes override earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ConfigScope {
    Global,
    Project,
}

/// File discovery service for finding configuration files
#[derive(Debug, Clone, Default)]
pub struct FileDiscovery {
    global_dir: Option<PathBuf>,
    project_dir: Option<PathBuf>,
}

impl FileDiscovery {
    /// Discovery rooted at the home directory and the current directory,
    /// resolved lazily in [`FileDiscovery::discover_all`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Discovery over explicit directories, mainly for tests and embedders.
    pub fn with_dirs(global_dir: Option<PathBuf>, project_dir: Option<PathBuf>) -> Self {
        Self {
            global_dir,
            project_dir,
        }
    }

    /// Discover all configuration files, lowest precedence first.
    pub fn discover_all(&self) -> Vec<ConfigFile> {
        let global_dir = self
            .global_dir
            .clone()
            .or_else(|| dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME)));
        let project_dir = self.project_dir.clone().or_else(|| {
            std::env::current_dir()
                .ok()
                .map(|d| d.join(CONFIG_DIR_NAME))
        });

        let mut files = Vec::new();
        if let Some(dir) = global_dir {
            files.extend(search_directory(&dir, ConfigScope::Global));
        }
        if let Some(dir) = project_dir {
            files.extend(search_directory(&dir, ConfigScope::Project));
        }
        files.sort_by_key(|f| f.scope);

        debug!("Discovered {} configuration files", files.len());
        files
    }
}

fn search_directory(dir: &Path, scope: ConfigScope) -> Vec<ConfigFile> {
    if !dir.exists() {
        trace!("Directory does not exist: {}", dir.display());
        return Vec::new();
    }
    if !dir.is_dir() {
        warn!("Path exists but is not a directory: {}", dir.display());
        return Vec::new();
    }

    FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let format = ConfigFormat::from_extension(path.extension()?.to_str()?)?;
            trace!("Found config: {} ({:?})", path.display(), format);
            Some(ConfigFile {
                path,
                format,
                scope,
            })
        })
        .collect()
}
