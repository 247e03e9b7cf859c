//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//! defaults < TOML config file < `DUPSCAN_*` environment variables < CLI flags.
//!
//! ```toml
//! # ~/.config/dupscan/config.toml
//! roots = ["/home/user/Photos"]
//! extensions = ["jpg", "png"]
//! key_fields = ["size", "hash"]
//! max_open_files = 32
//! ```

use anyhow::Result;
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::duplicates::{FinderConfig, KeyFields, KeyFieldsError, DEFAULT_CHANNEL_CAPACITY};
use crate::scanner::{DEFAULT_MAX_OPEN_FILES, PREFIX_CAP};

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "DUPSCAN_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories to scan. Empty means the current directory.
    pub roots: Vec<PathBuf>,
    /// Extension allow-list. Empty means every file.
    pub extensions: Vec<String>,
    /// Comparison key fields (`name`, `size`, `hash`). Empty means all.
    pub key_fields: Vec<String>,
    /// Maximum number of simultaneously open files and directories.
    pub max_open_files: usize,
    /// Number of leading bytes hashed per file.
    pub prefix_cap: u64,
    /// Walker threads, 0 for one per CPU.
    pub threads: usize,
    /// Capacity of the walker-to-collector channel.
    pub channel_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            extensions: Vec::new(),
            key_fields: Vec::new(),
            max_open_files: DEFAULT_MAX_OPEN_FILES,
            prefix_cap: PREFIX_CAP,
            threads: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    /// Load the configuration from the default platform-specific path.
    pub fn load() -> Self {
        Self::load_from_path(None)
    }

    /// Load the configuration, reading `path` instead of the default file
    /// when given.
    ///
    /// A missing file is not an error. An unreadable or invalid file is
    /// logged and defaults are used instead.
    pub fn load_from_path(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::config_path().ok(),
        };

        match Self::figment(path.as_deref(), ENV_PREFIX).extract() {
            Ok(config) => {
                log::debug!("Loaded configuration: {:?}", config);
                config
            }
            Err(e) => {
                log::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    fn figment(path: Option<&Path>, env_prefix: &str) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            log::trace!("Reading config file {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(env_prefix))
    }

    /// Write the configuration as TOML to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default platform-specific configuration path.
    pub fn config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("com", "dupscan", "dupscan")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;
        Ok(project_dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line flags on top of the loaded values.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if !cli.dirs.is_empty() {
            self.roots = cli.dirs.clone();
        }
        if !cli.types.is_empty() {
            self.extensions = cli.types.clone();
        }
        if !cli.compare.is_empty() {
            self.key_fields = cli.compare.clone();
        }
        if let Some(max) = cli.max_open_files {
            self.max_open_files = max;
        }
        if let Some(threads) = cli.threads {
            self.threads = threads;
        }
        if let Some(cap) = cli.prefix_cap {
            self.prefix_cap = cap;
        }
    }

    /// Directories to scan, falling back to the current directory.
    #[must_use]
    pub fn scan_roots(&self) -> Vec<PathBuf> {
        if self.roots.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            self.roots.clone()
        }
    }

    /// Build the finder configuration.
    ///
    /// # Errors
    ///
    /// Returns [`KeyFieldsError`] if `key_fields` names an unknown field.
    pub fn to_finder_config(&self) -> Result<FinderConfig, KeyFieldsError> {
        let key_fields = KeyFields::parse_list(&self.key_fields)?;
        Ok(FinderConfig::default()
            .with_max_open_files(self.max_open_files)
            .with_prefix_cap(self.prefix_cap)
            .with_threads(self.threads)
            .with_channel_capacity(self.channel_capacity)
            .with_extensions(&self.extensions)
            .with_key_fields(key_fields))
    }
}
