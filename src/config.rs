use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::core::roster::source::{
    DEFAULT_INITIALS_URL, DEFAULT_PARTITION_URL_TEMPLATE, DEFAULT_TIMEOUT_SECS,
};
use crate::core::roster::{
    FileSource, HttpSource, PartitionKey, Result, RosterError, RosterSource,
    DEFAULT_CACHE_CAPACITY, DEFAULT_RESULT_CAP,
};

/// Prefix for environment overrides, e.g. `ROSTER_SEARCH__RESULT_CAP=50`.
pub const ENV_PREFIX: &str = "ROSTER_";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    File,
}

/// Where roster documents come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// URL with a `{year}` placeholder.
    pub partition_url_template: String,
    pub initials_url: String,
    /// Directory holding `<year>.json` and `pinyinTable.json` (file source).
    pub local_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    /// Partitions to load.
    pub partitions: Vec<PartitionKey>,
}

/// Search behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum results per query.
    pub result_cap: usize,
    /// Memoized queries; 0 disables the memo.
    pub cache_capacity: usize,
}

/// Logging output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
    /// Also write JSON logs to daily rolling files.
    pub file_logging: bool,
    /// Override the log directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Http,
            partition_url_template: DEFAULT_PARTITION_URL_TEMPLATE.to_string(),
            initials_url: DEFAULT_INITIALS_URL.to_string(),
            local_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            partitions: PartitionKey::ALL.to_vec(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            result_cap: DEFAULT_RESULT_CAP,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: None,
        }
    }
}

impl SourceConfig {
    /// Build the configured dataset source.
    pub fn build_source(&self) -> Result<Arc<dyn RosterSource>> {
        match self.kind {
            SourceKind::Http => Ok(Arc::new(HttpSource::new(
                self.partition_url_template.clone(),
                &self.initials_url,
                Duration::from_secs(self.timeout_secs),
            )?)),
            SourceKind::File => {
                let dir = self.local_dir.clone().ok_or_else(|| {
                    RosterError::Config("source.kind = \"file\" requires source.local_dir".to_string())
                })?;
                Ok(Arc::new(FileSource::new(dir)))
            }
        }
    }
}

impl AppConfig {
    /// Load from an explicit file (or `~/.config/roster-lookup/config.toml`),
    /// then environment
    /// overrides. Returns `Default` if the result is unparseable.
    pub fn load_from(path: Option<&Path>) -> Self {
        let config_path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path);

        if !config_path.exists() {
            log::debug!(
                "No config file at {}, using defaults and environment",
                config_path.display()
            );
        }

        match Self::figment(Toml::file(&config_path)).extract::<AppConfig>() {
            Ok(config) => {
                log::info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                log::warn!(
                    "Failed to parse config at {}: {e}, using defaults",
                    config_path.display()
                );
                Self::default()
            }
        }
    }

    /// Parse a TOML document layered over the defaults (no environment).
    pub fn from_toml_str(toml: &str) -> std::result::Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::string(toml))
            .extract()
    }

    fn figment(file: figment::providers::Data<Toml>) -> Figment {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Resolved data directory (logs live here).
    pub fn data_dir(&self) -> PathBuf {
        dirs::data_dir()
            .map(|d| d.join("roster-lookup"))
            .unwrap_or_else(|| PathBuf::from("data"))
    }

    /// Resolved log directory (override or under the data directory).
    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir().join("logs"))
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("roster-lookup").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}
