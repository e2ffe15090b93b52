//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (merged with the argument by the binary's CLI parser)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing config file is not an error. The dashboard starts on defaults and
//! logs a warning.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_COLLECTION: &str = "tweets";
pub const DEFAULT_MAX_RECORDS: usize = 1_000_000;
pub const DEFAULT_PREVIEW_LIMIT: usize = 20;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub collection: Option<String>,
    pub max_records: Option<usize>,
    pub preview_limit: Option<usize>,
    pub log_level: Option<String>,
    #[serde(default)]
    pub chart: ChartToml,
}

/// `[chart]` table of `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChartToml {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub wordcloud_width: Option<u32>,
    pub wordcloud_height: Option<u32>,
    pub font_path: Option<PathBuf>,
    pub max_words: Option<usize>,
    pub min_font_size: Option<u32>,
    pub max_font_size: Option<u32>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub database_path: Option<PathBuf>,
    pub collection: Option<String>,
    pub max_records: Option<usize>,
    pub preview_limit: Option<usize>,
    pub log_level: Option<String>,
    pub font_path: Option<PathBuf>,
}

/// Chart rendering settings
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    /// Canvas size of the bar and line charts
    pub width: u32,
    pub height: u32,
    /// Canvas size of the word cloud
    pub wordcloud_width: u32,
    pub wordcloud_height: u32,
    /// TrueType font for chart text; `None` probes well-known system paths
    pub font_path: Option<PathBuf>,
    /// Most frequent words kept in the word cloud
    pub max_words: usize,
    pub min_font_size: u32,
    pub max_font_size: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
            wordcloud_width: 1000,
            wordcloud_height: 500,
            font_path: None,
            max_words: 200,
            min_font_size: 10,
            max_font_size: 96,
        }
    }
}

/// Fully resolved dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub bind_address: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub collection: String,
    /// Cap on records per aggregation call
    pub max_records: usize,
    /// Rows shown before "Show all"
    pub preview_limit: usize,
    pub log_level: String,
    pub chart: ChartConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            database_path: default_database_path(),
            collection: DEFAULT_COLLECTION.to_string(),
            max_records: DEFAULT_MAX_RECORDS,
            preview_limit: DEFAULT_PREVIEW_LIMIT,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            chart: ChartConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Merge overrides over the TOML file over compiled defaults, then validate
    pub fn resolve(file: TomlConfig, overrides: ConfigOverrides) -> Result<Self> {
        let defaults = Self::default();
        let chart_defaults = ChartConfig::default();

        let config = Self {
            bind_address: overrides
                .bind_address
                .or(file.bind_address)
                .unwrap_or(defaults.bind_address),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            collection: overrides
                .collection
                .or(file.collection)
                .unwrap_or(defaults.collection),
            max_records: overrides
                .max_records
                .or(file.max_records)
                .unwrap_or(defaults.max_records),
            preview_limit: overrides
                .preview_limit
                .or(file.preview_limit)
                .unwrap_or(defaults.preview_limit),
            log_level: overrides
                .log_level
                .or(file.log_level)
                .unwrap_or(defaults.log_level),
            chart: ChartConfig {
                width: file.chart.width.unwrap_or(chart_defaults.width),
                height: file.chart.height.unwrap_or(chart_defaults.height),
                wordcloud_width: file
                    .chart
                    .wordcloud_width
                    .unwrap_or(chart_defaults.wordcloud_width),
                wordcloud_height: file
                    .chart
                    .wordcloud_height
                    .unwrap_or(chart_defaults.wordcloud_height),
                font_path: overrides.font_path.or(file.chart.font_path),
                max_words: file.chart.max_words.unwrap_or(chart_defaults.max_words),
                min_font_size: file
                    .chart
                    .min_font_size
                    .unwrap_or(chart_defaults.min_font_size),
                max_font_size: file
                    .chart
                    .max_font_size
                    .unwrap_or(chart_defaults.max_font_size),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the dashboard cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_records == 0 {
            return Err(Error::Config("max_records must be at least 1".to_string()));
        }
        if self.preview_limit == 0 {
            return Err(Error::Config("preview_limit must be at least 1".to_string()));
        }
        if self.collection.trim().is_empty() {
            return Err(Error::Config("collection must not be empty".to_string()));
        }

        let chart = &self.chart;
        if chart.width == 0 || chart.height == 0 {
            return Err(Error::Config("chart width and height must be non-zero".to_string()));
        }
        if chart.wordcloud_width == 0 || chart.wordcloud_height == 0 {
            return Err(Error::Config(
                "chart wordcloud_width and wordcloud_height must be non-zero".to_string(),
            ));
        }
        if chart.max_words == 0 {
            return Err(Error::Config("chart max_words must be at least 1".to_string()));
        }
        if chart.min_font_size == 0 || chart.min_font_size > chart.max_font_size {
            return Err(Error::Config(format!(
                "chart font sizes must satisfy 0 < min ({}) <= max ({})",
                chart.min_font_size, chart.max_font_size
            )));
        }
        Ok(())
    }

    /// `host:port` string for the listener
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Read configuration from `explicit` or the default config file location
///
/// An explicitly named file must exist. The default location may be absent.
pub fn load(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<DashboardConfig> {
    let file = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            load_toml_config(path)?
        }
        None => match default_config_file() {
            Some(path) => load_toml_config(&path)?,
            None => {
                warn!("No config file found, using defaults");
                TomlConfig::default()
            }
        },
    };

    DashboardConfig::resolve(file, overrides)
}

/// Parse one TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Parse TOML failed for {}: {}", path.display(), e))
    })?;
    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// First existing config file among the platform locations
///
/// `~/.config/twsa/config.toml`, then `/etc/twsa/config.toml` on Linux.
pub fn default_config_file() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("twsa").join("config.toml"));
    if let Some(path) = user_config.filter(|p| p.exists()) {
        return Some(path);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/twsa/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }
    None
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("twsa")
        .join("twsa.db")
}
