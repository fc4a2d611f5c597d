//! # Counter Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     QUEUEBILL_DB_PATH=/srv/queuebill/bills.db                          │
//! │     QUEUEBILL_RESTAURANT_NAME="Pad Thai Corner"                        │
//! │     QUEUEBILL_TIMEZONE=+07:00                                          │
//! │     QUEUEBILL_PRINT_DIR=/tmp/bills                                     │
//! │     QUEUEBILL_PRINT_COMMAND="lp -o landscape"                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/queuebill/counter.toml (Linux)                           │
//! │     ~/Library/Application Support/com.queuebill.queuebill/counter.toml │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # counter.toml
//! [restaurant]
//! name = "ผัดไทยโบราณหญิงเรือง"
//! labels = "thai"          # thai | english
//!
//! [store]
//! backend = "sqlite"       # sqlite | memory
//! database_path = "/srv/queuebill/bills.db"
//! max_connections = 5
//! lookback = 20
//!
//! [queue]
//! timezone = "+07:00"      # local | utc | ±HH:MM
//!
//! [history]
//! count = 8
//!
//! [print]
//! output_dir = "/tmp/queuebill"
//! command = "lp -o landscape"
//! preview_scale = 0.45
//! line_style = "blank"     # blank | dotted
//! show_issued_at = false
//! text_width = 30
//! ```

use std::path::PathBuf;

use directories::ProjectDirs;
use queuebill_core::receipt::text::DEFAULT_WIDTH;
use queuebill_core::receipt::{LineStyle, ReceiptLabels, ReceiptOptions, DEFAULT_PREVIEW_SCALE};
use queuebill_core::validation::validate_count;
use queuebill_core::{OperatingZone, DEFAULT_HISTORY_COUNT, DEFAULT_LOOKBACK};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

const CONFIG_FILE: &str = "counter.toml";
const DATABASE_FILE: &str = "queuebill.db";

// =============================================================================
// Sections
// =============================================================================

/// Which fixed text goes on the receipts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSet {
    #[default]
    Thai,
    English,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantConfig {
    /// Printed at the top of every bill.
    #[serde(default = "default_restaurant_name")]
    pub name: String,

    #[serde(default)]
    pub labels: LabelSet,
}

fn default_restaurant_name() -> String {
    ReceiptLabels::default().restaurant_name
}

impl Default for RestaurantConfig {
    fn default() -> Self {
        RestaurantConfig {
            name: default_restaurant_name(),
            labels: LabelSet::default(),
        }
    }
}

/// Where bills are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Database file, survives restarts.
    #[default]
    Sqlite,
    /// Process memory, gone on exit. For dry runs.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Recent bills scanned when resuming the queue.
    #[serde(default = "default_lookback")]
    pub lookback: u32,
}

fn default_max_connections() -> u32 {
    5
}

fn default_lookback() -> u32 {
    DEFAULT_LOOKBACK
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            backend: StoreBackend::default(),
            database_path: None,
            max_connections: default_max_connections(),
            lookback: default_lookback(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    /// `local`, `utc` or a fixed offset such as `+07:00`.
    #[serde(default = "default_timezone")]
    pub timezone: String,
}

fn default_timezone() -> String {
    "local".to_string()
}

impl Default for QueueSettings {
    fn default() -> Self {
        QueueSettings {
            timezone: default_timezone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySettings {
    #[serde(default = "default_history_count")]
    pub count: u32,
}

fn default_history_count() -> u32 {
    DEFAULT_HISTORY_COUNT
}

impl Default for HistorySettings {
    fn default() -> Self {
        HistorySettings {
            count: default_history_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintSettings {
    /// Where print pages are written. Defaults to the platform data directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Launched with the page path appended, e.g. `lp -o landscape`.
    #[serde(default)]
    pub command: Option<String>,

    #[serde(default = "default_preview_scale")]
    pub preview_scale: f64,

    #[serde(default)]
    pub line_style: LineStyle,

    #[serde(default)]
    pub show_issued_at: bool,

    /// Column width of the terminal preview.
    #[serde(default = "default_text_width")]
    pub text_width: usize,
}

fn default_preview_scale() -> f64 {
    DEFAULT_PREVIEW_SCALE
}

fn default_text_width() -> usize {
    DEFAULT_WIDTH
}

impl Default for PrintSettings {
    fn default() -> Self {
        PrintSettings {
            output_dir: None,
            command: None,
            preview_scale: default_preview_scale(),
            line_style: LineStyle::default(),
            show_issued_at: false,
            text_width: default_text_width(),
        }
    }
}

// =============================================================================
// Counter Config
// =============================================================================

/// Complete counter configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CounterConfig {
    #[serde(default)]
    pub restaurant: RestaurantConfig,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub queue: QueueSettings,

    #[serde(default)]
    pub history: HistorySettings,

    #[serde(default)]
    pub print: PrintSettings,
}

impl CounterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (counter.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let explicit = config_path.is_some();
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading counter config from file");
                config = Self::from_toml(&std::fs::read_to_string(&path)?)?;
            } else if explicit {
                return Err(ConfigError::LoadFailed(format!(
                    "{} does not exist",
                    path.display()
                )));
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a config file body. Missing sections take their defaults.
    pub fn from_toml(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        for (field, count) in [
            ("store.lookback", self.store.lookback),
            ("store.max_connections", self.store.max_connections),
            ("history.count", self.history.count),
        ] {
            validate_count(field, count).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }

        if !(self.print.preview_scale > 0.0 && self.print.preview_scale.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "print.preview_scale must be positive, got {}",
                self.print.preview_scale
            )));
        }

        if let Some(command) = &self.print.command {
            if command.trim().is_empty() {
                return Err(ConfigError::Invalid("print.command is empty".into()));
            }
        }

        self.zone()?;
        Ok(())
    }

    /// Applies `QUEUEBILL_*` environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("QUEUEBILL_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = Some(PathBuf::from(path));
        }

        if let Some(name) = lookup("QUEUEBILL_RESTAURANT_NAME") {
            self.restaurant.name = name;
        }

        if let Some(zone) = lookup("QUEUEBILL_TIMEZONE") {
            if zone.parse::<OperatingZone>().is_ok() {
                debug!(zone = %zone, "Overriding time zone from environment");
                self.queue.timezone = zone;
            } else {
                warn!(zone = %zone, "Unknown time zone in environment");
            }
        }

        if let Some(dir) = lookup("QUEUEBILL_PRINT_DIR") {
            self.print.output_dir = Some(PathBuf::from(dir));
        }

        if let Some(command) = lookup("QUEUEBILL_PRINT_COMMAND") {
            debug!(command = %command, "Overriding print command from environment");
            self.print.command = Some(command).filter(|c| !c.trim().is_empty());
        }
    }

    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "queuebill", "queuebill")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// The operating time zone.
    pub fn zone(&self) -> ConfigResult<OperatingZone> {
        self.queue
            .timezone
            .parse()
            .map_err(|e: queuebill_core::CoreError| ConfigError::Invalid(e.to_string()))
    }

    /// Configured database path, or the platform data directory.
    pub fn database_path(&self) -> PathBuf {
        self.store.database_path.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE))
                .unwrap_or_else(|| PathBuf::from(DATABASE_FILE))
        })
    }

    /// Configured print directory, or `prints/` in the platform data directory.
    pub fn output_dir(&self) -> PathBuf {
        self.print.output_dir.clone().unwrap_or_else(|| {
            Self::project_dirs()
                .map(|dirs| dirs.data_dir().join("prints"))
                .unwrap_or_else(|| std::env::temp_dir().join("queuebill"))
        })
    }

    /// Receipt presentation from the `[restaurant]` and `[print]` sections.
    pub fn receipt_options(&self) -> ReceiptOptions {
        let labels = match self.restaurant.labels {
            LabelSet::Thai => ReceiptLabels {
                restaurant_name: self.restaurant.name.clone(),
                ..ReceiptLabels::default()
            },
            LabelSet::English => ReceiptLabels::english(self.restaurant.name.clone()),
        };

        ReceiptOptions {
            labels,
            line_style: self.print.line_style,
            show_issued_at: self.print.show_issued_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CounterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.store.lookback, 20);
        assert_eq!(config.history.count, 8);
        assert_eq!(config.print.preview_scale, 0.45);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(config.zone().unwrap(), OperatingZone::Local);
    }

    #[test]
    fn test_partial_file() {
        let config = CounterConfig::from_toml(
            r#"
            [restaurant]
            name = "Pad Thai Corner"
            labels = "english"

            [queue]
            timezone = "+07:00"

            [print]
            line_style = "dotted"
            show_issued_at = true
            "#,
        )
        .unwrap();

        assert_eq!(config.history.count, 8);
        assert_eq!(
            config.zone().unwrap(),
            OperatingZone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap())
        );
        let options = config.receipt_options();
        assert_eq!(options.labels.restaurant_name, "Pad Thai Corner");
        assert_eq!(options.labels.table_label, "TABLE");
        assert_eq!(options.line_style, LineStyle::Dotted);
        assert!(options.show_issued_at);
    }

    #[test]
    fn test_thai_labels_keep_custom_name() {
        let mut config = CounterConfig::default();
        config.restaurant.name = "ร้านทดสอบ".to_string();
        let labels = config.receipt_options().labels;
        assert_eq!(labels.restaurant_name, "ร้านทดสอบ");
        assert_eq!(labels.currency_unit, "บาท");
    }

    #[test]
    fn test_validation() {
        let mut config = CounterConfig::default();
        config.store.lookback = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid configuration: store.lookback must be positive");

        let mut config = CounterConfig::default();
        config.store.max_connections = 0;
        assert!(config.validate().is_err());

        let mut config = CounterConfig::default();
        config.history.count = 0;
        assert!(config.validate().is_err());

        let mut config = CounterConfig::default();
        config.print.preview_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = CounterConfig::default();
        config.queue.timezone = "Mars/Olympus".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("QUEUEBILL_DB_PATH", "/srv/bills.db"),
            ("QUEUEBILL_RESTAURANT_NAME", "Night Market"),
            ("QUEUEBILL_TIMEZONE", "utc"),
            ("QUEUEBILL_PRINT_DIR", "/tmp/bills"),
            ("QUEUEBILL_PRINT_COMMAND", "lp -o landscape"),
        ]
        .into_iter()
        .collect();

        let mut config = CounterConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/srv/bills.db"));
        assert_eq!(config.restaurant.name, "Night Market");
        assert_eq!(config.zone().unwrap(), OperatingZone::utc());
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/bills"));
        assert_eq!(config.print.command.as_deref(), Some("lp -o landscape"));
    }

    #[test]
    fn test_bad_timezone_override_is_ignored() {
        let mut config = CounterConfig::default();
        config.apply_overrides(|key| (key == "QUEUEBILL_TIMEZONE").then(|| "nowhere".to_string()));
        assert_eq!(config.queue.timezone, "local");
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = CounterConfig::load(Some(dir.path().join("missing.toml")));
        assert!(matches!(result, Err(ConfigError::LoadFailed(_))));
    }
}
