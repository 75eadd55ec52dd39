//! Configuration management for pocketbook
//!
//! This module handles loading, validation, and management of
//! pocketbook configuration from YAML files. It also owns the small
//! preset enumerations (time range, sort key, sort order) that are
//! shared between the configuration file and the query engine.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use error::{ConfigError, ConfigResult};

// ==================== Shared Enumerations ====================

/// Time range preset
///
/// Custom ranges carry their own dates and are expressed by the engine's
/// `DateRange`; the preset only names the calendar-relative windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    /// No date restriction
    All,
    /// Current local calendar day
    Today,
    /// Current week, starting Monday
    Week,
    /// Current month
    Month,
    /// Current calendar quarter
    Quarter,
    /// Current year
    Year,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::All
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(TimeRange::All),
            "today" => Ok(TimeRange::Today),
            "week" => Ok(TimeRange::Week),
            "month" => Ok(TimeRange::Month),
            "quarter" => Ok(TimeRange::Quarter),
            "year" => Ok(TimeRange::Year),
            _ => Err(format!("Invalid time range: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeRange::All => f.pad("all"),
            TimeRange::Today => f.pad("today"),
            TimeRange::Week => f.pad("week"),
            TimeRange::Month => f.pad("month"),
            TimeRange::Quarter => f.pad("quarter"),
            TimeRange::Year => f.pad("year"),
        }
    }
}

/// Field a transaction list is ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Full timestamp
    Date,
    /// Amount magnitude
    Amount,
    /// Short display title
    #[serde(alias = "description")]
    Title,
    /// Category label
    Category,
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::Date
    }
}

impl std::str::FromStr for SortKey {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "amount" => Ok(SortKey::Amount),
            "title" | "description" => Ok(SortKey::Title),
            "category" => Ok(SortKey::Category),
            _ => Err(format!("Invalid sort key: {}", s)),
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortKey::Date => f.pad("date"),
            SortKey::Amount => f.pad("amount"),
            SortKey::Title => f.pad("title"),
            SortKey::Category => f.pad("category"),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Descending
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            _ => Err(format!("Invalid sort order: {}", s)),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => f.pad("asc"),
            SortOrder::Descending => f.pad("desc"),
        }
    }
}

// ==================== Configuration Types ====================

/// Data location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Path to the JSON snapshot of transactions and pockets
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("./data/snapshot.json")
}

/// Defaults applied when a query does not specify them
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueryConfig {
    #[serde(default)]
    pub default_range: TimeRange,
    #[serde(default)]
    pub default_sort: SortKey,
    #[serde(default)]
    pub default_order: SortOrder,
}

/// Export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory export files are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Include the transaction section by default
    #[serde(default = "default_true")]
    pub include_transactions: bool,
    /// Include the pocket section by default
    #[serde(default = "default_true")]
    pub include_pockets: bool,
    /// Include the aggregate report section by default
    #[serde(default = "default_false")]
    pub include_reports: bool,
    /// CSV field delimiter
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            include_transactions: true,
            include_pockets: true,
            include_reports: false,
            delimiter: default_delimiter(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./exports")
}

fn default_delimiter() -> char {
    ','
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

/// Number and name formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Currency code shown next to amounts
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Pocket names longer than this are shortened for display
    #[serde(default = "default_name_max_chars")]
    pub name_max_chars: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            decimal_places: default_decimal_places(),
            name_max_chars: default_name_max_chars(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_name_max_chars() -> usize {
    24
}

/// Local time settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TimeConfig {
    /// Fixed UTC offset in minutes; the system offset is used when absent
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Data location
    #[serde(default)]
    pub data: DataConfig,
    /// Query defaults
    #[serde(default)]
    pub query: QueryConfig,
    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Display settings
    #[serde(default)]
    pub display: DisplayConfig,
    /// Local time settings
    #[serde(default)]
    pub time: TimeConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.display.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "display.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        if self.display.name_max_chars < 4 {
            return Err(ConfigError::InvalidValue {
                field: "display.name_max_chars".to_string(),
                reason: "Name width must be at least 4 characters".to_string(),
            });
        }

        if !self.export.delimiter.is_ascii() || self.export.delimiter.is_ascii_alphanumeric() {
            return Err(ConfigError::InvalidValue {
                field: "export.delimiter".to_string(),
                reason: "Delimiter must be a single ASCII punctuation or whitespace character"
                    .to_string(),
            });
        }

        if let Some(offset) = self.time.utc_offset_minutes {
            if !(-1439..=1439).contains(&offset) {
                return Err(ConfigError::InvalidValue {
                    field: "time.utc_offset_minutes".to_string(),
                    reason: "Offset must be between -1439 and 1439 minutes".to_string(),
                });
            }
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "logging.level".to_string(),
                reason: format!("Log level must be one of: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }
}

// ==================== Tests ====================
