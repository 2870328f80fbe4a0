//! TOML-based configuration for Prism.
//!
//! Supports a config file (prism.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [log]
//! level = "info"
//!
//! [fields]
//! default_field = "log"
//! time_field = "dtEventTimeStamp"
//! time_type = "int"
//! time_unit = "millisecond"
//! value_field = "${PRISM_VALUE_FIELD}"
//!
//! [sql]
//! dialect = "doris"
//!
//! [document]
//! size = 10000
//! query_string_fields = ["*", "__*"]
//!
//! [reference]
//! forbidden_clusters = [["vm_cluster_1", "vm_cluster_2"]]
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ir::{TimeField, TimeFieldType, TimeUnit};
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Logging configuration.
    pub log: LogSettings,

    /// Well-known field names.
    pub fields: FieldSettings,

    /// SQL backend configuration.
    pub sql: SqlSettings,

    /// Document-store configuration.
    pub document: DocumentSettings,

    /// Remote time-series reference merging.
    pub reference: ReferenceSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Field naming configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldSettings {
    /// Field that un-prefixed query-string terms bind to.
    pub default_field: String,

    /// Time field name.
    pub time_field: String,

    /// Time field storage type.
    pub time_type: TimeFieldType,

    /// Time field unit.
    pub time_unit: TimeUnit,

    /// Metric value field (empty selects `*`).
    pub value_field: String,
}

impl Default for FieldSettings {
    fn default() -> Self {
        let time = TimeField::default();
        Self {
            default_field: "log".to_string(),
            time_field: time.name,
            time_type: time.field_type,
            time_unit: time.unit,
            value_field: String::new(),
        }
    }
}

impl FieldSettings {
    /// The configured time field.
    pub fn time(&self) -> TimeField {
        TimeField::new(self.time_field.clone(), self.time_type, self.time_unit)
    }
}

/// SQL backend configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SqlSettings {
    /// Backend variant.
    pub dialect: Dialect,
}

/// Document-store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Terms aggregation and hit size.
    pub size: usize,

    /// Fields searched by unfielded query-string terms.
    pub query_string_fields: Vec<String>,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            size: 10000,
            query_string_fields: vec!["*".to_string(), "__*".to_string()],
        }
    }
}

/// Reference merger configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReferenceSettings {
    /// Cluster groups that must never be queried together.
    pub forbidden_clusters: Vec<Vec<String>>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text and expand environment references.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.fields.default_field = expand_env_vars(&settings.fields.default_field)?;
        settings.fields.time_field = expand_env_vars(&settings.fields.time_field)?;
        settings.fields.value_field = expand_env_vars(&settings.fields.value_field)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `PRISM_CONFIG`
    /// 2. `./prism.toml`
    /// 3. `~/.config/prism/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("PRISM_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("prism.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("prism").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.peek() == Some(&'{') {
            chars.next();
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            while let Some(&ch) = chars.peek() {
                if !(ch.is_alphanumeric() || ch == '_') {
                    break;
                }
                var_name.push(ch);
                chars.next();
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
