//! Configuration module for Prism.
//!
//! Handles the TOML settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, DocumentSettings, FieldSettings, LogSettings, ReferenceSettings, Settings,
    SettingsError, SqlSettings,
};
