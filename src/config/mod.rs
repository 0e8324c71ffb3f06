//! Configuration module.
//!
//! Handles the config file, environment variables, and settings.

mod settings;

pub use settings::{
    expand_env_vars, DatasetSettings, OutputFormat, OutputSettings, Settings, SettingsError,
    SqlSettings,
};
