//! Loads and validates channel configurations from a YAML file.

use std::{collections::HashSet, fs, path::PathBuf};

use config::{Config, File, FileFormat};
use thiserror::Error;

use crate::models::channel::{ChannelConfig, ChannelConfigError};

/// Loads channel configurations from a file.
pub struct ChannelLoader {
    path: PathBuf,
}

/// Errors that can occur while loading channel configurations.
#[derive(Debug, Error)]
pub enum ChannelLoaderError {
    /// Error when reading the channel configuration file.
    #[error("Failed to read channel configuration: {0}")]
    Io(#[from] std::io::Error),

    /// Error when parsing the channel configuration file.
    #[error("Failed to parse channel configuration: {0}")]
    Parse(#[from] config::ConfigError),

    /// The channel configuration file is not a YAML file.
    #[error("Unsupported channel configuration format")]
    UnsupportedFormat,

    /// A channel configuration failed validation.
    #[error("Invalid channel configuration: {0}")]
    Validation(#[from] ChannelConfigError),

    /// Two channels share the same name.
    #[error("Duplicate channel name: {0}")]
    DuplicateName(String),
}

impl ChannelLoader {
    /// Creates a new `ChannelLoader` instance.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads and validates the channel configurations from the specified
    /// file. The top-level `channels` key holds the list of entries.
    pub fn load(&self) -> Result<Vec<ChannelConfig>, ChannelLoaderError> {
        if !self.is_yaml_file() {
            return Err(ChannelLoaderError::UnsupportedFormat);
        }

        let config_str = fs::read_to_string(&self.path)?;
        let config = Config::builder()
            .add_source(File::from_str(&config_str, FileFormat::Yaml))
            .build()?;
        let channels: Vec<ChannelConfig> = config.get("channels")?;

        let mut seen = HashSet::new();
        for channel in &channels {
            channel.validate()?;
            if !seen.insert(channel.name.clone()) {
                return Err(ChannelLoaderError::DuplicateName(channel.name.clone()));
            }
        }

        Ok(channels)
    }

    /// Checks if the file has a YAML extension.
    fn is_yaml_file(&self) -> bool {
        matches!(self.path.extension().and_then(|ext| ext.to_str()), Some("yaml") | Some("yml"))
    }
}
