//! Service handler configuration.

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration of a service handler module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Handler name reported to the host
    pub handler_name: String,
    /// File extension of service files this handler loads
    pub extension: String,
    /// Directory holding service files
    pub services_dir: PathBuf,
    /// Directory holding handler modules
    pub modules_dir: PathBuf,
    /// Size of the loaded-module table
    pub max_services: usize,
    /// Largest request body buffered per request; `None` is unbounded
    pub max_body: Option<usize>,
    /// Preview bytes requested from clients
    pub preview_size: usize,
    /// Allow "204 No Content" when a service has no response
    pub allow_204: bool,
    /// File extensions for which preview is requested
    pub transfer_preview: Vec<String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            handler_name: "rust_handler".to_string(),
            extension: ".service".to_string(),
            services_dir: PathBuf::from("/usr/lib/c_icap/services"),
            modules_dir: PathBuf::from("/usr/lib/c_icap/modules"),
            max_services: 256,
            max_body: None,
            preview_size: 1024,
            allow_204: true,
            transfer_preview: vec!["*".to_string()],
        }
    }
}

impl HandlerConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Path services are resolved against.
    pub fn libraries_path(&self) -> &Path {
        &self.services_dir
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_services == 0 {
            return Err(Error::InvalidConfig("max_services must be at least 1".to_string()));
        }
        if !self.extension.starts_with('.') {
            return Err(Error::InvalidConfig(format!(
                "extension must start with '.': {}",
                self.extension
            )));
        }
        if self.max_body == Some(0) {
            return Err(Error::InvalidConfig("max_body must be at least 1".to_string()));
        }
        if self.handler_name.is_empty() {
            return Err(Error::InvalidConfig("handler_name is empty".to_string()));
        }
        Ok(())
    }
}
