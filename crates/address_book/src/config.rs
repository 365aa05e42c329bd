//! Address book configuration

use crate::errors::{AddressBookError, Result};
use crate::events::DEFAULT_EVENT_LOG_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Environment variable overriding [`AddressBookConfig::event_log_capacity`].
pub const ENV_EVENT_LOG_CAPACITY: &str = "ADDRESS_BOOK_EVENT_LOG_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressBookConfig {
    /// Number of notifications retained in the event log
    pub event_log_capacity: usize,
}

impl Default for AddressBookConfig {
    fn default() -> Self {
        Self {
            event_log_capacity: DEFAULT_EVENT_LOG_CAPACITY,
        }
    }
}

impl AddressBookConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AddressBookConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading address book configuration from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Apply overrides from environment variables
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(ENV_EVENT_LOG_CAPACITY) {
            self.apply_capacity_override(&val);
        }
    }

    fn apply_capacity_override(&mut self, val: &str) {
        match val.trim().parse::<usize>() {
            Ok(0) => warn!(
                "Ignoring {}=0: capacity must be greater than zero",
                ENV_EVENT_LOG_CAPACITY
            ),
            Ok(capacity) => self.event_log_capacity = capacity,
            Err(e) => warn!("Ignoring {}={:?}: {}", ENV_EVENT_LOG_CAPACITY, val, e),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.event_log_capacity == 0 {
            return Err(AddressBookError::Config(
                "event_log_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
