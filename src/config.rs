//! Checker configuration.
//!
//! Read from TOML; every key is optional.
//!
//! ```toml
//! time_limit_secs = 300
//! parallel = true
//! search_node_budget = 200000
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::generator::DEFAULT_SEARCH_BUDGET;

/// Settings of the result checker and the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerConfig {
    /// Results reporting a larger solve time fail.
    pub time_limit_secs: f64,
    /// Aggregate with rayon rather than sequentially.
    pub parallel: bool,
    /// Node budget of the generator's period search.
    pub search_node_budget: u64,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            time_limit_secs: 300.0,
            parallel: true,
            search_node_budget: DEFAULT_SEARCH_BUDGET,
        }
    }
}

impl CheckerConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a TOML file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Toml`] if it does not match the schema.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Sets the solve-time limit.
    pub fn with_time_limit(mut self, secs: f64) -> Self {
        self.time_limit_secs = secs;
        self
    }

    /// Enables or disables parallel aggregation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
