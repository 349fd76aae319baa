//! Store configuration via `toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use primecache_core::limits::DEFAULT_MAX_BOUND;
use primecache_core::{Limits, OracleError, OracleResult, MAX_SUPPORTED_BOUND};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for building a prime store.
///
/// # Example
///
/// ```toml
/// # Largest bound a query may request (default: 4294967295)
/// max_bound = 4294967295
///
/// # Capacity of the queue between a stream producer and its consumer
/// stream_buffer = 64
///
/// # Sieve up to this bound when the store is built
/// # prewarm = 1000000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OracleConfig {
    /// Largest bound a query may request.
    #[serde(default = "default_max_bound")]
    pub max_bound: u64,
    /// Capacity of each stream's bounded queue.
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
    /// Bound to sieve up to at construction time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prewarm: Option<u64>,
}

fn default_max_bound() -> u64 {
    DEFAULT_MAX_BOUND
}

fn default_stream_buffer() -> usize {
    64
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            max_bound: default_max_bound(),
            stream_buffer: default_stream_buffer(),
            prewarm: None,
        }
    }
}

impl OracleConfig {
    /// Parse and validate a configuration from `toml` text.
    pub fn from_toml_str(text: &str) -> OracleResult<Self> {
        let config: OracleConfig =
            toml::from_str(text).map_err(|e| OracleError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> OracleResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check field values that the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if `stream_buffer` is zero, `max_bound` is past
    /// `i64::MAX`, or `prewarm` is past `max_bound`.
    pub fn validate(&self) -> OracleResult<()> {
        if self.stream_buffer == 0 {
            return Err(OracleError::InvalidConfig(
                "stream_buffer must be at least 1".to_string(),
            ));
        }
        if self.max_bound > MAX_SUPPORTED_BOUND {
            return Err(OracleError::InvalidConfig(format!(
                "max_bound {} exceeds the supported maximum {}",
                self.max_bound, MAX_SUPPORTED_BOUND
            )));
        }
        if let Some(prewarm) = self.prewarm {
            if prewarm > self.max_bound {
                return Err(OracleError::InvalidConfig(format!(
                    "prewarm {} exceeds max_bound {}",
                    prewarm, self.max_bound
                )));
            }
        }
        Ok(())
    }

    /// Limits implied by this configuration.
    pub fn limits(&self) -> Limits {
        Limits::new(self.max_bound)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# primecache configuration
#
# Largest bound a query may request. Queries past it are rejected.
# Must not exceed 9223372036854775807.
max_bound = 4294967295

# Capacity of the queue between a stream producer and its consumer.
stream_buffer = 64

# Sieve up to this bound when the store is built (optional).
# prewarm = 1000000
"#
    }
}
