//! Configuration for AtlasPage
//!
//! Centralized configuration with sensible defaults.

use crate::error::{AtlasError, Result};

/// Smallest page size accepted by [`Config::validate`].
///
/// A 4-byte length prefix then spans at most two pages. Varints may span
/// more than two pages at this size; the cursors handle that byte by byte.
pub const MIN_PAGE_SIZE: usize = 8;

/// Main configuration for a byte store
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Page Configuration
    // -------------------------------------------------------------------------
    /// Size of a single page in bytes (power of two, >= MIN_PAGE_SIZE)
    pub page_size: usize,

    /// Bytes to make addressable up front; further pages are added on demand
    pub initial_size: u64,

    // -------------------------------------------------------------------------
    // Cursor Pool Configuration
    // -------------------------------------------------------------------------
    /// Max idle read cursors kept for reuse
    pub pool_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_size: 32 * 1024, // 32 KB
            initial_size: 0,
            pool_capacity: 64,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Check the invariants the page geometry relies on
    pub fn validate(&self) -> Result<()> {
        if !self.page_size.is_power_of_two() {
            return Err(AtlasError::Config(format!(
                "page_size must be a power of two, got {}",
                self.page_size
            )));
        }
        if self.page_size < MIN_PAGE_SIZE {
            return Err(AtlasError::Config(format!(
                "page_size must be at least {} bytes, got {}",
                MIN_PAGE_SIZE, self.page_size
            )));
        }
        if self.pool_capacity == 0 {
            return Err(AtlasError::Config(
                "pool_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the page size (in bytes)
    pub fn page_size(mut self, size: usize) -> Self {
        self.config.page_size = size;
        self
    }

    /// Set the number of bytes allocated at creation
    pub fn initial_size(mut self, size: u64) -> Self {
        self.config.initial_size = size;
        self
    }

    /// Set the maximum number of pooled read cursors
    pub fn pool_capacity(mut self, count: usize) -> Self {
        self.config.pool_capacity = count;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
