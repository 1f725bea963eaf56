//! Configuration file loading for conclave
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `--config <path>` specified file
//! 2. Project root: `./conclave.toml` or `./.conclave.toml`
//! 3. XDG config: `$XDG_CONFIG_HOME/conclave/config.toml`
//! 4. Environment variables: `CONCLAVE_<SECTION>__<KEY>`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, FileConfig,
    FileDeliberationConfig, FileExpertConfig, FileModeratorConfig, FileOutputConfig,
    FileProviderConfig, FileQualityConfig,
};
pub use loader::{ConfigLoadError, ConfigLoader, ENV_PREFIX};
