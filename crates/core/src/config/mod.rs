//! Configuration file loading.
//!
//! Profiles live in `$XDG_CONFIG_HOME/perinote/config.toml`; each names a
//! vault and its periodic note settings.

pub mod loader;
pub mod types;

pub use loader::{ConfigError, ConfigLoader, default_config_path};
pub use types::{ConfigFile, LoggingConfig, PeriodicSection, Profile, ResolvedConfig};
