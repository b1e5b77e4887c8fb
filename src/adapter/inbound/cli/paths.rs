//! Default locations.
//!
//! Everything lives under `~/.revpace/`:
//! - `~/.revpace/config.toml` - configuration
//! - `~/.revpace/revpace.db` - snapshot store (sqlite backend)

use std::path::PathBuf;

/// The revpace home directory (`~/.revpace/`).
pub fn home_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".revpace")
}

/// The default config file path (`~/.revpace/config.toml`).
pub fn default_config() -> PathBuf {
    home_dir().join("config.toml")
}
