//! Logging configuration and initialization.

use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl LoggingConfig {
    /// Adjust the level for `-v`/`-q` command-line flags.
    ///
    /// Each `-v` raises the level one step (debug, then trace); `-q` drops it
    /// to warn.
    #[must_use]
    pub fn with_verbosity(mut self, verbose: u8, quiet: bool) -> Self {
        if quiet {
            self.level = "warn".into();
        } else if verbose >= 2 {
            self.level = "trace".into();
        } else if verbose == 1 {
            self.level = "debug".into();
        }
        self
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// Logs go to stderr so that `--json` output on stdout stays parseable.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_writer(std::io::stderr)
                    .init();
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_flags_override_level() {
        let base = LoggingConfig::default();
        assert_eq!(base.clone().with_verbosity(0, false).level, "info");
        assert_eq!(base.clone().with_verbosity(1, false).level, "debug");
        assert_eq!(base.clone().with_verbosity(3, false).level, "trace");
        assert_eq!(base.with_verbosity(2, true).level, "warn");
    }
}
