//! Configuration for the waitstep plugin.
//!
//! ```toml
//! [cancellation]
//! signals = ["TERM", "HUP", "INT"]
//! grace_period_ms = 500
//!
//! [logging]
//! filter = "info"
//! ```
//!
//! Every section and field is optional; accessors on [`WaitstepConfig`] apply
//! the defaults and environment overrides.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "WAITSTEP_CONFIG";
/// Overrides `cancellation.grace_period_ms`.
pub const GRACE_PERIOD_ENV: &str = "WAITSTEP_GRACE_PERIOD_MS";

pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_millis(500);
pub const DEFAULT_SIGNALS: [TriggerSignal; 3] =
    [TriggerSignal::Term, TriggerSignal::Hup, TriggerSignal::Int];

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitstepConfig {
    pub cancellation: Option<CancellationConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// Process signals that cancel a running invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
pub enum TriggerSignal {
    #[serde(rename = "TERM", alias = "SIGTERM")]
    Term,
    #[serde(rename = "HUP", alias = "SIGHUP")]
    Hup,
    #[serde(rename = "INT", alias = "SIGINT")]
    Int,
    #[serde(rename = "QUIT", alias = "SIGQUIT")]
    Quit,
}

impl TriggerSignal {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Term => "SIGTERM",
            Self::Hup => "SIGHUP",
            Self::Int => "SIGINT",
            Self::Quit => "SIGQUIT",
        }
    }
}

/// How the plugin reacts to cancellation.
///
/// ```toml
/// [cancellation]
/// signals = ["TERM", "INT"]
/// grace_period_ms = 250
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CancellationConfig {
    /// Signals routed to the cancellation gate. Default: TERM, HUP, INT.
    pub signals: Option<Vec<TriggerSignal>>,
    /// Delay before exit after a cancelled output was written. Default: 500.
    pub grace_period_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: Option<String>,
}

impl WaitstepConfig {
    /// Load from `$WAITSTEP_CONFIG`, else `~/.waitstep/config.toml`.
    ///
    /// `Ok(None)` only when the default file is absent. A path named by
    /// `$WAITSTEP_CONFIG` must exist, same as an explicit `--config`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_resolved(env_config_path(), default_config_path())
    }

    fn load_resolved(
        explicit: Option<PathBuf>,
        default: Option<PathBuf>,
    ) -> Result<Option<Self>, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(&path).map(Some);
        }
        match default {
            Some(path) if path.exists() => Self::load_from(&path).map(Some),
            _ => Ok(None),
        }
    }

    /// Load from an explicit path. A missing file is an error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn signals(&self) -> Vec<TriggerSignal> {
        self.cancellation
            .as_ref()
            .and_then(|c| c.signals.clone())
            .unwrap_or_else(|| DEFAULT_SIGNALS.to_vec())
    }

    /// Grace period with the `WAITSTEP_GRACE_PERIOD_MS` override applied.
    #[must_use]
    pub fn grace_period(&self) -> Duration {
        self.grace_period_with_override(env::var(GRACE_PERIOD_ENV).ok().as_deref())
    }

    fn grace_period_with_override(&self, raw_override: Option<&str>) -> Duration {
        if let Some(raw) = raw_override {
            match raw.trim().parse::<u64>() {
                Ok(ms) => return Duration::from_millis(ms),
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}: {:?}", GRACE_PERIOD_ENV, raw);
                }
            }
        }
        self.cancellation
            .as_ref()
            .and_then(|c| c.grace_period_ms)
            .map_or(DEFAULT_GRACE_PERIOD, Duration::from_millis)
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.filter.as_deref())
    }
}

/// `$WAITSTEP_CONFIG`, else `~/.waitstep/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    env_config_path().or_else(default_config_path)
}

fn env_config_path() -> Option<PathBuf> {
    env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".waitstep").join("config.toml"))
}
