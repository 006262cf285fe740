//! Global staysync configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{StayResult, SyncError};
use crate::event::DEFAULT_RESERVATION_KEYWORDS;

static DEFAULT_API_URL: &str = "http://localhost:3000";
static DEFAULT_REQUEST_TIMEOUT: &str = "30s";
static DEFAULT_SESSION_PATH: &str = "~/.config/staysync/session.json";
const DEFAULT_CONCURRENCY: usize = 4;

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_session_path() -> PathBuf {
    PathBuf::from(DEFAULT_SESSION_PATH)
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_keywords() -> Vec<String> {
    DEFAULT_RESERVATION_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

fn default_true() -> bool {
    true
}

/// Global configuration at ~/.config/staysync/config.toml
///
/// Every key can be overridden from the environment with a `STAYSYNC_`
/// prefix, e.g. `STAYSYNC_API_URL`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StayConfig {
    /// Base URL of the reservations backend.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout, humantime syntax ("30s", "1m").
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,

    /// How many properties are reconciled at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Summary keywords that mark a feed event as a booking.
    #[serde(default = "default_keywords")]
    pub reservation_keywords: Vec<String>,

    /// Check availability against already-known reservations when the
    /// backend's availability endpoint can't be reached.
    #[serde(default = "default_true")]
    pub fallback_to_local: bool,

    #[serde(default = "default_session_path")]
    pub session_path: PathBuf,
}

impl Default for StayConfig {
    fn default() -> Self {
        StayConfig {
            api_url: default_api_url(),
            request_timeout: default_request_timeout(),
            concurrency: default_concurrency(),
            reservation_keywords: default_keywords(),
            fallback_to_local: true,
            session_path: default_session_path(),
        }
    }
}

impl StayConfig {
    pub fn config_path() -> StayResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SyncError::Config("Could not determine config directory".into()))?
            .join("staysync");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file (creating a commented default on first run)
    /// layered with `STAYSYNC_*` environment variables.
    pub fn load() -> StayResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Config::builder()
            .add_source(File::from(config_path).required(false))
            .add_source(Environment::with_prefix("STAYSYNC").try_parsing(true))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize::<StayConfig>()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .validated()
    }

    /// Load a specific file, without environment overrides.
    pub fn load_from(path: &Path) -> StayResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(true))
            .build()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .try_deserialize::<StayConfig>()
            .map_err(|e| SyncError::Config(e.to_string()))?
            .validated()
    }

    fn validated(mut self) -> StayResult<Self> {
        if self.concurrency == 0 {
            self.concurrency = 1;
        }
        self.api_url = self.api_url.trim_end_matches('/').to_string();
        self.timeout()?;
        Ok(self)
    }

    pub fn timeout(&self) -> StayResult<Duration> {
        humantime::parse_duration(&self.request_timeout).map_err(|e| {
            SyncError::Config(format!(
                "Invalid request_timeout '{}': {e}",
                self.request_timeout
            ))
        })
    }

    /// Session file location with `~` expanded.
    pub fn session_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.session_path.to_string_lossy()).into_owned())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> StayResult<()> {
        let contents = format!(
            "\
# staysync configuration

# Reservations backend:
# api_url = \"{}\"

# Timeout for each backend request:
# request_timeout = \"{}\"

# Properties synced in parallel (feeds of one property run in order):
# concurrency = {}

# Event summaries containing one of these words become draft reservations:
# reservation_keywords = [\"reserved\", \"booked\"]

# Check availability locally when the backend endpoint is unreachable:
# fallback_to_local = true

# Where the login token is kept:
# session_path = \"{}\"
",
            DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT, DEFAULT_CONCURRENCY, DEFAULT_SESSION_PATH
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SyncError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SyncError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("staysync/config.toml");
        StayConfig::create_default_config(&path).unwrap();

        let cfg = StayConfig::load_from(&path).unwrap();
        assert_eq!(cfg.api_url, DEFAULT_API_URL);
        assert_eq!(cfg.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.reservation_keywords, vec!["reserved", "booked"]);
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(30));
        assert!(cfg.fallback_to_local);
    }

    #[test]
    fn values_are_read_and_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "api_url = \"https://api.example.com/\"\n\
             request_timeout = \"2m\"\n\
             concurrency = 0\n\
             reservation_keywords = [\"not available\"]\n",
        )
        .unwrap();

        let cfg = StayConfig::load_from(&path).unwrap();
        assert_eq!(cfg.api_url, "https://api.example.com");
        assert_eq!(cfg.timeout().unwrap(), Duration::from_secs(120));
        assert_eq!(cfg.concurrency, 1);
        assert_eq!(cfg.reservation_keywords, vec!["not available"]);
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "request_timeout = \"soon\"\n").unwrap();

        assert!(matches!(
            StayConfig::load_from(&path),
            Err(SyncError::Config(_))
        ));
    }

    #[test]
    fn session_path_expands_tilde() {
        let cfg = StayConfig::default();
        assert!(!cfg.session_path().to_string_lossy().starts_with('~'));
    }
}
