//! Configuration management for bizscan.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{BusinessType, SearchTerm};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main application configuration.
///
/// This is loaded from `~/.config/bizscan/config.toml` (or platform equivalent).
/// If the file doesn't exist, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Report and snapshot output settings
    pub output: OutputConfig,
    /// Browser automation settings
    pub browser: BrowserConfig,
    /// Session pacing and retry settings
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// # Errors
    /// Returns error if:
    /// - Config directory cannot be determined
    /// - File exists but cannot be read
    /// - File contents are not valid TOML
    pub fn load() -> ConfigResult<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `BIZSCAN_HEADLESS`: Override browser headless mode (true/false)
    /// - `BIZSCAN_OUTPUT_DIR`: Override the report directory
    pub fn load_with_env() -> ConfigResult<Self> {
        let mut config = Self::load()?;
        config.apply_env();
        Ok(config)
    }

    /// Apply environment overrides on top of already-loaded values.
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("BIZSCAN_HEADLESS") {
            if let Ok(headless) = val.parse() {
                self.browser.headless = headless;
                tracing::debug!("Override browser.headless from env: {}", headless);
            }
        }

        if let Ok(val) = std::env::var("BIZSCAN_OUTPUT_DIR") {
            if !val.trim().is_empty() {
                tracing::debug!("Override output.dir from env: {}", val);
                self.output.dir = PathBuf::from(val);
            }
        }
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/bizscan/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("ca", "bizscan", "bizscan").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.browser.pool_size == 0 {
            return Err(invalid("browser.pool_size", "must be at least 1"));
        }

        if self.session.business_types.is_empty() {
            return Err(invalid("session.business_types", "must list at least one type"));
        }
        self.session.business_types()?;

        if self.session.min_search_delay_ms > self.session.max_search_delay_ms {
            return Err(invalid(
                "session.min_search_delay_ms",
                "must not exceed session.max_search_delay_ms",
            ));
        }

        if self.session.business_type_attempts == 0 {
            return Err(invalid("session.business_type_attempts", "must be at least 1"));
        }

        self.session.resume_term()?;
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Report and snapshot output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the report and raw page snapshots
    pub dir: PathBuf,
    /// Whether to write one raw HTML snapshot per captured page
    pub save_snapshots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("business_lookup_output"),
            save_snapshots: true,
        }
    }
}

/// Browser automation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Browser window width
    pub window_width: u32,
    /// Browser window height
    pub window_height: u32,
    /// Locale reported by every session
    pub locale: String,
    /// IANA timezone reported by every session
    pub timezone: String,
    /// Number of isolated browser contexts to pre-create
    pub pool_size: usize,
    /// Upper bound on a single click in milliseconds
    pub action_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            window_width: 1920,
            window_height: 1080,
            locale: "en-US".to_string(),
            timezone: "America/Toronto".to_string(),
            pool_size: 3,
            action_timeout_ms: 2000,
        }
    }
}

/// Session pacing and retry settings.
///
/// All durations are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Business-type filter values, one session each
    pub business_types: Vec<String>,
    /// Start offset between consecutive sessions
    pub start_interval_ms: u64,
    /// Term to start each session's enumeration from (defaults to `a`)
    pub resume_from: Option<String>,
    /// Settle time after loading the search form
    pub navigation_settle_ms: u64,
    /// Settle time after opening the advanced-search panel
    pub toggle_settle_ms: u64,
    /// How long to wait for the register dropdown
    pub register_wait_ms: u64,
    /// Settle time after choosing the register (business types load async)
    pub register_settle_ms: u64,
    /// Attempts to find the business-type option
    pub business_type_attempts: u32,
    /// Delay between business-type attempts
    pub business_type_retry_ms: u64,
    /// Pixels to scroll before the status filter
    pub status_scroll_px: i64,
    /// Settle time after scrolling to the status filter
    pub status_settle_ms: u64,
    /// Polling interval while a bot challenge is showing
    pub challenge_poll_ms: u64,
    /// Maximum polls while a bot challenge is showing
    pub challenge_poll_attempts: u32,
    /// Settle time after clicking search
    pub search_settle_ms: u64,
    /// How long to wait for results or a no-results marker
    pub results_timeout_ms: u64,
    /// Settle time after raising the page size
    pub page_size_settle_ms: u64,
    /// Lower bound of the randomized delay between searches
    pub min_search_delay_ms: u64,
    /// Upper bound of the randomized delay between searches
    pub max_search_delay_ms: u64,
    /// Pause after a failed search attempt
    pub error_backoff_ms: u64,
    /// Extra attempts for a term whose search failed
    pub term_retries: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            business_types: vec![
                "Co-operative Non-Share".to_string(),
                "Co-operative with Share".to_string(),
                "Not-for-Profit Corporation".to_string(),
            ],
            start_interval_ms: 7_000,
            resume_from: None,
            navigation_settle_ms: 2_000,
            toggle_settle_ms: 1_000,
            register_wait_ms: 10_000,
            register_settle_ms: 3_000,
            business_type_attempts: 5,
            business_type_retry_ms: 2_000,
            status_scroll_px: 300,
            status_settle_ms: 500,
            challenge_poll_ms: 5_000,
            challenge_poll_attempts: 12,
            search_settle_ms: 2_000,
            results_timeout_ms: 30_000,
            page_size_settle_ms: 7_000,
            min_search_delay_ms: 2_000,
            max_search_delay_ms: 5_000,
            error_backoff_ms: 5_000,
            term_retries: 1,
        }
    }
}

impl SessionConfig {
    /// Parsed business types, in configured order.
    pub fn business_types(&self) -> ConfigResult<Vec<BusinessType>> {
        self.business_types
            .iter()
            .map(|raw| {
                BusinessType::new(raw.as_str())
                    .map_err(|e| invalid("session.business_types", &e.to_string()))
            })
            .collect()
    }

    /// Parsed resume term, if one is configured.
    pub fn resume_term(&self) -> ConfigResult<Option<SearchTerm>> {
        self.resume_from
            .as_deref()
            .map(|raw| {
                SearchTerm::new(raw).map_err(|e| invalid("session.resume_from", &e.to_string()))
            })
            .transpose()
    }

    /// Stagger between consecutive session starts.
    #[must_use]
    pub fn start_interval(&self) -> Duration {
        Duration::from_millis(self.start_interval_ms)
    }
}
