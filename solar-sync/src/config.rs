//! Dashboard configuration, injected once at startup
//!
//! Handles:
//! - Backend base URL and request timeout
//! - Polling cadences per screen family
//! - Table page sizes
//! - What a failed poll does to the rows already on screen
//!
//! Loaded from TOML (`SOLAR_DASHBOARD_CONFIG` or the OS config dir), with
//! `SOLAR_API_BASE` overriding the base URL. A missing file means defaults.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";
const CONFIG_ENV: &str = "SOLAR_DASHBOARD_CONFIG";
const BASE_URL_ENV: &str = "SOLAR_API_BASE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub backend: BackendConfig,
    pub polling: PollingConfig,
    pub tables: TableConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(with = "human_duration")]
    pub request_timeout: Duration,
}

/// Cadence of each screen family's Interval Scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Plant and admin lists in the access portal
    #[serde(with = "human_duration")]
    pub portal_lists: Duration,
    /// SMB / string telemetry, plant details
    #[serde(with = "human_duration")]
    pub telemetry: Duration,
    #[serde(with = "human_duration")]
    pub alerts: Duration,
    #[serde(with = "human_duration")]
    pub maintenance: Duration,
    /// Users and login history
    #[serde(with = "human_duration")]
    pub users: Duration,
    #[serde(with = "human_duration")]
    pub clock: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub alerts_page_size: usize,
    pub maintenance_page_size: usize,
    pub portal_page_size: usize,
    pub telemetry_page_size: usize,
    pub users_page_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub on_error: StalePolicy,
}

/// What a failed poll does to the rows currently displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StalePolicy {
    /// Keep the previous rows on screen (stale-but-present)
    #[default]
    KeepStale,
    /// Replace the rows with an empty collection
    Clear,
}

/// Screen family a polled resource belongs to; picks its cadence and page size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenFamily {
    Portal,
    Telemetry,
    Alerts,
    Maintenance,
    Users,
}

impl PollingConfig {
    /// Every cadence must be non-zero; the timers cannot tick at zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        let cadences = [
            ("portal_lists", self.portal_lists),
            ("telemetry", self.telemetry),
            ("alerts", self.alerts),
            ("maintenance", self.maintenance),
            ("users", self.users),
            ("clock", self.clock),
        ];
        match cadences.iter().find(|(_, period)| period.is_zero()) {
            Some((name, _)) => Err(ConfigError::ZeroInterval(name)),
            None => Ok(()),
        }
    }

    pub fn interval_for(&self, family: ScreenFamily) -> Duration {
        match family {
            ScreenFamily::Portal => self.portal_lists,
            ScreenFamily::Telemetry => self.telemetry,
            ScreenFamily::Alerts => self.alerts,
            ScreenFamily::Maintenance => self.maintenance,
            ScreenFamily::Users => self.users,
        }
    }
}

impl TableConfig {
    pub fn page_size_for(&self, family: ScreenFamily) -> usize {
        match family {
            ScreenFamily::Portal => self.portal_page_size,
            ScreenFamily::Telemetry => self.telemetry_page_size,
            ScreenFamily::Alerts => self.alerts_page_size,
            ScreenFamily::Maintenance => self.maintenance_page_size,
            ScreenFamily::Users => self.users_page_size,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(8),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            portal_lists: Duration::from_secs(5),
            telemetry: Duration::from_secs(10),
            alerts: Duration::from_secs(10),
            maintenance: Duration::from_secs(10),
            users: Duration::from_secs(10),
            clock: Duration::from_secs(1),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            alerts_page_size: 12,
            maintenance_page_size: 12,
            portal_page_size: 15,
            telemetry_page_size: 15,
            users_page_size: 15,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { on_error: StalePolicy::KeepStale }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            polling: PollingConfig::default(),
            tables: TableConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from `SOLAR_DASHBOARD_CONFIG` or the OS config dir, then apply env overrides
    pub async fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = match std::env::var(CONFIG_ENV) {
            Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
            _ => Self::config_file_path()?,
        };

        let mut config = Self::load_from(&path).await?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load a specific file; a missing or blank file yields defaults
    pub async fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let txt = tokio::fs::read_to_string(path).await?;
        if txt.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: DashboardConfig = toml::from_str(&txt)?;
        config.polling.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub async fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let content = toml::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    pub async fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_file_path()?).await
    }

    /// OS-specific config file location
    pub fn config_file_path() -> Result<PathBuf, ConfigError> {
        let mut path = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        path.push("solar-dashboard");
        path.push("config.toml");
        Ok(path)
    }

    pub fn is_first_time_setup() -> bool {
        Self::config_file_path().map(|p| !p.exists()).unwrap_or(true)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base) = std::env::var(BASE_URL_ENV) {
            if base.trim().is_empty() {
                warn!("{} is set but empty, ignoring", BASE_URL_ENV);
            } else {
                self.backend.base_url = base;
            }
        }
    }
}

/// `"5s"` / `"1m 30s"` style durations in TOML
mod human_duration {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}
