//! Configuration loading and resolution
//!
//! Every setting resolves through the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;
use tracing::warn;

use crate::{Error, Result};

pub const ENV_DB_PATH: &str = "BOOTHTRACK_DB";
pub const ENV_HOST: &str = "BOOTHTRACK_HOST";
pub const ENV_PORT: &str = "BOOTHTRACK_PORT";
pub const ENV_TIMEZONE: &str = "BOOTHTRACK_TZ";
pub const ENV_BOOTH_ID: &str = "BOOTHTRACK_BOOTH_ID";

/// All persisted timestamps are rendered in this zone unless configured
/// otherwise (the reference deployment runs booth hardware in IST).
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Asia::Kolkata;
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_BOOTH_ID: i64 = 1;

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind_host: String,
    pub port: u16,
    pub timezone: Tz,
    /// Booth id stamped on scans that omit one
    pub default_booth_id: i64,
}

/// Settings supplied on the command line (highest priority)
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub db_path: Option<PathBuf>,
    pub bind_host: Option<String>,
    pub port: Option<u16>,
    pub timezone: Option<String>,
    pub default_booth_id: Option<i64>,
}

/// On-disk TOML configuration shape
#[derive(Debug, Default, Clone, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_host: Option<String>,
    pub port: Option<u16>,
    pub timezone: Option<String>,
    pub default_booth_id: Option<i64>,
}

impl TomlConfig {
    /// Load from the platform config location, if a file exists there.
    ///
    /// A missing file is not an error; an unreadable or malformed one logs a
    /// warning and falls back to defaults rather than terminating startup.
    pub fn load_default() -> Self {
        let Some(path) = default_config_file() else {
            return Self::default();
        };
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir()
        .map(|d| d.join("boothtrack").join("config.toml"))
        .filter(|p| p.exists())
}

fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("boothtrack").join("boothtrack.db"))
        .unwrap_or_else(|| PathBuf::from("boothtrack.db"))
}

/// Resolve the full configuration from CLI overrides, environment, the
/// platform config file, and compiled defaults.
pub fn resolve(overrides: ConfigOverrides) -> Result<Config> {
    resolve_with(overrides, TomlConfig::load_default())
}

/// Resolution with an explicit file layer (separable for tests)
pub fn resolve_with(overrides: ConfigOverrides, file: TomlConfig) -> Result<Config> {
    let db_path = overrides
        .db_path
        .or_else(|| env_var(ENV_DB_PATH).map(PathBuf::from))
        .or(file.database_path)
        .unwrap_or_else(default_db_path);

    let bind_host = overrides
        .bind_host
        .or_else(|| env_var(ENV_HOST))
        .or(file.bind_host)
        .unwrap_or_else(|| DEFAULT_HOST.to_string());

    let port = match overrides.port {
        Some(port) => port,
        None => match env_var(ENV_PORT) {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid {ENV_PORT}: {raw}")))?,
            None => file.port.unwrap_or(DEFAULT_PORT),
        },
    };

    let timezone = match overrides
        .timezone
        .or_else(|| env_var(ENV_TIMEZONE))
        .or(file.timezone)
    {
        Some(name) => name
            .parse::<Tz>()
            .map_err(|_| Error::Config(format!("unknown timezone: {name}")))?,
        None => DEFAULT_TIMEZONE,
    };

    let default_booth_id = match overrides.default_booth_id {
        Some(id) => id,
        None => match env_var(ENV_BOOTH_ID) {
            Some(raw) => raw
                .parse()
                .map_err(|_| Error::Config(format!("invalid {ENV_BOOTH_ID}: {raw}")))?,
            None => file.default_booth_id.unwrap_or(DEFAULT_BOOTH_ID),
        },
    };

    Ok(Config {
        db_path,
        bind_host,
        port,
        timezone,
        default_booth_id,
    })
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
