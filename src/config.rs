use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Options file written by the Home Assistant supervisor
pub const DEFAULT_CONFIG_PATH: &str = "/data/options.json";

/// Prefix for the environment fallback (`BLUELINK_USERNAME`, `BLUELINK_PORT`, ...)
pub const ENV_PREFIX: &str = "BLUELINK";

pub const DEFAULT_REGION: &str = "Canada";
pub const DEFAULT_BRAND: &str = "Hyundai";
pub const DEFAULT_PORT: u16 = 8099;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Immutable service configuration
#[derive(Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    pub pin: Option<String>,
    pub vehicle_id: String,
    pub region: String,
    pub brand: String,
    pub port: u16,
}

// Raw shape shared by the options file and the environment; required fields
// are checked after deserialization so an empty string counts as missing.
// An explicit null region/brand falls back to the default.
#[derive(Debug, Deserialize)]
struct RawConfig {
    username: Option<String>,
    password: Option<String>,
    pin: Option<String>,
    vehicle_id: Option<String>,
    region: Option<String>,
    brand: Option<String>,
    port: u16,
}

impl Config {
    /// Load from the options file at `path`, or from `BLUELINK_*` environment
    /// variables when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Same as [`Config::load`], reading the fallback from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: impl AsRef<Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let builder = config::Config::builder()
            .set_default("region", DEFAULT_REGION)?
            .set_default("brand", DEFAULT_BRAND)?
            .set_default("port", i64::from(DEFAULT_PORT))?;

        let builder = if path.exists() {
            builder.add_source(config::File::from(path).format(config::FileFormat::Json))
        } else {
            warn!("{} not found, using environment variables", path.display());
            builder.add_source(config::Environment::with_prefix(ENV_PREFIX).source(env))
        };

        let raw: RawConfig = builder.build()?.try_deserialize()?;
        raw.validate()
    }
}

impl RawConfig {
    fn validate(self) -> Result<Config, ConfigError> {
        Ok(Config {
            username: required(self.username, "username")?,
            password: required(self.password, "password")?,
            pin: self.pin.filter(|pin| !pin.is_empty()),
            vehicle_id: required(self.vehicle_id, "vehicle_id")?,
            region: self.region.unwrap_or_else(|| DEFAULT_REGION.to_string()),
            brand: self.brand.unwrap_or_else(|| DEFAULT_BRAND.to_string()),
            port: self.port,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("pin", &self.pin.as_ref().map(|_| "<redacted>"))
            .field("vehicle_id", &self.vehicle_id)
            .field("region", &self.region)
            .field("brand", &self.brand)
            .field("port", &self.port)
            .finish()
    }
}
