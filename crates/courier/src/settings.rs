//! Client settings
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `COURIER__*` environment variables (`COURIER__BASE_URL`,
//! `COURIER__CONNECTIVITY__ENABLED`, ...).

use std::collections::BTreeMap;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::connectivity::ConnectivitySettings;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COURIER";

/// Settings a [`crate::Client`] can be built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL for path-only requests
    pub base_url: Option<String>,
    /// Headers added to every request
    pub default_headers: BTreeMap<String, String>,
    /// Reachability probe
    pub connectivity: ConnectivitySettings,
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment
    pub fn new<P>(config_file_name: Option<P>) -> Result<Self, ConfigError>
    where
        P: Into<PathBuf>,
    {
        let mut builder =
            Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = config_file_name {
            let path: PathBuf = path.into();
            builder = builder.add_source(File::from(path));
        }

        let config = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Parse settings from a TOML string, on top of the defaults
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}
