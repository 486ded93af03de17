/*
[INPUT]:  Built-in defaults, optional config files, BINANCE_WSS_* environment
[OUTPUT]: Merged runtime settings
[POS]:    Configuration layer - endpoint, logging and output defaults
[UPDATE]: When adding new configuration options
*/

use std::path::{Path, PathBuf};

use binance_wss_adapter::DEFAULT_BASE_URL;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::output::OutputFormat;

const APP_DIR: &str = "binance-wss";
const ENV_PREFIX: &str = "BINANCE_WSS";

/// Runtime settings; command-line flags are applied on top by the binary
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// Stream base address, without the `/ws/...` path
    pub base_url: String,
    /// Tracing filter directive, e.g. "info" or "binance_wss_adapter=debug"
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            log_level: None,
            format: OutputFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings from the user config directory, `explicit` and the environment
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(default_config_file(), explicit, true)
    }

    /// Merge sources in increasing priority: defaults, `user_file` (optional),
    /// `explicit` (required when given), environment.
    pub fn load_from(
        user_file: Option<PathBuf>,
        explicit: Option<&Path>,
        with_env: bool,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("format", "text")?;

        if let Some(path) = user_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }
        if with_env {
            builder = builder.add_source(Environment::with_prefix(ENV_PREFIX));
        }

        builder.build()?.try_deserialize()
    }
}

/// `<config dir>/binance-wss/config.{toml,yaml,json,...}`
fn default_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config"))
}
