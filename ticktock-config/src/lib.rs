//! # Ticktock Configuration
//!
//! Layered configuration for the real timer, the simulated clock and
//! telemetry.
//!
//! ## Features
//! - **Layering**: defaults, YAML files, then `TICKTOCK_*` environment variables
//! - **Validation**: every section is checked with `validator` after merging

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod simulator;
mod telemetry;
mod timer;
mod validation;

pub use error::ConfigError;
pub use simulator::SimulatorConfig;
pub use telemetry::TelemetryConfig;
pub use timer::TimerConfig;

const BASE_FILE: &str = "config/ticktock.yaml";
const ENV_PREFIX: &str = "TICKTOCK_";

/// Top‑level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct TicktockConfig {
    /// Fake clock parameters.
    #[serde(default)]
    #[validate(nested)]
    pub simulator: SimulatorConfig,

    /// Real timer parameters.
    #[serde(default)]
    #[validate(nested)]
    pub timer: TimerConfig,

    /// Logging.
    #[serde(default)]
    #[validate(nested)]
    pub telemetry: TelemetryConfig,
}

impl TicktockConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/ticktock.yaml`, skipped when missing
    /// 3. `config/<TICKTOCK_ENV>.yaml`, skipped when missing
    /// 4. `TICKTOCK_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(TicktockConfig::default()));

        if Path::new(BASE_FILE).exists() {
            figment = figment.merge(Yaml::file(BASE_FILE));
        }

        if let Ok(env) = std::env::var("TICKTOCK_ENV") {
            let env_file = format!("config/{}.yaml", env);
            if Path::new(&env_file).exists() {
                figment = figment.merge(Yaml::file(env_file));
            }
        }

        Self::finish(figment)
    }

    /// Load configuration from a specific file, still honouring the environment.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let figment = Figment::from(Serialized::defaults(TicktockConfig::default()))
            .merge(Yaml::file(path));
        Self::finish(figment)
    }

    fn finish(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
