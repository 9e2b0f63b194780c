//! # Hatchery Configuration System
//!
//! Layered configuration for the incubator simulation.
//!
//! ## Features
//! - **Unified Configuration**: one struct for the loop, the room model and telemetry
//! - **Validation**: every loaded configuration passes `validator` checks
//! - **Environment Awareness**: per-environment YAML overlays and `HATCHERY_*` overrides

#![warn(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

mod error;
mod simulation;
mod telemetry;
mod thermal;
mod validation;

pub use error::ConfigError;
pub use simulation::SimulationConfig;
pub use telemetry::TelemetryConfig;
pub use thermal::ThermalConfig;

/// Top-level configuration container.
#[derive(Debug, Serialize, Deserialize, Validate, Default, Clone, PartialEq)]
pub struct HatcheryConfig {
    /// Simulation loop cadence, bank size and thermal response.
    #[validate(nested)]
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Room and heatlamp temperatures.
    #[validate(nested)]
    #[serde(default)]
    pub thermal: ThermalConfig,

    /// Logging and reading hand-off parameters.
    #[validate(nested)]
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl HatcheryConfig {
    /// Load configuration from default files and environment.
    ///
    /// Hierarchy:
    /// 1. Default values
    /// 2. `config/hatchery.yaml`, if present
    /// 3. `config/<HATCHERY_ENV>.yaml`, if present (`HATCHERY_ENV` defaults to `development`)
    /// 4. `HATCHERY_*` environment variables, `__` separating nested keys
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(HatcheryConfig::default()));

        if Path::new("config/hatchery.yaml").exists() {
            figment = figment.merge(Yaml::file("config/hatchery.yaml"));
        }

        let env = std::env::var("HATCHERY_ENV").unwrap_or_else(|_| "development".into());
        let env_file = format!("config/{}.yaml", env);
        if Path::new(&env_file).exists() {
            figment = figment.merge(Yaml::file(env_file));
        }

        Self::extract(figment.merge(Env::prefixed("HATCHERY_").split("__")))
    }

    /// Load configuration from a specific file, still honouring `HATCHERY_*` overrides.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(PathBuf::from(path)));
        }

        Self::extract(
            Figment::from(Serialized::defaults(HatcheryConfig::default()))
                .merge(Yaml::file(path))
                .merge(Env::prefixed("HATCHERY_").split("__")),
        )
    }

    fn extract(figment: Figment) -> Result<Self, ConfigError> {
        figment
            .extract()
            .map_err(ConfigError::from)
            .and_then(|config: Self| {
                config.validate()?;
                Ok(config)
            })
    }
}
