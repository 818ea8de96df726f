//! Module configuration using Figment
//!
//! Configuration is loaded from:
//! 1. A TOML file (base configuration)
//! 2. Environment variables (prefixed with `SENSOR_MODULE_`, `__` separates nested keys)
//!
//! # Example
//! ```toml
//! log_level = "info"
//! poll_interval_ms = 1000
//!
//! [[boards]]
//! name = "local"
//! i2c_buses = ["bus1"]
//!
//! [[components]]
//! name = "pressure"
//! model = "viamlabs:i2c:lps25h"
//!
//! [components.attributes]
//! board = "local"
//! i2c_bus = "bus1"
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use sensor_core::ComponentConfig;
use sensor_driver_mock::MockBoardConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "SENSOR_MODULE_";

/// Top-level module configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Logging level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Delay between polling rounds in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
    /// Mock boards available as dependencies
    #[serde(default)]
    pub boards: Vec<MockBoardConfig>,
    /// Component instances to build
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    1000
}

impl ModuleConfig {
    /// Load configuration from a specific file path, with environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, figment::Error> {
        Self::figment(Figment::new().merge(Toml::file(path.as_ref()))).extract()
    }

    /// Layer environment overrides on top of `base`
    pub fn figment(base: Figment) -> Figment {
        base.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be greater than 0".to_string());
        }

        let mut boards = HashSet::new();
        for board in &self.boards {
            if !boards.insert(board.name.as_str()) {
                return Err(format!("Duplicate board name '{}'", board.name));
            }
            if !(0.0..=1.0).contains(&board.failure_rate) {
                return Err(format!(
                    "Board '{}' failure_rate must be between 0.0 and 1.0",
                    board.name
                ));
            }
        }

        let mut components = HashSet::new();
        for component in &self.components {
            if !components.insert(component.name.as_str()) {
                return Err(format!("Duplicate component name '{}'", component.name));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        log_level = "debug"
        poll_interval_ms = 250

        [[boards]]
        name = "local"
        i2c_buses = ["bus1"]
        response = [1, 2, 3, 4, 5, 6, 7, 8]

        [[components]]
        name = "pressure"
        model = "viamlabs:i2c:lps25h"

        [components.attributes]
        board = "local"
        i2c_bus = "bus1"
        i2c_addr = 0
    "#;

    fn parse(src: &str) -> ModuleConfig {
        Figment::new().merge(Toml::string(src)).extract().unwrap()
    }

    #[test]
    fn test_parse_sample() {
        let config = parse(SAMPLE);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.boards.len(), 1);
        assert!(config.boards[0].local);
        assert_eq!(config.components[0].model.to_string(), "viamlabs:i2c:lps25h");
        assert_eq!(
            config.components[0].attributes.get("i2c_bus").and_then(|v| v.as_str()),
            Some("bus1")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.poll_interval_ms, 1000);
        assert!(config.components.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = ModuleConfig::load_from(file.path()).unwrap();
        assert_eq!(config.components.len(), 1);
    }

    #[test]
    fn test_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "module.toml",
                r#"
                log_level = "info"
                poll_interval_ms = 1000
                "#,
            )?;
            jail.set_env("SENSOR_MODULE_POLL_INTERVAL_MS", "250");
            jail.set_env("SENSOR_MODULE_LOG_LEVEL", "debug");

            let config = ModuleConfig::load_from("module.toml")?;
            assert_eq!(config.poll_interval_ms, 250);
            assert_eq!(config.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = parse(SAMPLE);
        config.log_level = "loud".to_string();
        assert!(config.validate().unwrap_err().contains("Invalid log_level"));

        let mut config = parse(SAMPLE);
        config.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = parse(SAMPLE);
        let duplicate = config.components[0].clone();
        config.components.push(duplicate);
        assert!(config
            .validate()
            .unwrap_err()
            .contains("Duplicate component name"));
    }

    #[test]
    fn test_bad_model_is_rejected() {
        let result: Result<ModuleConfig, _> = Figment::new()
            .merge(Toml::string(
                r#"
                [[components]]
                name = "pressure"
                model = "lps25h"
                "#,
            ))
            .extract();
        assert!(result.is_err());
    }
}
