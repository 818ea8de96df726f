//! Host glue: model registration, component bring-up and polling.

use crate::config::ModuleConfig;
use anyhow::{Context, Result};
use sensor_core::{ComponentRegistry, Dependencies, Extra, ModelRegistry};
use sensor_driver_lps25h::Lps25hFactory;
use sensor_driver_mock::MockBoard;
use std::sync::Arc;
use std::time::Duration;

/// Register every model this module serves.
pub fn model_registry() -> Result<ModelRegistry> {
    let mut models = ModelRegistry::new();
    models
        .register_factory(Box::new(Lps25hFactory))
        .context("Failed to register LPS25H factory")?;
    Ok(models)
}

/// Build the configured mock boards.
pub fn dependencies(config: &ModuleConfig) -> Dependencies {
    config
        .boards
        .iter()
        .fold(Dependencies::new(), |deps, board| {
            deps.with_board(Arc::new(MockBoard::from_config(board)))
        })
}

/// Validate every component and return its dependency names.
///
/// Dependencies that no configured board provides are reported as errors.
pub fn validate_components(
    models: &ModelRegistry,
    config: &ModuleConfig,
) -> Result<Vec<(String, Vec<String>)>> {
    let deps = dependencies(config);
    let mut result = Vec::with_capacity(config.components.len());
    for component in &config.components {
        let names = models
            .validate(component)
            .with_context(|| format!("Invalid component '{}'", component.name))?;
        deps.subset(&names)
            .with_context(|| format!("Unresolved dependency for component '{}'", component.name))?;
        result.push((component.name.clone(), names));
    }
    Ok(result)
}

/// Build every configured component against the mock boards.
pub async fn build_components(
    models: ModelRegistry,
    config: &ModuleConfig,
) -> Result<ComponentRegistry> {
    let deps = dependencies(config);
    let mut registry = ComponentRegistry::new(models);
    for component in &config.components {
        registry
            .add(component.clone(), &deps)
            .await
            .with_context(|| format!("Failed to build component '{}'", component.name))?;
    }
    tracing::info!(count = registry.len(), "Components ready");
    Ok(registry)
}

/// Take one reading from every component.
///
/// Returns one JSON line per component. Failed readings are logged and
/// reported with an `error` field; they never stop the round.
pub async fn poll_once(registry: &ComponentRegistry) -> Vec<serde_json::Value> {
    let extra = Extra::new();
    let mut lines = Vec::with_capacity(registry.len());
    for name in registry.names() {
        let Some(sensor) = registry.get(&name) else {
            continue;
        };
        match sensor.readings(&extra).await {
            Ok(readings) => {
                lines.push(serde_json::json!({ "component": name, "readings": readings }));
            }
            Err(e) => {
                tracing::warn!(component = %name, error = %e, "Reading failed");
                lines.push(serde_json::json!({ "component": name, "error": e.to_string() }));
            }
        }
    }
    lines
}

/// Poll all components every `interval` until `rounds` rounds have run or
/// Ctrl-C is received. Returns the number of completed rounds.
pub async fn poll(
    registry: &ComponentRegistry,
    interval: Duration,
    rounds: Option<u64>,
) -> Result<u64> {
    let mut ticker = tokio::time::interval(interval);
    let mut completed = 0;

    loop {
        if rounds.is_some_and(|limit| completed >= limit) {
            break;
        }
        tokio::select! {
            _ = ticker.tick() => {
                for line in poll_once(registry).await {
                    println!("{}", serde_json::to_string(&line)?);
                }
                completed += 1;
            }
            signal = tokio::signal::ctrl_c() => {
                signal.context("Failed to listen for Ctrl-C")?;
                tracing::info!("Shutdown requested");
                break;
            }
        }
    }

    Ok(completed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::providers::{Format, Toml};
    use figment::Figment;
    use sensor_core::LifecycleState;

    fn config(src: &str) -> ModuleConfig {
        Figment::new().merge(Toml::string(src)).extract().unwrap()
    }

    const TWO_SENSORS: &str = r#"
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

        [[components]]
        name = "pressure_alt"
        model = "viamlabs:i2c:lps25h"
        [components.attributes]
        board = "local"
        i2c_bus = "bus1"
        i2c_addr = 93
    "#;

    #[test]
    fn test_models_registered() {
        let models = model_registry().unwrap();
        let listed: Vec<String> = models.models().iter().map(|m| m.to_string()).collect();
        assert_eq!(listed, vec!["viamlabs:i2c:lps25h"]);
    }

    #[test]
    fn test_validate_components() {
        let models = model_registry().unwrap();
        let validated = validate_components(&models, &config(TWO_SENSORS)).unwrap();
        assert_eq!(
            validated,
            vec![
                ("pressure".to_string(), vec!["local".to_string()]),
                ("pressure_alt".to_string(), vec!["local".to_string()]),
            ]
        );
    }

    #[test]
    fn test_validate_reports_unknown_board() {
        let models = model_registry().unwrap();
        let err = validate_components(
            &models,
            &config(
                r#"
                [[components]]
                name = "pressure"
                model = "viamlabs:i2c:lps25h"
                [components.attributes]
                board = "missing"
                i2c_bus = "bus1"
                "#,
            ),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("dependency \"missing\" not found"));
    }

    #[tokio::test]
    async fn test_build_and_poll() {
        let mut registry = build_components(model_registry().unwrap(), &config(TWO_SENSORS))
            .await
            .unwrap();
        assert_eq!(registry.names(), vec!["pressure", "pressure_alt"]);

        let lines = poll_once(&registry).await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["component"], "pressure");
        assert_eq!(
            lines[0]["readings"]["id"],
            serde_json::json!([1, 2, 3, 4, 5, 6, 7, 8])
        );

        let sensor = registry.get("pressure").unwrap();
        registry.close_all().await;
        assert_eq!(sensor.state().await, LifecycleState::Closed);
    }

    #[tokio::test]
    async fn test_failed_reading_is_reported() {
        let registry = build_components(
            model_registry().unwrap(),
            &config(
                r#"
                [[boards]]
                name = "local"
                i2c_buses = ["bus1"]
                response = [1, 2]

                [[components]]
                name = "pressure"
                model = "viamlabs:i2c:lps25h"
                [components.attributes]
                board = "local"
                i2c_bus = "bus1"
                "#,
            ),
        )
        .await
        .unwrap();

        let lines = poll_once(&registry).await;
        assert!(lines[0]["error"]
            .as_str()
            .unwrap()
            .contains("did not get 8 bytes"));
    }

    #[tokio::test]
    async fn test_poll_stops_after_count() {
        let registry = build_components(model_registry().unwrap(), &config(TWO_SENSORS))
            .await
            .unwrap();
        let rounds = poll(&registry, Duration::from_millis(1), Some(3))
            .await
            .unwrap();
        assert_eq!(rounds, 3);
    }
}
