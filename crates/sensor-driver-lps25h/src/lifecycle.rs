//! Binds [`Lps25hDriver`] into the host's component lifecycle.
//!
//! ```text
//! Uninitialized ──new()──▶ Ready ──close()──▶ Closed
//!                          │   ▲
//!                          └───┘ reconfigure() (no-op)
//! ```
//!
//! Configuration changes are applied by rebuilding the component (the factory
//! declares [`sensor_core::RebuildPolicy::AlwaysRebuild`]), so `reconfigure`
//! only takes the instance lock and returns.

use crate::driver::Lps25hDriver;
use async_trait::async_trait;
use sensor_core::capabilities::{Extra, LifecycleState, Readings, Sensor};
use sensor_core::error::SensorResult;
use sensor_core::resource::{ComponentConfig, Dependencies, ResourceName};

#[async_trait]
impl Sensor for Lps25hDriver {
    fn name(&self) -> &ResourceName {
        self.resource_name()
    }

    async fn readings(&self, _extra: &Extra) -> SensorResult<Readings> {
        self.read().await
    }

    async fn reconfigure(
        &self,
        _dependencies: &Dependencies,
        config: &ComponentConfig,
    ) -> SensorResult<()> {
        let state = self.lock_state().await;
        self.ensure_open(&state)?;
        tracing::debug!(
            component = %self.resource_name(),
            model = %config.model,
            "Reconfigure is a no-op, changes are applied by rebuilding"
        );
        Ok(())
    }

    async fn close(&self) -> SensorResult<()> {
        let mut state = self.lock_state().await;
        if state.lifecycle != LifecycleState::Closed {
            state.lifecycle = LifecycleState::Closed;
            tracing::info!(component = %self.resource_name(), "LPS25H closed");
        }
        Ok(())
    }

    async fn state(&self) -> LifecycleState {
        self.lock_state().await.lifecycle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Lps25hConfig;
    use sensor_core::error::SensorError;
    use sensor_driver_mock::{MockBoard, MockI2cBus};
    use std::sync::Arc;

    async fn ready_driver() -> (Arc<MockI2cBus>, Dependencies, Arc<Lps25hDriver>) {
        let bus = Arc::new(MockI2cBus::new("bus1"));
        let board = MockBoard::local("local").with_bus("bus1", bus.clone());
        let deps = Dependencies::new().with_board(Arc::new(board));
        let config = Lps25hConfig {
            board: "local".to_string(),
            i2c_bus: "bus1".to_string(),
            i2c_addr: None,
        };
        let driver = Lps25hDriver::new("pressure".into(), &deps, &config)
            .await
            .unwrap();
        (bus, deps, driver)
    }

    fn component_config() -> ComponentConfig {
        let attributes: toml::Value = toml::from_str(
            r#"
            board = "local"
            i2c_bus = "bus1"
            "#,
        )
        .unwrap();
        ComponentConfig::new("pressure", crate::lps25h_model(), attributes)
    }

    #[tokio::test]
    async fn test_reconfigure_is_noop() {
        let (bus, deps, driver) = ready_driver().await;
        let events_before = bus.log().events().len();

        driver.reconfigure(&deps, &component_config()).await.unwrap();

        assert_eq!(driver.state().await, LifecycleState::Ready);
        assert_eq!(bus.log().events().len(), events_before);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (_bus, _deps, driver) = ready_driver().await;
        assert_eq!(driver.state().await, LifecycleState::Ready);

        driver.close().await.unwrap();
        driver.close().await.unwrap();
        assert_eq!(driver.state().await, LifecycleState::Closed);
    }

    #[tokio::test]
    async fn test_calls_after_close_fail_without_bus_access() {
        let (bus, deps, driver) = ready_driver().await;
        driver.close().await.unwrap();
        bus.log().clear();

        let err = driver.readings(&Extra::new()).await.unwrap_err();
        assert!(matches!(err, SensorError::Closed(ref name) if name == "pressure"));

        let err = driver
            .reconfigure(&deps, &component_config())
            .await
            .unwrap_err();
        assert!(matches!(err, SensorError::Closed(_)));

        let err = driver.reset().await.unwrap_err();
        assert!(matches!(err, SensorError::Closed(_)));

        assert!(bus.log().events().is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_keeps_driver_ready() {
        let (bus, _deps, driver) = ready_driver().await;
        bus.set_response(vec![1, 2, 3]);

        assert!(driver.readings(&Extra::new()).await.is_err());
        assert_eq!(driver.state().await, LifecycleState::Ready);

        bus.set_response(vec![0; 8]);
        assert!(driver.readings(&Extra::new()).await.is_ok());
    }
}
