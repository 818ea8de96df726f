//! Component factory for the `viamlabs:i2c:lps25h` model.

use crate::config::Lps25hConfig;
use crate::driver::Lps25hDriver;
use futures::future::BoxFuture;
use sensor_core::capabilities::Sensor;
use sensor_core::driver::{ComponentFactory, RebuildPolicy};
use sensor_core::error::SensorResult;
use sensor_core::resource::{Dependencies, Model, ResourceName};
use std::sync::Arc;

/// Model namespace.
pub const MODEL_NAMESPACE: &str = "viamlabs";
/// Model family.
pub const MODEL_FAMILY: &str = "i2c";
/// Model name.
pub const MODEL_NAME: &str = "lps25h";

/// The `viamlabs:i2c:lps25h` model.
pub fn lps25h_model() -> Model {
    Model::new(MODEL_NAMESPACE, MODEL_FAMILY, MODEL_NAME)
}

/// Factory for creating LPS25H sensor instances.
pub struct Lps25hFactory;

impl ComponentFactory for Lps25hFactory {
    fn model(&self) -> Model {
        lps25h_model()
    }

    fn name(&self) -> &'static str {
        "ST LPS25H Pressure Sensor"
    }

    fn rebuild_policy(&self) -> RebuildPolicy {
        RebuildPolicy::AlwaysRebuild
    }

    fn validate(&self, path: &str, attributes: &toml::Value) -> SensorResult<Vec<String>> {
        Lps25hConfig::from_attributes(path, attributes)?.validate(path)
    }

    fn build(
        &self,
        name: ResourceName,
        dependencies: Dependencies,
        attributes: toml::Value,
    ) -> BoxFuture<'static, SensorResult<Arc<dyn Sensor>>> {
        Box::pin(async move {
            let path = format!("components.{}", name);
            let config = Lps25hConfig::from_attributes(&path, &attributes)?;
            config.validate(&path)?;

            let driver = Lps25hDriver::new(name, &dependencies, &config).await?;
            Ok(driver as Arc<dyn Sensor>)
        })
    }
}
