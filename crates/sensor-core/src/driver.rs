//! Component Factory
//!
//! Drivers implement [`ComponentFactory`] and are registered with the
//! [`crate::registry::ModelRegistry`] at startup via explicit
//! `registry.register_factory(factory)` calls. Nothing registers itself as a
//! side effect of being linked in.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Composition Root (main.rs)                   │
//! │  registry.register_factory(Box::new(Lps25hFactory))?;           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         ModelRegistry                           │
//! │  factories: HashMap<Model, Box<dyn ComponentFactory>>           │
//! └─────────────────────────────────────────────────────────────────┘
//!                                   │
//!                                   ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  validate() -> dependency names  ──host resolves──▶  build()    │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

use crate::capabilities::Sensor;
use crate::error::SensorResult;
use crate::resource::{Dependencies, Model, ResourceName};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How the host applies a configuration change to a built component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Call [`Sensor::reconfigure`] on the existing instance.
    #[default]
    InPlace,
    /// Close the existing instance and build a new one.
    AlwaysRebuild,
}

/// Trait for factories that create component instances of one model.
///
/// # Lifetime
///
/// Factories are registered once at startup and live for the program's
/// lifetime. They must be `Send + Sync + 'static` because the host may call
/// them from any task.
///
/// # Error Handling
///
/// `validate()` must be pure and report configuration problems before any
/// hardware is touched. `build()` reports dependency resolution failures and
/// hardware bring-up failures; it never hands back a half-built component.
pub trait ComponentFactory: Send + Sync + 'static {
    /// Model this factory builds.
    fn model(&self) -> Model;

    /// Human-readable name for documentation and error messages.
    ///
    /// Example: "ST LPS25H Pressure Sensor"
    fn name(&self) -> &'static str;

    /// How configuration changes are applied. Defaults to in-place.
    fn rebuild_policy(&self) -> RebuildPolicy {
        RebuildPolicy::InPlace
    }

    /// Validate attributes without instantiating.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the configuration block, used in messages
    /// * `attributes` - The component's `attributes` table
    ///
    /// # Returns
    ///
    /// The ordered names of the dependencies the host must resolve before
    /// calling [`ComponentFactory::build`].
    fn validate(&self, path: &str, attributes: &toml::Value) -> SensorResult<Vec<String>>;

    /// Async instantiation of the component.
    ///
    /// Called after validation passes with the resolved dependencies.
    fn build(
        &self,
        name: ResourceName,
        dependencies: Dependencies,
        attributes: toml::Value,
    ) -> BoxFuture<'static, SensorResult<Arc<dyn Sensor>>>;
}
