//! Model and Component Registries
//!
//! Host-side bookkeeping for component models and built instances.
//!
//! - [`ModelRegistry`] maps a [`Model`] triple to the factory that builds it.
//!   It is an ordinary value owned by the composition root and populated by
//!   explicit `register_factory` calls.
//! - [`ComponentRegistry`] owns the built instances by name and applies
//!   configuration changes according to each factory's [`RebuildPolicy`].
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use sensor_core::registry::{ComponentRegistry, ModelRegistry};
//!
//! let mut models = ModelRegistry::new();
//! models.register_factory(Box::new(Lps25hFactory))?;
//!
//! let mut components = ComponentRegistry::new(models);
//! components.add(config, &dependencies).await?;
//!
//! let sensor = components.get("pressure").unwrap();
//! let readings = sensor.readings(&Extra::new()).await?;
//! ```

use crate::capabilities::Sensor;
use crate::driver::{ComponentFactory, RebuildPolicy};
use crate::error::{SensorError, SensorResult};
use crate::resource::{ComponentConfig, Dependencies, Model};
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Model Registry
// =============================================================================

/// Registered component factories, keyed by model.
#[derive(Default)]
pub struct ModelRegistry {
    factories: HashMap<Model, Box<dyn ComponentFactory>>,
}

impl ModelRegistry {
    /// Create an empty model registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under its model.
    ///
    /// # Errors
    /// Returns [`SensorError::DuplicateModel`] if the model is already taken.
    pub fn register_factory(&mut self, factory: Box<dyn ComponentFactory>) -> SensorResult<()> {
        let model = factory.model();
        if self.factories.contains_key(&model) {
            return Err(SensorError::DuplicateModel(model.to_string()));
        }
        tracing::debug!(model = %model, name = factory.name(), "Registered component model");
        self.factories.insert(model, factory);
        Ok(())
    }

    /// Look up the factory for a model.
    pub fn factory(&self, model: &Model) -> SensorResult<&dyn ComponentFactory> {
        self.factories
            .get(model)
            .map(|f| f.as_ref())
            .ok_or_else(|| SensorError::UnknownModel(model.to_string()))
    }

    /// All registered models, sorted by their display form.
    pub fn models(&self) -> Vec<Model> {
        let mut models: Vec<Model> = self.factories.keys().cloned().collect();
        models.sort_by_key(|m| m.to_string());
        models
    }

    /// Validate a component configuration and return its dependency names.
    pub fn validate(&self, config: &ComponentConfig) -> SensorResult<Vec<String>> {
        self.factory(&config.model)?
            .validate(&config.path(), &config.attributes)
    }

    /// Validate, narrow the dependencies to what the validator asked for, and build.
    pub async fn build(
        &self,
        config: &ComponentConfig,
        dependencies: &Dependencies,
    ) -> SensorResult<Arc<dyn Sensor>> {
        let factory = self.factory(&config.model)?;
        let names = factory.validate(&config.path(), &config.attributes)?;
        let deps = dependencies.subset(&names)?;

        tracing::info!(
            component = %config.name,
            model = %config.model,
            dependencies = ?names,
            "Building component"
        );
        factory
            .build(config.resource_name(), deps, config.attributes.clone())
            .await
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

// =============================================================================
// Component Registry
// =============================================================================

struct RegisteredComponent {
    config: ComponentConfig,
    sensor: Arc<dyn Sensor>,
}

/// Built component instances, keyed by name.
pub struct ComponentRegistry {
    models: ModelRegistry,
    components: HashMap<String, RegisteredComponent>,
}

impl ComponentRegistry {
    /// Create an empty component registry backed by `models`.
    pub fn new(models: ModelRegistry) -> Self {
        Self {
            models,
            components: HashMap::new(),
        }
    }

    /// The backing model registry.
    pub fn models(&self) -> &ModelRegistry {
        &self.models
    }

    /// Build and register a component.
    ///
    /// # Errors
    /// Returns error if:
    /// - A component with the same name already exists
    /// - Validation or dependency resolution fails
    /// - The driver fails to initialize
    pub async fn add(
        &mut self,
        config: ComponentConfig,
        dependencies: &Dependencies,
    ) -> SensorResult<Arc<dyn Sensor>> {
        if self.components.contains_key(&config.name) {
            return Err(SensorError::DuplicateComponent(config.name));
        }

        let sensor = self.models.build(&config, dependencies).await?;
        self.components.insert(
            config.name.clone(),
            RegisteredComponent {
                config,
                sensor: sensor.clone(),
            },
        );
        Ok(sensor)
    }

    /// Get a component by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Sensor>> {
        self.components.get(name).map(|c| c.sensor.clone())
    }

    /// Names of all components, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.components.keys().cloned().collect();
        names.sort();
        names
    }

    /// Apply a changed configuration to an existing component.
    ///
    /// Unchanged configurations are ignored. Components whose factory
    /// declares [`RebuildPolicy::AlwaysRebuild`], or whose model changed, are
    /// rebuilt: the replacement is built first and the old instance is closed
    /// only once the replacement is ready, so a failed rebuild leaves the old
    /// instance serving. Everything else is reconfigured in place.
    pub async fn reconfigure(
        &mut self,
        config: ComponentConfig,
        dependencies: &Dependencies,
    ) -> SensorResult<()> {
        let existing = self
            .components
            .get(&config.name)
            .ok_or_else(|| SensorError::ComponentNotFound(config.name.clone()))?;

        if existing.config == config {
            tracing::debug!(component = %config.name, "Configuration unchanged");
            return Ok(());
        }

        let policy = self.models.factory(&config.model)?.rebuild_policy();
        let rebuild = policy == RebuildPolicy::AlwaysRebuild || existing.config.model != config.model;

        if !rebuild {
            let names = self.models.validate(&config)?;
            let deps = dependencies.subset(&names)?;
            existing.sensor.reconfigure(&deps, &config).await?;
            if let Some(entry) = self.components.get_mut(&config.name) {
                entry.config = config;
            }
            return Ok(());
        }

        tracing::info!(component = %config.name, "Rebuilding component for new configuration");
        let replacement = self.models.build(&config, dependencies).await?;
        let old = self.components.insert(
            config.name.clone(),
            RegisteredComponent {
                config,
                sensor: replacement,
            },
        );
        if let Some(old) = old {
            if let Err(e) = old.sensor.close().await {
                tracing::warn!(component = %old.config.name, error = %e, "Failed to close replaced component");
            }
        }
        Ok(())
    }

    /// Close and remove a component.
    pub async fn remove(&mut self, name: &str) -> SensorResult<()> {
        let entry = self
            .components
            .remove(name)
            .ok_or_else(|| SensorError::ComponentNotFound(name.to_string()))?;
        entry.sensor.close().await
    }

    /// Close and remove every component, logging failures.
    pub async fn close_all(&mut self) {
        for (name, entry) in self.components.drain() {
            if let Err(e) = entry.sensor.close().await {
                tracing::warn!(component = %name, error = %e, "Failed to close component");
            }
        }
    }

    /// Number of built components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// True when no component is built.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Board;
    use crate::capabilities::{Extra, LifecycleState, Readings};
    use crate::resource::ResourceName;
    use async_trait::async_trait;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    struct NamedBoard(&'static str);

    impl Board for NamedBoard {
        fn name(&self) -> &str {
            self.0
        }
    }

    struct CountingSensor {
        name: ResourceName,
        reconfigures: AtomicUsize,
        state: Mutex<LifecycleState>,
    }

    #[async_trait]
    impl Sensor for CountingSensor {
        fn name(&self) -> &ResourceName {
            &self.name
        }

        async fn readings(&self, _extra: &Extra) -> SensorResult<Readings> {
            Ok(Readings::new())
        }

        async fn reconfigure(
            &self,
            _dependencies: &Dependencies,
            _config: &ComponentConfig,
        ) -> SensorResult<()> {
            self.reconfigures.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn close(&self) -> SensorResult<()> {
            *self.state.lock().await = LifecycleState::Closed;
            Ok(())
        }

        async fn state(&self) -> LifecycleState {
            *self.state.lock().await
        }
    }

    struct CountingFactory {
        policy: RebuildPolicy,
        builds: Arc<AtomicUsize>,
    }

    impl ComponentFactory for CountingFactory {
        fn model(&self) -> Model {
            Model::new("test", "fake", "counting")
        }

        fn name(&self) -> &'static str {
            "Counting Sensor"
        }

        fn rebuild_policy(&self) -> RebuildPolicy {
            self.policy
        }

        fn validate(&self, path: &str, attributes: &toml::Value) -> SensorResult<Vec<String>> {
            match attributes.get("board").and_then(|v| v.as_str()) {
                Some(board) if !board.is_empty() => Ok(vec![board.to_string()]),
                _ => Err(SensorError::MissingField {
                    path: path.to_string(),
                    field: "board",
                }),
            }
        }

        fn build(
            &self,
            name: ResourceName,
            _dependencies: Dependencies,
            _attributes: toml::Value,
        ) -> BoxFuture<'static, SensorResult<Arc<dyn Sensor>>> {
            let builds = self.builds.clone();
            Box::pin(async move {
                builds.fetch_add(1, Ordering::SeqCst);
                let sensor: Arc<dyn Sensor> = Arc::new(CountingSensor {
                    name,
                    reconfigures: AtomicUsize::new(0),
                    state: Mutex::new(LifecycleState::Ready),
                });
                Ok(sensor)
            })
        }
    }

    fn registry(policy: RebuildPolicy) -> (ComponentRegistry, Arc<AtomicUsize>) {
        let builds = Arc::new(AtomicUsize::new(0));
        let mut models = ModelRegistry::new();
        models
            .register_factory(Box::new(CountingFactory {
                policy,
                builds: builds.clone(),
            }))
            .unwrap();
        (ComponentRegistry::new(models), builds)
    }

    fn config(board: &str, extra: i64) -> ComponentConfig {
        let mut table = toml::map::Map::new();
        table.insert("board".into(), toml::Value::String(board.into()));
        table.insert("extra".into(), toml::Value::Integer(extra));
        ComponentConfig::new(
            "fake",
            Model::new("test", "fake", "counting"),
            toml::Value::Table(table),
        )
    }

    fn deps() -> Dependencies {
        Dependencies::new()
            .with_board(Arc::new(NamedBoard("local")))
            .with_board(Arc::new(NamedBoard("other")))
    }

    #[test]
    fn test_duplicate_model_rejected() {
        let (mut components, _) = registry(RebuildPolicy::InPlace);
        let err = components
            .models
            .register_factory(Box::new(CountingFactory {
                policy: RebuildPolicy::InPlace,
                builds: Arc::new(AtomicUsize::new(0)),
            }))
            .unwrap_err();
        assert!(matches!(err, SensorError::DuplicateModel(_)));
        assert_eq!(components.models().len(), 1);
    }

    #[test]
    fn test_unknown_model() {
        let models = ModelRegistry::new();
        let cfg = config("local", 0);
        assert!(matches!(
            models.validate(&cfg),
            Err(SensorError::UnknownModel(m)) if m == "test:fake:counting"
        ));
    }

    #[tokio::test]
    async fn test_add_and_get() {
        let (mut components, builds) = registry(RebuildPolicy::InPlace);
        components.add(config("local", 0), &deps()).await.unwrap();

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(components.names(), vec!["fake".to_string()]);
        let sensor = components.get("fake").unwrap();
        assert_eq!(sensor.state().await, LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_add_duplicate_component() {
        let (mut components, _) = registry(RebuildPolicy::InPlace);
        components.add(config("local", 0), &deps()).await.unwrap();
        let err = components
            .add(config("local", 0), &deps())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SensorError::DuplicateComponent(_)));
    }

    #[tokio::test]
    async fn test_add_missing_dependency() {
        let (mut components, builds) = registry(RebuildPolicy::InPlace);
        let err = components
            .add(config("absent", 0), &deps())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, SensorError::DependencyNotFound(name) if name == "absent"));
        assert_eq!(builds.load(Ordering::SeqCst), 0);
        assert!(components.is_empty());
    }

    #[tokio::test]
    async fn test_reconfigure_in_place() {
        let (mut components, builds) = registry(RebuildPolicy::InPlace);
        components.add(config("local", 0), &deps()).await.unwrap();
        let before = components.get("fake").unwrap();

        components.reconfigure(config("local", 1), &deps()).await.unwrap();

        let after = components.get("fake").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(builds.load(Ordering::SeqCst), 1);
        assert_eq!(after.state().await, LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_reconfigure_always_rebuild() {
        let (mut components, builds) = registry(RebuildPolicy::AlwaysRebuild);
        components.add(config("local", 0), &deps()).await.unwrap();
        let before = components.get("fake").unwrap();

        components.reconfigure(config("other", 0), &deps()).await.unwrap();

        let after = components.get("fake").unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(builds.load(Ordering::SeqCst), 2);
        assert_eq!(before.state().await, LifecycleState::Closed);
        assert_eq!(after.state().await, LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_reconfigure_unchanged_is_noop() {
        let (mut components, builds) = registry(RebuildPolicy::AlwaysRebuild);
        components.add(config("local", 0), &deps()).await.unwrap();
        components.reconfigure(config("local", 0), &deps()).await.unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_rebuild_keeps_old_instance() {
        let (mut components, _) = registry(RebuildPolicy::AlwaysRebuild);
        components.add(config("local", 0), &deps()).await.unwrap();
        let before = components.get("fake").unwrap();

        let err = components
            .reconfigure(config("", 0), &deps())
            .await
            .unwrap_err();
        assert!(matches!(err, SensorError::MissingField { field: "board", .. }));

        let after = components.get("fake").unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.state().await, LifecycleState::Ready);
    }

    #[tokio::test]
    async fn test_remove_and_close_all() {
        let (mut components, _) = registry(RebuildPolicy::InPlace);
        components.add(config("local", 0), &deps()).await.unwrap();
        let sensor = components.get("fake").unwrap();

        components.remove("fake").await.unwrap();
        assert_eq!(sensor.state().await, LifecycleState::Closed);
        assert!(matches!(
            components.remove("fake").await,
            Err(SensorError::ComponentNotFound(_))
        ));

        components.add(config("local", 0), &deps()).await.unwrap();
        components.close_all().await;
        assert!(components.is_empty());
    }
}
