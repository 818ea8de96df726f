//! Resource naming, component configuration and dependency sets.

use crate::bus::Board;
use crate::error::{SensorError, SensorResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

// =============================================================================
// Model
// =============================================================================

/// A `(namespace, family, name)` triple identifying a component model.
///
/// Displayed and parsed as `namespace:family:name`, e.g. `viamlabs:i2c:lps25h`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Model {
    /// Organisation publishing the model
    pub namespace: String,
    /// Model family (usually the bus or product line)
    pub family: String,
    /// Model name
    pub name: String,
}

impl Model {
    /// Build a model triple.
    pub fn new(
        namespace: impl Into<String>,
        family: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            family: family.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.family, self.name)
    }
}

impl FromStr for Model {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [namespace, family, name]
                if !namespace.is_empty() && !family.is_empty() && !name.is_empty() =>
            {
                Ok(Model::new(*namespace, *family, *name))
            }
            _ => Err(format!(
                "invalid model '{}': expected 'namespace:family:name'",
                s
            )),
        }
    }
}

impl TryFrom<String> for Model {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        model.to_string()
    }
}

// =============================================================================
// Resource Name
// =============================================================================

/// Host-assigned name of one component instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    /// Wrap a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourceName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

// =============================================================================
// Component Configuration
// =============================================================================

/// Configuration the host hands over for one component instance.
///
/// ```toml
/// [[components]]
/// name = "pressure"
/// model = "viamlabs:i2c:lps25h"
///
/// [components.attributes]
/// board = "local"
/// i2c_bus = "bus1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Instance name
    pub name: String,
    /// Model the instance is built from
    pub model: Model,
    /// Driver-specific attributes (validated by the model's factory)
    #[serde(default = "empty_attributes")]
    pub attributes: toml::Value,
}

fn empty_attributes() -> toml::Value {
    toml::Value::Table(toml::map::Map::new())
}

impl ComponentConfig {
    /// Build a component configuration.
    pub fn new(name: impl Into<String>, model: Model, attributes: toml::Value) -> Self {
        Self {
            name: name.into(),
            model,
            attributes,
        }
    }

    /// Resource name of the instance.
    pub fn resource_name(&self) -> ResourceName {
        ResourceName::new(self.name.clone())
    }

    /// Location used in validation messages.
    pub fn path(&self) -> String {
        format!("components.{}", self.name)
    }
}

// =============================================================================
// Dependencies
// =============================================================================

/// Resolved dependencies handed to a constructor, keyed by name.
#[derive(Clone, Default)]
pub struct Dependencies {
    boards: HashMap<String, Arc<dyn Board>>,
}

impl Dependencies {
    /// Create an empty dependency set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a board under its own name (builder style).
    pub fn with_board(mut self, board: Arc<dyn Board>) -> Self {
        self.insert_board(board);
        self
    }

    /// Add a board under its own name.
    pub fn insert_board(&mut self, board: Arc<dyn Board>) {
        self.boards.insert(board.name().to_string(), board);
    }

    /// Look up a board by name.
    pub fn board(&self, name: &str) -> SensorResult<Arc<dyn Board>> {
        self.boards
            .get(name)
            .cloned()
            .ok_or_else(|| SensorError::DependencyNotFound(name.to_string()))
    }

    /// Keep only the named entries.
    ///
    /// Hosts use this to hand a constructor exactly the dependencies its
    /// validator asked for.
    pub fn subset(&self, names: &[String]) -> SensorResult<Dependencies> {
        let mut deps = Dependencies::new();
        for name in names {
            deps.insert_board(self.board(name)?);
        }
        Ok(deps)
    }

    /// Number of resolved dependencies.
    pub fn len(&self) -> usize {
        self.boards.len()
    }

    /// True when no dependency is present.
    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }
}

impl fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.boards.keys().collect();
        names.sort();
        f.debug_struct("Dependencies")
            .field("boards", &names)
            .finish()
    }
}
