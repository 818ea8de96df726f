//! Mock boards exposing named [`MockI2cBus`]es.
//!
//! A local board answers [`Board::as_local`] and hands out its buses by name.
//! A remote board exposes no local bus access at all, which lets tests drive
//! the "unsupported board" construction path.

use crate::common::errors::ErrorConfig;
use crate::mock_bus::{MockI2cBus, DEFAULT_RESPONSE};
use sensor_core::bus::{Board, I2cBus, LocalBoard};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Declarative definition of a mock board, as found in module configuration.
///
/// ```toml
/// [[boards]]
/// name = "local"
/// i2c_buses = ["bus1"]
/// response = [1, 2, 3, 4, 5, 6, 7, 8]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockBoardConfig {
    /// Board name used as the dependency name
    pub name: String,
    /// Whether the board exposes local bus access
    #[serde(default = "default_local")]
    pub local: bool,
    /// Names of the buses on the board
    #[serde(default)]
    pub i2c_buses: Vec<String>,
    /// Bytes returned by reads on every bus
    #[serde(default)]
    pub response: Option<Vec<u8>>,
    /// Per-call latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,
    /// Random failure rate applied to every bus operation (0.0 to 1.0)
    #[serde(default)]
    pub failure_rate: f64,
}

fn default_local() -> bool {
    true
}

/// Simulated board.
#[derive(Debug)]
pub struct MockBoard {
    name: String,
    local: bool,
    buses: BTreeMap<String, Arc<MockI2cBus>>,
}

impl MockBoard {
    /// A board with local bus access and no buses yet.
    pub fn local(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: true,
            buses: BTreeMap::new(),
        }
    }

    /// A board without local bus access.
    pub fn remote(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            local: false,
            buses: BTreeMap::new(),
        }
    }

    /// Attach a bus under `name`.
    pub fn with_bus(mut self, name: impl Into<String>, bus: Arc<MockI2cBus>) -> Self {
        self.buses.insert(name.into(), bus);
        self
    }

    /// Build a board from its configuration block.
    pub fn from_config(config: &MockBoardConfig) -> Self {
        let mut board = if config.local {
            Self::local(&config.name)
        } else {
            Self::remote(&config.name)
        };
        for bus_name in &config.i2c_buses {
            let errors = if config.failure_rate > 0.0 {
                ErrorConfig::random_failures(config.failure_rate)
            } else {
                ErrorConfig::none()
            };
            let bus = MockI2cBus::new(bus_name)
                .with_response(
                    config
                        .response
                        .clone()
                        .unwrap_or_else(|| DEFAULT_RESPONSE.to_vec()),
                )
                .with_latency(Duration::from_millis(config.latency_ms))
                .with_errors(errors);
            board = board.with_bus(bus_name, Arc::new(bus));
        }
        board
    }

    /// The concrete mock bus registered under `name`, for test assertions.
    pub fn mock_bus(&self, name: &str) -> Option<Arc<MockI2cBus>> {
        self.buses.get(name).cloned()
    }
}

impl Board for MockBoard {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_local(&self) -> Option<&dyn LocalBoard> {
        if self.local {
            Some(self as &dyn LocalBoard)
        } else {
            None
        }
    }
}

impl LocalBoard for MockBoard {
    fn i2c_by_name(&self, name: &str) -> Option<Arc<dyn I2cBus>> {
        self.buses
            .get(name)
            .map(|bus| bus.clone() as Arc<dyn I2cBus>)
    }

    fn i2c_names(&self) -> Vec<String> {
        self.buses.keys().cloned().collect()
    }
}
