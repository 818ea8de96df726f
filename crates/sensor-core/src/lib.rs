//! `sensor-core`
//!
//! Core trait definitions and types for i2c sensor components.
//!
//! This crate is shared by drivers and the host glue. It defines the
//! contracts a driver consumes (boards, buses, scoped bus handles), the
//! capability a built component exposes ([`capabilities::Sensor`]), the
//! factory each driver registers ([`driver::ComponentFactory`]) and the
//! registries the host keeps.
//!
//! ## Key Types
//!
//! - [`bus::I2cBus`] / [`bus::I2cHandle`]: scoped, addressed bus access
//! - [`resource::Model`]: `namespace:family:name` model triple
//! - [`resource::Dependencies`]: resolved boards handed to constructors
//! - [`error::SensorError`]: error taxonomy for construction and per-call failures
//! - [`registry::ModelRegistry`]: explicit model → factory mapping

pub mod bus;
pub mod capabilities;
pub mod driver;
pub mod error;
pub mod registry;
pub mod resource;

pub use bus::{Board, I2cBus, I2cHandle, LocalBoard};
pub use capabilities::{Extra, LifecycleState, Readings, Sensor};
pub use driver::{ComponentFactory, RebuildPolicy};
pub use error::{BusError, BusErrorKind, SensorError, SensorResult};
pub use registry::{ComponentRegistry, ModelRegistry};
pub use resource::{ComponentConfig, Dependencies, Model, ResourceName};
