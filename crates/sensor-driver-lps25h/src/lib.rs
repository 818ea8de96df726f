//! ST LPS25H Barometric Pressure Sensor Driver
//!
//! Driver for the LPS25H pressure/temperature sensor on a local i2c bus,
//! exposed to the host as the `viamlabs:i2c:lps25h` model.
//!
//! # Configuration
//!
//! ```toml
//! [[components]]
//! name = "pressure"
//! model = "viamlabs:i2c:lps25h"
//!
//! [components.attributes]
//! board = "local"
//! i2c_bus = "bus1"
//! i2c_addr = 0x5c
//! ```
//!
//! # Registration
//!
//! ```rust,ignore
//! use sensor_core::ModelRegistry;
//! use sensor_driver_lps25h::Lps25hFactory;
//!
//! let mut registry = ModelRegistry::new();
//! registry.register_factory(Box::new(Lps25hFactory))?;
//! ```
//!
//! # Readings
//!
//! Each reading runs one bus transaction and returns the eight raw bytes under
//! `"id"`. Pressure and temperature are not decoded yet.

pub mod config;
pub mod driver;
pub mod factory;
mod lifecycle;
pub mod registers;

pub use config::Lps25hConfig;
pub use driver::Lps25hDriver;
pub use factory::{lps25h_model, Lps25hFactory};
