//! Mock Boards and I2C Buses
//!
//! This crate provides simulated boards and buses for exercising sensor drivers
//! without physical hardware. All delays use `tokio::time::sleep`, never
//! `std::thread::sleep`.
//!
//! # Available Mocks
//!
//! - [`MockBoard`] - Local or remote board exposing named buses
//! - [`MockI2cBus`] - Shared bus handing out exclusive handles, one at a time
//! - [`MockI2cHandle`] - Addressed handle recording every write, read and close
//!
//! # Inspecting Bus Traffic
//!
//! Every call is recorded in a [`BusLog`], including calls that fail through
//! injected faults:
//!
//! ```rust,ignore
//! use sensor_driver_mock::{BusEvent, MockBoard, MockI2cBus};
//! use std::sync::Arc;
//!
//! let bus = Arc::new(MockI2cBus::new("bus1").with_response(vec![1, 2, 3, 4, 5, 6, 7, 8]));
//! let board = MockBoard::local("local").with_bus("bus1", bus.clone());
//! // ... drive a sensor built against `board` ...
//! assert_eq!(bus.log().opens(), bus.log().closes());
//! assert!(!bus.log().interleaved());
//! ```
//!
//! # Fault Injection
//!
//! [`ErrorConfig`] fails chosen operations deterministically
//! ([`ErrorScenario`]) or at random with a seeded RNG.

pub mod common;
mod mock_board;
mod mock_bus;

// Re-export common types
pub use common::{BusEvent, BusLog, ErrorConfig, ErrorScenario, MockRng};

// Re-export mock types
pub use mock_board::{MockBoard, MockBoardConfig};
pub use mock_bus::{MockI2cBus, MockI2cHandle, DEFAULT_RESPONSE};
