//! Board and I2C Bus Contracts
//!
//! These traits describe what a driver consumes from the Bus Handle Provider.
//! Providers (a real board runtime, or the in-memory boards in
//! `sensor-driver-mock`) implement them; drivers only call them.
//!
//! ```text
//! Board ──as_local()──▶ LocalBoard ──i2c_by_name()──▶ I2cBus ──open_handle(addr)──▶ I2cHandle
//!                                                                                     │
//!                                                          write / read ... close ◀───┘
//! ```
//!
//! # Handle Discipline
//!
//! An [`I2cHandle`] is a scoped, exclusive lease on the bus for one device
//! address. It must be released with [`I2cHandle::close`] on every exit path,
//! success or failure, so other devices sharing the bus can proceed. Drivers
//! must never keep a handle across calls.

use crate::error::BusError;
use async_trait::async_trait;
use std::sync::Arc;

/// Scoped, exclusive access to one addressed device on a shared bus.
#[async_trait]
pub trait I2cHandle: Send {
    /// Write a byte sequence to the device.
    async fn write(&mut self, data: &[u8]) -> Result<(), BusError>;

    /// Read `count` bytes from the device.
    ///
    /// Providers may return fewer bytes than requested; callers decide
    /// whether a short buffer is an error.
    async fn read(&mut self, count: usize) -> Result<Vec<u8>, BusError>;

    /// Release the lease.
    ///
    /// Consumes the handle so it cannot be used after release.
    async fn close(self: Box<Self>) -> Result<(), BusError>;
}

/// A shared two-wire bus that hands out addressed handles.
#[async_trait]
pub trait I2cBus: Send + Sync {
    /// Acquire an exclusive handle addressed to `address`.
    ///
    /// Blocks until the bus is free; there is no timeout at this layer.
    async fn open_handle(&self, address: u8) -> Result<Box<dyn I2cHandle>, BusError>;
}

/// A board resource as handed to drivers through dependencies.
pub trait Board: Send + Sync {
    /// Name the host registered this board under.
    fn name(&self) -> &str;

    /// Local bus access capability.
    ///
    /// Boards that can address local buses return `Some(self)`. Remote or
    /// proxy boards keep the default.
    fn as_local(&self) -> Option<&dyn LocalBoard> {
        None
    }
}

/// Capability: direct access to the board's addressed buses.
pub trait LocalBoard: Board {
    /// Look up a bus by its configured name.
    fn i2c_by_name(&self, name: &str) -> Option<Arc<dyn I2cBus>>;

    /// Names of all buses on the board.
    fn i2c_names(&self) -> Vec<String>;
}
