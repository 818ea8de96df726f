//! Mock I2C bus and handles.
//!
//! [`MockI2cBus`] hands out exclusive [`MockI2cHandle`]s: opening a handle
//! waits until every other handle on the same bus has been released, the way
//! a real provider arbitrates the shared bus. Every call is recorded in a
//! [`BusLog`] and can be failed through an [`ErrorConfig`].
//!
//! Reads return the configured response bytes, truncated to the requested
//! length. Configure a response shorter than the driver asks for to simulate
//! a short read.

use crate::common::errors::ErrorConfig;
use crate::common::log::{BusEvent, BusLog};
use async_trait::async_trait;
use parking_lot::Mutex;
use sensor_core::bus::{I2cBus, I2cHandle};
use sensor_core::error::{BusError, BusErrorKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OwnedMutexGuard;

/// Default bytes returned by reads when no response is configured.
pub const DEFAULT_RESPONSE: [u8; 8] = [0; 8];

#[derive(Debug, Default)]
struct HandleCounters {
    /// Handles currently held
    open: AtomicUsize,
    /// Handles dropped without `close()`
    leaked: AtomicUsize,
}

/// Simulated shared I2C bus.
#[derive(Debug)]
pub struct MockI2cBus {
    name: String,
    arbitration: Arc<tokio::sync::Mutex<()>>,
    response: Arc<Mutex<Vec<u8>>>,
    latency: Duration,
    errors: ErrorConfig,
    log: BusLog,
    counters: Arc<HandleCounters>,
}

impl MockI2cBus {
    /// Create a bus with default response, no latency and no faults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arbitration: Arc::new(tokio::sync::Mutex::new(())),
            response: Arc::new(Mutex::new(DEFAULT_RESPONSE.to_vec())),
            latency: Duration::ZERO,
            errors: ErrorConfig::none(),
            log: BusLog::new(),
            counters: Arc::new(HandleCounters::default()),
        }
    }

    /// Bytes returned by subsequent reads.
    pub fn with_response(self, response: impl Into<Vec<u8>>) -> Self {
        *self.response.lock() = response.into();
        self
    }

    /// Delay applied to every write and read.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Fault injection for every operation.
    pub fn with_errors(mut self, errors: ErrorConfig) -> Self {
        self.errors = errors;
        self
    }

    /// Record calls into an existing log (e.g. one shared by several buses).
    pub fn with_log(mut self, log: BusLog) -> Self {
        self.log = log;
        self
    }

    /// Bus name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the bytes returned by subsequent reads.
    pub fn set_response(&self, response: impl Into<Vec<u8>>) {
        *self.response.lock() = response.into();
    }

    /// Log of every call made against this bus.
    pub fn log(&self) -> &BusLog {
        &self.log
    }

    /// Fault injection configuration (reset it between test phases).
    pub fn errors(&self) -> &ErrorConfig {
        &self.errors
    }

    /// Handles currently held.
    pub fn open_handles(&self) -> usize {
        self.counters.open.load(Ordering::Acquire)
    }

    /// Handles that were dropped without being closed.
    pub fn leaked_handles(&self) -> usize {
        self.counters.leaked.load(Ordering::Acquire)
    }
}

#[async_trait]
impl I2cBus for MockI2cBus {
    async fn open_handle(&self, address: u8) -> Result<Box<dyn I2cHandle>, BusError> {
        self.log.record(BusEvent::Open { address });
        self.errors.check_operation(BusErrorKind::Open, address)?;

        let guard = self.arbitration.clone().lock_owned().await;
        self.counters.open.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(bus = %self.name, address, "Opened mock i2c handle");

        Ok(Box::new(MockI2cHandle {
            address,
            response: self.response.clone(),
            latency: self.latency,
            errors: self.errors.clone(),
            log: self.log.clone(),
            counters: self.counters.clone(),
            guard: Some(guard),
        }))
    }
}

/// Exclusive handle on a [`MockI2cBus`] for one address.
pub struct MockI2cHandle {
    address: u8,
    response: Arc<Mutex<Vec<u8>>>,
    latency: Duration,
    errors: ErrorConfig,
    log: BusLog,
    counters: Arc<HandleCounters>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl MockI2cHandle {
    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn release(&mut self) {
        if self.guard.take().is_some() {
            self.counters.open.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

#[async_trait]
impl I2cHandle for MockI2cHandle {
    async fn write(&mut self, data: &[u8]) -> Result<(), BusError> {
        self.log.record(BusEvent::Write {
            address: self.address,
            data: data.to_vec(),
        });
        self.simulate_latency().await;
        self.errors.check_operation(BusErrorKind::Write, self.address)
    }

    async fn read(&mut self, count: usize) -> Result<Vec<u8>, BusError> {
        self.log.record(BusEvent::Read {
            address: self.address,
            count,
        });
        self.simulate_latency().await;
        self.errors.check_operation(BusErrorKind::Read, self.address)?;

        let response = self.response.lock();
        Ok(response.iter().take(count).copied().collect())
    }

    async fn close(mut self: Box<Self>) -> Result<(), BusError> {
        self.log.record(BusEvent::Close {
            address: self.address,
        });
        // The lease is released even when the injected close fails.
        self.release();
        self.errors.check_operation(BusErrorKind::Close, self.address)
    }
}

impl Drop for MockI2cHandle {
    fn drop(&mut self) {
        if self.guard.is_some() {
            self.counters.leaked.fetch_add(1, Ordering::AcqRel);
            tracing::warn!(address = self.address, "Mock i2c handle dropped without close");
            self.release();
        }
    }
}
