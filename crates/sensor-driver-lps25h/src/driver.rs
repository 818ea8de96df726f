//! LPS25H driver.
//!
//! The driver holds a shared reference to the bus and opens an exclusive
//! handle for every transaction, closing it again on every exit path. One
//! async mutex serializes all bus access and lifecycle changes, so at most one
//! open → write → read → close sequence is in flight per instance.
//!
//! # Read Protocol
//!
//! 1. Open a handle at the device address
//! 2. Write [`MEASUREMENT_TRIGGER_REG`] (failures are logged and ignored)
//! 3. Read [`MEASUREMENT_LEN`] bytes
//! 4. Close the handle
//!
//! The raw bytes are returned verbatim under the `"id"` key. Pressure and
//! temperature are not decoded.

use crate::config::Lps25hConfig;
use crate::factory::lps25h_model;
use crate::registers::{DEFAULT_I2C_ADDR, MEASUREMENT_LEN, MEASUREMENT_TRIGGER_REG};
use sensor_core::bus::{I2cBus, I2cHandle};
use sensor_core::capabilities::{LifecycleState, Readings};
use sensor_core::error::{SensorError, SensorResult};
use sensor_core::resource::{Dependencies, ResourceName};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

/// Mutable state guarded by the instance mutex.
#[derive(Debug, Default)]
pub(crate) struct DriverState {
    /// Calibration coefficients, keyed by name
    pub(crate) calibration: HashMap<String, i32>,
    /// Last decoded temperature; `None` until a reading decodes one
    pub(crate) last_temperature: Option<f64>,
    pub(crate) lifecycle: LifecycleState,
}

/// Driver for the ST LPS25H barometric pressure sensor.
pub struct Lps25hDriver {
    name: ResourceName,
    /// Bus owned by the board; only borrowed per transaction
    bus: Arc<dyn I2cBus>,
    address: u8,
    state: Mutex<DriverState>,
}

impl Lps25hDriver {
    /// Resolve the bus, reset the device and return a ready driver.
    ///
    /// # Errors
    /// Returns error if:
    /// - The board is not among `dependencies` (`DependencyNotFound`)
    /// - The board has no local bus access (`UnsupportedBoard`)
    /// - The board has no bus named `config.i2c_bus` (`BusNotFound`)
    /// - The reset transaction fails (`Initialization`)
    ///
    /// Dependencies and the address are resolved before any bus access.
    pub async fn new(
        name: ResourceName,
        dependencies: &Dependencies,
        config: &Lps25hConfig,
    ) -> SensorResult<Arc<Self>> {
        let board = dependencies.board(&config.board)?;
        let local = board
            .as_local()
            .ok_or_else(|| SensorError::UnsupportedBoard(config.board.clone()))?;
        let bus = local
            .i2c_by_name(&config.i2c_bus)
            .ok_or_else(|| SensorError::BusNotFound {
                board: config.board.clone(),
                bus: config.i2c_bus.clone(),
            })?;

        let address = match config.configured_address() {
            Some(address) => address,
            None => {
                tracing::warn!(
                    component = %name,
                    "No i2c address configured, using default address 0x{:02x}",
                    DEFAULT_I2C_ADDR
                );
                DEFAULT_I2C_ADDR
            }
        };

        let driver = Self {
            name,
            bus,
            address,
            state: Mutex::new(DriverState::default()),
        };

        driver
            .reset()
            .await
            .map_err(|e| SensorError::initialization(lps25h_model().to_string(), e))?;
        driver.state.lock().await.lifecycle = LifecycleState::Ready;

        tracing::info!(
            component = %driver.name,
            board = %config.board,
            bus = %config.i2c_bus,
            address = format_args!("0x{:02x}", address),
            "LPS25H ready"
        );
        Ok(Arc::new(driver))
    }

    /// Host-assigned instance name.
    pub fn resource_name(&self) -> &ResourceName {
        &self.name
    }

    /// Device address in use.
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Last decoded temperature, if any reading has produced one.
    pub async fn last_temperature(&self) -> Option<f64> {
        self.state.lock().await.last_temperature
    }

    /// Snapshot of the calibration coefficients.
    pub async fn calibration(&self) -> HashMap<String, i32> {
        self.state.lock().await.calibration.clone()
    }

    /// Cycle a handle at the device address.
    ///
    /// The soft-reset write itself is not issued: the reset register for this
    /// part is unconfirmed. Opening and closing the handle still surfaces
    /// acquisition failures at construction time. Fails with `Closed`
    /// without touching the bus once the driver is closed.
    pub async fn reset(&self) -> SensorResult<()> {
        let state = self.state.lock().await;
        self.ensure_open(&state)?;
        let handle = self.bus.open_handle(self.address).await?;
        handle.close().await?;
        Ok(())
    }

    /// Run one measurement transaction and return the raw bytes.
    pub async fn read_measurement(&self) -> SensorResult<Vec<u8>> {
        let state = self.state.lock().await;
        self.ensure_open(&state)?;

        let mut handle = match self.bus.open_handle(self.address).await {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(
                    component = %self.name,
                    address = format_args!("0x{:02x}", self.address),
                    error = %e,
                    "Failed to open i2c handle"
                );
                return Err(e.into());
            }
        };

        let result = self.transact(handle.as_mut()).await;
        let closed = handle.close().await;

        match (result, closed) {
            (Ok(bytes), Ok(())) => Ok(bytes),
            (Ok(_), Err(close_err)) => Err(close_err.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close_err)) => {
                tracing::warn!(
                    component = %self.name,
                    error = %close_err,
                    "Failed to close i2c handle after failed read"
                );
                Err(e)
            }
        }
    }

    /// Take one reading: `{"id": [b0, ..., b7]}`.
    pub async fn read(&self) -> SensorResult<Readings> {
        let bytes = self.read_measurement().await?;
        let mut readings = Readings::new();
        readings.insert("id".to_string(), serde_json::Value::from(bytes));
        Ok(readings)
    }

    /// Trigger and read one measurement on an open handle.
    async fn transact(&self, handle: &mut dyn I2cHandle) -> SensorResult<Vec<u8>> {
        if let Err(e) = handle.write(&[MEASUREMENT_TRIGGER_REG]).await {
            tracing::debug!(
                component = %self.name,
                error = %e,
                "Measurement trigger write failed"
            );
        }

        let mut bytes = handle.read(MEASUREMENT_LEN).await?;
        if bytes.len() < MEASUREMENT_LEN {
            return Err(SensorError::ShortRead {
                expected: MEASUREMENT_LEN,
                actual: bytes.len(),
            });
        }
        bytes.truncate(MEASUREMENT_LEN);
        Ok(bytes)
    }

    pub(crate) async fn lock_state(&self) -> MutexGuard<'_, DriverState> {
        self.state.lock().await
    }

    pub(crate) fn ensure_open(&self, state: &DriverState) -> SensorResult<()> {
        if state.lifecycle == LifecycleState::Closed {
            return Err(SensorError::Closed(self.name.to_string()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Lps25hDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Lps25hDriver")
            .field("name", &self.name)
            .field("address", &format_args!("0x{:02x}", self.address))
            .finish_non_exhaustive()
    }
}
