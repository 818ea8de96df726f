//! Error types shared by sensor drivers and the host glue.
//!
//! [`SensorError`] is the single error type returned across crate boundaries.
//! Errors fall into two broad categories:
//!
//! 1. **Construction Errors** - `MissingField`, `InvalidConfig`, `DependencyNotFound`,
//!    `UnsupportedBoard`, `BusNotFound`, `Initialization`
//!    - Occur while a component is being validated or built
//!    - No partially-constructed driver is ever handed back
//!    - Recovery: fix the configuration or the wiring and rebuild
//!
//! 2. **Per-Call Errors** - `BusIo`, `ShortRead`, `Closed`
//!    - Occur while serving a call on a ready driver
//!    - The driver stays usable; retries are the caller's business
//!
//! Bus-level failures carry a structured [`BusError`] so callers can tell an
//! acquisition failure from a failed write or read.

use thiserror::Error;

// =============================================================================
// Bus Errors
// =============================================================================

/// Which step of a bus transaction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusErrorKind {
    /// Acquiring the addressed handle.
    Open,
    /// Writing bytes to the device.
    Write,
    /// Reading bytes from the device.
    Read,
    /// Releasing the handle.
    Close,
}

impl std::fmt::Display for BusErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BusErrorKind::Open => "open",
            BusErrorKind::Write => "write",
            BusErrorKind::Read => "read",
            BusErrorKind::Close => "close",
        };
        write!(f, "{}", label)
    }
}

/// Failure reported by a [`crate::bus::I2cBus`] or [`crate::bus::I2cHandle`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("i2c {kind} at address 0x{address:02x} failed: {message}")]
pub struct BusError {
    /// Transaction step that failed
    pub kind: BusErrorKind,
    /// 7-bit device address the handle was opened for
    pub address: u8,
    /// Provider-specific description
    pub message: String,
}

impl BusError {
    /// Create a new bus error.
    pub fn new(kind: BusErrorKind, address: u8, message: impl Into<String>) -> Self {
        Self {
            kind,
            address,
            message: message.into(),
        }
    }
}

// =============================================================================
// Sensor Errors
// =============================================================================

/// Convenience alias for results carrying a [`SensorError`].
pub type SensorResult<T> = std::result::Result<T, SensorError>;

/// Primary error type for sensor components.
#[derive(Error, Debug)]
pub enum SensorError {
    /// A required configuration attribute is absent or empty.
    ///
    /// Reported by validation, before any hardware is touched.
    #[error("{path}: \"{field}\" is required")]
    MissingField {
        /// Location of the offending configuration block
        path: String,
        /// Name of the missing attribute
        field: &'static str,
    },

    /// Attributes could not be deserialized into the driver's config type.
    #[error("{path}: invalid configuration: {message}")]
    InvalidConfig {
        /// Location of the offending configuration block
        path: String,
        /// Deserializer message
        message: String,
    },

    /// A named dependency was not supplied by the host.
    #[error("dependency \"{0}\" not found")]
    DependencyNotFound(String),

    /// The board does not expose local addressed buses.
    #[error("board \"{0}\" is not local")]
    UnsupportedBoard(String),

    /// The board has no bus with the requested name.
    #[error("failed to find i2c bus \"{bus}\" on board \"{board}\"")]
    BusNotFound {
        /// Board that was searched
        board: String,
        /// Requested bus name
        bus: String,
    },

    /// The device could not be brought up during construction.
    #[error("{model} init failed: {source}")]
    Initialization {
        /// Model being constructed
        model: String,
        /// Underlying failure
        #[source]
        source: Box<SensorError>,
    },

    /// Handle acquisition, write, read or release failed.
    #[error(transparent)]
    BusIo(#[from] BusError),

    /// The device returned fewer bytes than the protocol requires.
    #[error("i2c read did not get {expected} bytes (got {actual})")]
    ShortRead {
        /// Bytes requested
        expected: usize,
        /// Bytes actually returned
        actual: usize,
    },

    /// The component has been closed by the host.
    #[error("component \"{0}\" is closed")]
    Closed(String),

    /// No factory is registered for the requested model.
    #[error("no factory registered for model {0}")]
    UnknownModel(String),

    /// A factory for the model is already registered.
    #[error("model {0} is already registered")]
    DuplicateModel(String),

    /// A component with this name already exists.
    #[error("component \"{0}\" already exists")]
    DuplicateComponent(String),

    /// No component with this name exists.
    #[error("component \"{0}\" not found")]
    ComponentNotFound(String),
}

impl SensorError {
    /// Wrap a failure raised while bringing `model` up.
    pub fn initialization(model: impl Into<String>, source: SensorError) -> Self {
        SensorError::Initialization {
            model: model.into(),
            source: Box::new(source),
        }
    }

    /// True for errors raised before a driver exists.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            SensorError::MissingField { .. }
                | SensorError::InvalidConfig { .. }
                | SensorError::DependencyNotFound(_)
                | SensorError::UnsupportedBoard(_)
                | SensorError::BusNotFound { .. }
                | SensorError::Initialization { .. }
        )
    }
}
