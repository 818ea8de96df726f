//! LPS25H component configuration.

use crate::registers::MAX_I2C_ADDR;
use sensor_core::error::{SensorError, SensorResult};
use serde::{Deserialize, Serialize};

/// Attributes of an LPS25H component.
///
/// ```toml
/// [components.attributes]
/// board = "local"
/// i2c_bus = "bus1"
/// i2c_addr = 0x5c   # optional, 0 or absent selects the default address
/// ```
///
/// Missing names deserialize to empty strings so that [`Lps25hConfig::validate`]
/// reports them as missing fields instead of parse errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lps25hConfig {
    /// Board that exposes the bus
    #[serde(default)]
    pub board: String,
    /// Bus name on that board
    #[serde(default)]
    pub i2c_bus: String,
    /// Device address; absent or 0 selects the default
    #[serde(default)]
    pub i2c_addr: Option<u8>,
}

impl Lps25hConfig {
    /// Deserialize a component's attributes table.
    ///
    /// Addresses must fit in 7 bits; larger values are `InvalidConfig`.
    pub fn from_attributes(path: &str, attributes: &toml::Value) -> SensorResult<Self> {
        let config: Self = attributes.clone().try_into().map_err(|e: toml::de::Error| {
            SensorError::InvalidConfig {
                path: path.to_string(),
                message: e.to_string(),
            }
        })?;

        if let Some(addr) = config.i2c_addr.filter(|addr| *addr > MAX_I2C_ADDR) {
            return Err(SensorError::InvalidConfig {
                path: path.to_string(),
                message: format!(
                    "i2c_addr 0x{:02x} is not a 7-bit address (max 0x{:02x})",
                    addr, MAX_I2C_ADDR
                ),
            });
        }
        Ok(config)
    }

    /// Check required fields and return the dependency names.
    ///
    /// The board is checked before the bus. The bus is reached through the
    /// board, so the board is the only dependency.
    pub fn validate(&self, path: &str) -> SensorResult<Vec<String>> {
        if self.board.is_empty() {
            return Err(SensorError::MissingField {
                path: path.to_string(),
                field: "board",
            });
        }
        if self.i2c_bus.is_empty() {
            return Err(SensorError::MissingField {
                path: path.to_string(),
                field: "i2c bus",
            });
        }
        Ok(vec![self.board.clone()])
    }

    /// Configured address, if one was given and is non-zero.
    pub fn configured_address(&self) -> Option<u8> {
        self.i2c_addr.filter(|addr| *addr != 0)
    }
}
