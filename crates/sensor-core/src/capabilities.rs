//! Component Capabilities
//!
//! Capability traits a component exposes to the host once it is built.
//! Sensors implement [`Sensor`]; every component implements the lifecycle
//! calls ([`Sensor::reconfigure`] and [`Sensor::close`]).
//!
//! # Contract
//!
//! - All methods are async and take `&self`; implementations serialize
//!   hardware access internally
//! - Per-call failures are returned to the caller and never change the
//!   component's lifecycle state
//! - No retries or timeouts at this layer

use crate::error::SensorResult;
use crate::resource::{ComponentConfig, Dependencies, ResourceName};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named values returned by [`Sensor::readings`].
pub type Readings = HashMap<String, serde_json::Value>;

/// Free-form options passed alongside a call.
pub type Extra = HashMap<String, serde_json::Value>;

/// Lifecycle state of a built component.
///
/// ```text
/// Uninitialized ──construct ok──▶ Ready ──close──▶ Closed
///                                  │  ▲
///                                  └──┘ reconfigure
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Constructed but not yet brought up
    #[default]
    Uninitialized,
    /// Serving calls
    Ready,
    /// Torn down by the host
    Closed,
}

impl LifecycleState {
    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Closed => "closed",
        }
    }
}

/// Capability: Sensor Readout
///
/// Devices that return a set of named values per reading (temperature,
/// pressure, raw register dumps).
#[async_trait]
pub trait Sensor: Send + Sync {
    /// Host-assigned instance name.
    fn name(&self) -> &ResourceName;

    /// Take one reading.
    async fn readings(&self, extra: &Extra) -> SensorResult<Readings>;

    /// Apply a new configuration in place.
    ///
    /// Models that declare [`crate::driver::RebuildPolicy::AlwaysRebuild`]
    /// are rebuilt by the host instead and may treat this as a no-op.
    async fn reconfigure(
        &self,
        dependencies: &Dependencies,
        config: &ComponentConfig,
    ) -> SensorResult<()>;

    /// Tear the component down. Calling it twice is not an error.
    async fn close(&self) -> SensorResult<()>;

    /// Current lifecycle state.
    async fn state(&self) -> LifecycleState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_state_default() {
        assert_eq!(LifecycleState::default(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_lifecycle_state_serde() {
        let json = serde_json::to_string(&LifecycleState::Ready).unwrap();
        assert_eq!(json, "\"ready\"");

        let state: LifecycleState = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(state, LifecycleState::Closed);
        assert_eq!(state.name(), "closed");
    }
}
