//! Fault injection framework for mock buses.
//!
//! Enables configurable bus failures for exercising driver error paths.
//! Failures are reported as [`BusError`] so drivers see exactly what a real
//! provider would hand them.

use super::rng::MockRng;
use parking_lot::Mutex;
use sensor_core::error::{BusError, BusErrorKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Fault injection configuration for a mock bus
#[derive(Clone, Debug)]
pub struct ErrorConfig {
    /// Per-operation failure rate (0.0 to 1.0)
    failure_rates: Arc<HashMap<BusErrorKind, f64>>,
    /// Specific failure scenarios
    scenarios: Arc<Vec<ErrorScenario>>,
    /// RNG for failure decisions
    rng: Arc<MockRng>,
    /// State tracking for scenarios
    state: Arc<Mutex<ErrorState>>,
}

/// A deterministic failure scenario.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorScenario {
    /// Every call of this operation fails
    FailAlways {
        /// Operation to fail
        operation: BusErrorKind,
    },
    /// The next call of this operation fails, later ones succeed
    FailOnce {
        /// Operation to fail
        operation: BusErrorKind,
    },
    /// Fail after N successful calls of this operation
    FailAfterN {
        /// Operation to fail
        operation: BusErrorKind,
        /// Successful calls before failures start
        count: u32,
    },
    /// The first call of any operation fails and every later one fails too
    CommunicationLoss,
}

#[derive(Default, Debug)]
struct ErrorState {
    /// Operation counters for FailAfterN scenarios
    operation_counts: HashMap<BusErrorKind, u32>,
    /// FailOnce scenarios already fired, by scenario index
    fired_once: Vec<usize>,
    /// Whether communication is lost
    communication_lost: bool,
}

impl ErrorConfig {
    /// Create error config with no errors (default)
    pub fn none() -> Self {
        Self::scenarios(Vec::new())
    }

    /// Create error config with uniform random failures
    pub fn random_failures(rate: f64) -> Self {
        Self::random_failures_seeded(rate, None)
    }

    /// Create error config with uniform random failures and specific seed
    pub fn random_failures_seeded(rate: f64, seed: Option<u64>) -> Self {
        let rates = [
            BusErrorKind::Open,
            BusErrorKind::Write,
            BusErrorKind::Read,
            BusErrorKind::Close,
        ]
        .into_iter()
        .map(|op| (op, rate))
        .collect();
        Self {
            failure_rates: Arc::new(rates),
            scenarios: Arc::new(Vec::new()),
            rng: Arc::new(MockRng::new(seed)),
            state: Arc::new(Mutex::new(ErrorState::default())),
        }
    }

    /// Create error config with a single scenario
    pub fn scenario(scenario: ErrorScenario) -> Self {
        Self::scenarios(vec![scenario])
    }

    /// Create error config with multiple scenarios
    pub fn scenarios(scenarios: Vec<ErrorScenario>) -> Self {
        Self {
            failure_rates: Arc::new(HashMap::new()),
            scenarios: Arc::new(scenarios),
            rng: Arc::new(MockRng::new(None)),
            state: Arc::new(Mutex::new(ErrorState::default())),
        }
    }

    /// Check if an operation should fail and return the error to report
    pub fn check_operation(&self, operation: BusErrorKind, address: u8) -> Result<(), BusError> {
        let mut state = self.state.lock();

        if state.communication_lost {
            return Err(BusError::new(operation, address, "communication lost"));
        }

        let count = {
            let current = state.operation_counts.entry(operation).or_insert(0);
            *current += 1;
            *current
        };

        for (index, scenario) in self.scenarios.iter().enumerate() {
            match scenario {
                ErrorScenario::FailAlways { operation: op } if *op == operation => {
                    return Err(BusError::new(operation, address, "injected failure"));
                }
                ErrorScenario::FailOnce { operation: op }
                    if *op == operation && !state.fired_once.contains(&index) =>
                {
                    state.fired_once.push(index);
                    return Err(BusError::new(operation, address, "injected one-shot failure"));
                }
                ErrorScenario::FailAfterN {
                    operation: op,
                    count: limit,
                } if *op == operation && count > *limit => {
                    return Err(BusError::new(
                        operation,
                        address,
                        format!("injected failure after {} operations", limit),
                    ));
                }
                ErrorScenario::CommunicationLoss => {
                    state.communication_lost = true;
                    return Err(BusError::new(operation, address, "communication lost"));
                }
                _ => {}
            }
        }

        let rate = self.failure_rates.get(&operation).copied().unwrap_or(0.0);
        if self.rng.should_fail(rate) {
            return Err(BusError::new(
                operation,
                address,
                format!("random failure on {}", operation),
            ));
        }

        Ok(())
    }

    /// Reset error state (clear counters, fired scenarios, lost communication)
    pub fn reset(&self) {
        *self.state.lock() = ErrorState::default();
    }
}

impl Default for ErrorConfig {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_errors() {
        let config = ErrorConfig::none();
        for _ in 0..100 {
            assert!(config.check_operation(BusErrorKind::Read, 0x5c).is_ok());
        }
    }

    #[test]
    fn test_fail_always_only_hits_its_operation() {
        let config = ErrorConfig::scenario(ErrorScenario::FailAlways {
            operation: BusErrorKind::Write,
        });
        assert!(config.check_operation(BusErrorKind::Open, 0x5c).is_ok());
        let err = config.check_operation(BusErrorKind::Write, 0x5c).unwrap_err();
        assert_eq!(err.kind, BusErrorKind::Write);
        assert_eq!(err.address, 0x5c);
        assert!(config.check_operation(BusErrorKind::Write, 0x5c).is_err());
    }

    #[test]
    fn test_fail_once() {
        let config = ErrorConfig::scenario(ErrorScenario::FailOnce {
            operation: BusErrorKind::Open,
        });
        assert!(config.check_operation(BusErrorKind::Open, 0x5c).is_err());
        assert!(config.check_operation(BusErrorKind::Open, 0x5c).is_ok());

        config.reset();
        assert!(config.check_operation(BusErrorKind::Open, 0x5c).is_err());
    }

    #[test]
    fn test_fail_after_n() {
        let config = ErrorConfig::scenario(ErrorScenario::FailAfterN {
            operation: BusErrorKind::Read,
            count: 3,
        });

        for i in 0..3 {
            assert!(
                config.check_operation(BusErrorKind::Read, 0x5c).is_ok(),
                "Operation {} should succeed",
                i + 1
            );
        }
        assert!(config.check_operation(BusErrorKind::Read, 0x5c).is_err());
    }

    #[test]
    fn test_communication_loss_is_sticky() {
        let config = ErrorConfig::scenario(ErrorScenario::CommunicationLoss);
        assert!(config.check_operation(BusErrorKind::Open, 0x5c).is_err());
        assert!(config.check_operation(BusErrorKind::Close, 0x5c).is_err());

        config.reset();
        // The scenario fires again on the first call after a reset
        assert!(config.check_operation(BusErrorKind::Open, 0x5c).is_err());
    }

    #[test]
    fn test_random_failures() {
        let config = ErrorConfig::random_failures_seeded(0.5, Some(42));
        let mut failures = 0;
        for _ in 0..1000 {
            if config.check_operation(BusErrorKind::Read, 0x5c).is_err() {
                failures += 1;
            }
        }
        assert!(failures > 400 && failures < 600, "Got {} failures", failures);
    }
}
