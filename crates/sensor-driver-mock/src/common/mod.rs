//! Common infrastructure for mock buses.
//!
//! - **errors**: Fault injection framework
//! - **log**: Recording of bus calls
//! - **rng**: Seeded random number generator

pub mod errors;
pub mod log;
pub mod rng;

// Re-export commonly used types
pub use errors::{ErrorConfig, ErrorScenario};
pub use log::{BusEvent, BusLog};
pub use rng::MockRng;
