//! Recording of bus calls for assertions in tests.

use parking_lot::Mutex;
use std::sync::Arc;

/// One call made against a mock bus or handle.
///
/// Events are recorded when the call is made, before any injected fault or
/// bus arbitration, so failing calls still show up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// `open_handle(address)`
    Open {
        /// Requested device address
        address: u8,
    },
    /// `write(data)`
    Write {
        /// Device address of the handle
        address: u8,
        /// Bytes written
        data: Vec<u8>,
    },
    /// `read(count)`
    Read {
        /// Device address of the handle
        address: u8,
        /// Bytes requested
        count: usize,
    },
    /// `close()`
    Close {
        /// Device address of the handle
        address: u8,
    },
}

impl BusEvent {
    /// Device address the event targeted.
    pub fn address(&self) -> u8 {
        match self {
            BusEvent::Open { address }
            | BusEvent::Write { address, .. }
            | BusEvent::Read { address, .. }
            | BusEvent::Close { address } => *address,
        }
    }

    /// True for `Open` events.
    pub fn is_open(&self) -> bool {
        matches!(self, BusEvent::Open { .. })
    }

    /// True for `Close` events.
    pub fn is_close(&self) -> bool {
        matches!(self, BusEvent::Close { .. })
    }
}

/// Shared, append-only record of bus calls.
#[derive(Debug, Clone, Default)]
pub struct BusLog {
    events: Arc<Mutex<Vec<BusEvent>>>,
}

impl BusLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn record(&self, event: BusEvent) {
        self.events.lock().push(event);
    }

    /// Snapshot of all events in call order.
    pub fn events(&self) -> Vec<BusEvent> {
        self.events.lock().clone()
    }

    /// Number of recorded events matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&BusEvent) -> bool) -> usize {
        self.events.lock().iter().filter(|e| predicate(e)).count()
    }

    /// Number of `Open` events.
    pub fn opens(&self) -> usize {
        self.count(BusEvent::is_open)
    }

    /// Number of `Close` events.
    pub fn closes(&self) -> usize {
        self.count(BusEvent::is_close)
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Split the log into transactions, each starting at an `Open`.
    ///
    /// Events recorded before the first `Open` are dropped.
    pub fn transactions(&self) -> Vec<Vec<BusEvent>> {
        let mut transactions: Vec<Vec<BusEvent>> = Vec::new();
        for event in self.events() {
            if event.is_open() {
                transactions.push(vec![event]);
            } else if let Some(current) = transactions.last_mut() {
                current.push(event);
            }
        }
        transactions
    }

    /// True if an `Open` was recorded while an earlier transaction had not
    /// yet been closed.
    pub fn interleaved(&self) -> bool {
        let mut in_flight = false;
        for event in self.events() {
            match event {
                BusEvent::Open { .. } if in_flight => return true,
                BusEvent::Open { .. } => in_flight = true,
                BusEvent::Close { .. } => in_flight = false,
                _ => {}
            }
        }
        false
    }
}
