//! Relay driver trait

use antswitch_core::ConnectionGrid;
use tracing::info;

use crate::map::RelayMap;

/// Physical actuation of the switch matrix
///
/// Called synchronously by the switch engine after every committed change,
/// with the full resulting grid. Implementations must not fail: hardware
/// faults are logged and otherwise ignored.
pub trait RelayDriver: Send {
    /// Drive the relays to match `grid`
    fn apply_grid(&mut self, grid: &ConnectionGrid);

    /// Short description for logs
    fn describe(&self) -> String;
}

impl<D: RelayDriver + ?Sized> RelayDriver for Box<D> {
    fn apply_grid(&mut self, grid: &ConnectionGrid) {
        (**self).apply_grid(grid)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Driver that only logs the coil levels it would set
#[derive(Debug, Clone, Default)]
pub struct LoggingRelays {
    map: RelayMap,
}

impl LoggingRelays {
    /// Create with a relay map
    pub fn new(map: RelayMap) -> Self {
        Self { map }
    }
}

impl RelayDriver for LoggingRelays {
    fn apply_grid(&mut self, grid: &ConnectionGrid) {
        info!(
            "Relays -> {} (coils {:08b})",
            grid,
            self.map.bitmask(grid)
        );
    }

    fn describe(&self) -> String {
        "logging relays".to_string()
    }
}
