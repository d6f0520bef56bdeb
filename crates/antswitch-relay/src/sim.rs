//! Simulated relay bank
//!
//! Records every grid it is asked to apply. Clones share the same record, so
//! a test can hand one clone to the switch engine and inspect the other.

use std::sync::{Arc, Mutex, MutexGuard};

use antswitch_core::ConnectionGrid;
use tracing::debug;

use crate::driver::RelayDriver;
use crate::map::RelayMap;

#[derive(Debug, Default)]
struct SimState {
    applied: Vec<ConnectionGrid>,
    coils: u8,
}

/// In-memory relay bank
#[derive(Debug, Clone, Default)]
pub struct SimulatedRelays {
    map: RelayMap,
    state: Arc<Mutex<SimState>>,
}

impl SimulatedRelays {
    /// Create with the default relay map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a custom relay map
    pub fn with_map(map: RelayMap) -> Self {
        Self {
            map,
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every grid applied so far, oldest first
    pub fn applied(&self) -> Vec<ConnectionGrid> {
        self.lock().applied.clone()
    }

    /// Number of `apply_grid` calls
    pub fn apply_count(&self) -> usize {
        self.lock().applied.len()
    }

    /// Most recently applied grid
    pub fn last_grid(&self) -> Option<ConnectionGrid> {
        self.lock().applied.last().copied()
    }

    /// Current coil bitmask
    pub fn coils(&self) -> u8 {
        self.lock().coils
    }
}

impl RelayDriver for SimulatedRelays {
    fn apply_grid(&mut self, grid: &ConnectionGrid) {
        let coils = self.map.bitmask(grid);
        let mut state = self.lock();
        state.applied.push(*grid);
        state.coils = coils;
        debug!("Simulated relays: {} (coils {:08b})", grid, coils);
    }

    fn describe(&self) -> String {
        "simulated relays".to_string()
    }
}
