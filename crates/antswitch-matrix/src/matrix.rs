//! Switch matrix
//!
//! Owns the one live connection grid. Every change goes through the
//! interlock as a whole candidate grid, and either commits completely or
//! leaves the grid untouched.

use antswitch_core::{
    conflicting_slots, AntennaSlot, ConnectionGrid, Decision, InterlockPolicy, RadioPort,
};
use antswitch_relay::RelayDriver;
use tracing::{debug, info, warn};

use crate::error::SwitchError;

/// Result of a successful commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Commit {
    /// Live grid after the commit
    pub grid: ConnectionGrid,
    /// Interlock decision the commit was made under
    pub decision: Decision,
    /// False when the candidate matched the live grid
    pub changed: bool,
}

/// The live connection grid and its relays
pub struct SwitchMatrix {
    grid: ConnectionGrid,
    relays: Box<dyn RelayDriver>,
}

impl SwitchMatrix {
    /// Create the matrix and drive the relays to the initial grid
    pub fn new(initial: ConnectionGrid, mut relays: Box<dyn RelayDriver>) -> Self {
        info!("Switch matrix on {} starting at {}", relays.describe(), initial);
        relays.apply_grid(&initial);
        Self {
            grid: initial,
            relays,
        }
    }

    /// Snapshot of the live grid
    pub fn state(&self) -> ConnectionGrid {
        self.grid
    }

    /// Decision a single-cell change would get, without committing it
    pub fn preview_cell(
        &self,
        port: RadioPort,
        slot: AntennaSlot,
        connected: bool,
        policy: &InterlockPolicy,
    ) -> Decision {
        self.preview_grid(&self.grid.with_cell(port, slot, connected), policy)
    }

    /// Decision replacing the whole grid would get, without committing it
    pub fn preview_grid(&self, candidate: &ConnectionGrid, policy: &InterlockPolicy) -> Decision {
        policy.evaluate(candidate)
    }

    /// Change one contact
    pub fn set_cell(
        &mut self,
        port: RadioPort,
        slot: AntennaSlot,
        connected: bool,
        policy: &InterlockPolicy,
    ) -> Result<Commit, SwitchError> {
        let candidate = self.grid.with_cell(port, slot, connected);
        debug!(
            "Set {} -> {} = {}: candidate {}",
            port, slot, connected, candidate
        );
        self.commit(candidate, policy)
    }

    /// Replace the whole grid, checked as one candidate
    pub fn restore_grid(
        &mut self,
        candidate: ConnectionGrid,
        policy: &InterlockPolicy,
    ) -> Result<Commit, SwitchError> {
        debug!("Restore candidate {}", candidate);
        self.commit(candidate, policy)
    }

    fn commit(
        &mut self,
        candidate: ConnectionGrid,
        policy: &InterlockPolicy,
    ) -> Result<Commit, SwitchError> {
        let decision = policy.evaluate(&candidate);

        if decision == Decision::Rejected {
            let conflicts = conflicting_slots(&candidate);
            warn!("Interlock rejected {} (shared: {:?})", candidate, conflicts);
            return Err(SwitchError::DangerRejected { conflicts });
        }

        if candidate == self.grid {
            debug!("Grid unchanged, relays left as they are");
            return Ok(Commit {
                grid: self.grid,
                decision,
                changed: false,
            });
        }

        self.grid = candidate;
        self.relays.apply_grid(&self.grid);

        if decision == Decision::AllowedWithWarning {
            warn!(
                "Cross-connection committed under override: {} (shared: {:?})",
                self.grid,
                conflicting_slots(&self.grid)
            );
        } else {
            info!("Grid now {}", self.grid);
        }

        Ok(Commit {
            grid: self.grid,
            decision,
            changed: true,
        })
    }
}

impl std::fmt::Debug for SwitchMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwitchMatrix")
            .field("grid", &self.grid)
            .field("relays", &self.relays.describe())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antswitch_core::is_dangerous;
    use antswitch_relay::SimulatedRelays;

    fn slot(i: u8) -> AntennaSlot {
        AntennaSlot::new(i).unwrap()
    }

    fn matrix() -> (SwitchMatrix, SimulatedRelays) {
        let relays = SimulatedRelays::new();
        let matrix = SwitchMatrix::new(ConnectionGrid::default(), Box::new(relays.clone()));
        (matrix, relays)
    }

    #[test]
    fn test_initial_grid_driven_to_relays() {
        let (_matrix, relays) = matrix();
        assert_eq!(relays.apply_count(), 1);
        assert_eq!(relays.last_grid(), Some(ConnectionGrid::default()));
    }

    #[test]
    fn test_safe_change_commits_and_actuates() {
        let (mut matrix, relays) = matrix();
        let policy = InterlockPolicy::default();

        let commit = matrix
            .set_cell(RadioPort::Primary, slot(2), true, &policy)
            .unwrap();

        assert!(commit.changed);
        assert_eq!(commit.decision, Decision::Allowed);
        assert!(matrix.state().get(RadioPort::Primary, slot(2)));
        assert_eq!(relays.apply_count(), 2);
        assert_eq!(relays.last_grid(), Some(matrix.state()));
    }

    #[test]
    fn test_rejection_leaves_state_and_relays_alone() {
        let (mut matrix, relays) = matrix();
        let policy = InterlockPolicy::default();

        matrix
            .set_cell(RadioPort::Primary, slot(1), true, &policy)
            .unwrap();
        let before = matrix.state();

        let err = matrix
            .set_cell(RadioPort::Secondary, slot(1), true, &policy)
            .unwrap_err();

        assert!(matches!(err, SwitchError::DangerRejected { ref conflicts } if conflicts == &vec![slot(1)]));
        assert_eq!(matrix.state(), before);
        assert_eq!(relays.apply_count(), 2);
    }

    #[test]
    fn test_override_commits_with_warning() {
        let (mut matrix, _relays) = matrix();
        let policy = InterlockPolicy::new(true);

        matrix
            .set_cell(RadioPort::Primary, slot(0), true, &policy)
            .unwrap();
        assert_eq!(
            matrix.preview_cell(RadioPort::Secondary, slot(0), true, &policy),
            Decision::AllowedWithWarning
        );

        let commit = matrix
            .set_cell(RadioPort::Secondary, slot(0), true, &policy)
            .unwrap();
        assert_eq!(commit.decision, Decision::AllowedWithWarning);
        assert!(is_dangerous(&matrix.state()));
    }

    #[test]
    fn test_preview_grid_commits_nothing() {
        let (matrix, relays) = matrix();
        let shared = ConnectionGrid::from_rows([false, false, true, false], [false, false, true, false]);
        let split = ConnectionGrid::from_rows([true, false, false, false], [false, false, false, true]);

        assert_eq!(
            matrix.preview_grid(&shared, &InterlockPolicy::default()),
            Decision::Rejected
        );
        assert_eq!(
            matrix.preview_grid(&shared, &InterlockPolicy::new(true)),
            Decision::AllowedWithWarning
        );
        assert_eq!(
            matrix.preview_grid(&split, &InterlockPolicy::default()),
            Decision::Allowed
        );
        assert!(matrix.state().is_open());
        assert_eq!(relays.apply_count(), 1);
    }

    #[test]
    fn test_repeat_is_a_no_op() {
        let (mut matrix, relays) = matrix();
        let policy = InterlockPolicy::default();

        matrix
            .set_cell(RadioPort::Secondary, slot(3), true, &policy)
            .unwrap();
        let again = matrix
            .set_cell(RadioPort::Secondary, slot(3), true, &policy)
            .unwrap();

        assert!(!again.changed);
        assert_eq!(relays.apply_count(), 2);
    }

    #[test]
    fn test_restore_is_all_or_nothing() {
        let (mut matrix, relays) = matrix();
        let policy = InterlockPolicy::default();

        let dangerous = ConnectionGrid::from_rows([true, true, false, false], [false, true, false, false]);
        assert!(matrix.restore_grid(dangerous, &policy).is_err());
        assert_eq!(matrix.state(), ConnectionGrid::default());

        let safe = ConnectionGrid::from_rows([true, false, false, false], [false, true, true, false]);
        let commit = matrix.restore_grid(safe, &policy).unwrap();
        assert!(commit.changed);
        assert_eq!(matrix.state(), safe);
        assert_eq!(relays.applied(), vec![ConnectionGrid::default(), safe]);
    }
}
