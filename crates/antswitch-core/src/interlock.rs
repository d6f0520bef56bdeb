//! Cross-connection interlock
//!
//! Closing both radio ports onto the same antenna bonds the two transmitters
//! together. The functions here decide whether a proposed grid does that and
//! whether the operator override permits it. They never touch live state.

use crate::grid::{AntennaSlot, ConnectionGrid, RadioPort};

/// True iff some antenna has both radio ports connected
pub fn is_dangerous(grid: &ConnectionGrid) -> bool {
    AntennaSlot::ALL
        .iter()
        .any(|slot| grid.get(RadioPort::Primary, *slot) && grid.get(RadioPort::Secondary, *slot))
}

/// Antennas that have both radio ports connected
pub fn conflicting_slots(grid: &ConnectionGrid) -> Vec<AntennaSlot> {
    AntennaSlot::ALL
        .into_iter()
        .filter(|slot| grid.get(RadioPort::Primary, *slot) && grid.get(RadioPort::Secondary, *slot))
        .collect()
}

/// Outcome of checking a proposed grid against the interlock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Decision {
    /// Safe grid
    Allowed,
    /// Cross-connected, but the override is on. The control surface decides
    /// whether to ask the operator first.
    AllowedWithWarning,
    /// Cross-connected with the override off
    Rejected,
}

impl Decision {
    /// Whether the grid may be committed
    pub fn is_permitted(&self) -> bool {
        !matches!(self, Decision::Rejected)
    }

    /// Whether an operator should confirm before committing
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Decision::AllowedWithWarning)
    }
}

/// Classify a proposed grid under the given override setting
pub fn evaluate(grid: &ConnectionGrid, allow_cross_connection: bool) -> Decision {
    match (is_dangerous(grid), allow_cross_connection) {
        (false, _) => Decision::Allowed,
        (true, true) => Decision::AllowedWithWarning,
        (true, false) => Decision::Rejected,
    }
}

/// Persisted interlock override setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterlockPolicy {
    allow_cross_connection: bool,
}

impl InterlockPolicy {
    /// Create a policy with the given override setting
    pub fn new(allow_cross_connection: bool) -> Self {
        Self {
            allow_cross_connection,
        }
    }

    /// Whether cross-connected grids may be committed
    pub fn allow_cross_connection(&self) -> bool {
        self.allow_cross_connection
    }

    /// Change the override
    ///
    /// The live grid is not re-checked: a cross-connection committed while
    /// the override was on stays in place after it is turned off.
    pub fn set_allow_cross_connection(&mut self, allow: bool) {
        self.allow_cross_connection = allow;
    }

    /// Classify a proposed grid under this policy
    pub fn evaluate(&self, grid: &ConnectionGrid) -> Decision {
        evaluate(grid, self.allow_cross_connection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn slot(i: u8) -> AntennaSlot {
        AntennaSlot::new(i).unwrap()
    }

    #[test]
    fn test_open_grid_is_safe() {
        let grid = ConnectionGrid::default();
        assert!(!is_dangerous(&grid));
        assert_eq!(evaluate(&grid, false), Decision::Allowed);
        assert_eq!(evaluate(&grid, true), Decision::Allowed);
    }

    #[test]
    fn test_different_antennas_are_safe() {
        let grid = ConnectionGrid::from_rows([true, false, true, false], [false, true, false, true]);
        assert!(!is_dangerous(&grid));
        assert!(conflicting_slots(&grid).is_empty());
    }

    #[test]
    fn test_shared_antenna_is_dangerous() {
        let grid = ConnectionGrid::default()
            .with_cell(RadioPort::Primary, slot(3), true)
            .with_cell(RadioPort::Secondary, slot(3), true)
            .with_cell(RadioPort::Secondary, slot(0), true);

        assert!(is_dangerous(&grid));
        assert_eq!(conflicting_slots(&grid), vec![slot(3)]);
    }

    #[test]
    fn test_decision_table() {
        let danger = ConnectionGrid::from_rows([true; 4], [true; 4]);

        assert_eq!(evaluate(&danger, false), Decision::Rejected);
        assert_eq!(evaluate(&danger, true), Decision::AllowedWithWarning);
        assert!(!Decision::Rejected.is_permitted());
        assert!(Decision::AllowedWithWarning.is_permitted());
        assert!(Decision::AllowedWithWarning.needs_confirmation());
        assert!(!Decision::Allowed.needs_confirmation());
    }

    #[test]
    fn test_policy_flag() {
        let mut policy = InterlockPolicy::default();
        assert!(!policy.allow_cross_connection());

        let danger = ConnectionGrid::from_rows([true, false, false, false], [true, false, false, false]);
        assert_eq!(policy.evaluate(&danger), Decision::Rejected);

        policy.set_allow_cross_connection(true);
        assert_eq!(policy.evaluate(&danger), Decision::AllowedWithWarning);
    }

    fn any_grid() -> impl Strategy<Value = ConnectionGrid> {
        (any::<[bool; 4]>(), any::<[bool; 4]>())
            .prop_map(|(primary, secondary)| ConnectionGrid::from_rows(primary, secondary))
    }

    proptest! {
        #[test]
        fn danger_matches_definition(grid in any_grid()) {
            let expected = AntennaSlot::ALL
                .iter()
                .any(|s| grid.row(RadioPort::Primary)[s.index()] && grid.row(RadioPort::Secondary)[s.index()]);
            prop_assert_eq!(is_dangerous(&grid), expected);
            prop_assert_eq!(conflicting_slots(&grid).is_empty(), !expected);
        }

        #[test]
        fn rejected_only_when_dangerous_and_locked(grid in any_grid(), allow: bool) {
            let decision = evaluate(&grid, allow);
            prop_assert_eq!(decision == Decision::Rejected, is_dangerous(&grid) && !allow);
            prop_assert_eq!(decision == Decision::AllowedWithWarning, is_dangerous(&grid) && allow);
        }
    }
}
