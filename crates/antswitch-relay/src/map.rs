//! Mapping from grid cells to relay channels

use antswitch_core::{AntennaSlot, ConnectionGrid, RadioPort, PORT_COUNT, SLOT_COUNT};

use crate::error::RelayError;

/// Number of relay channels on the board (one per grid cell)
pub const RELAY_CHANNELS: usize = PORT_COUNT * SLOT_COUNT;

/// Desired coil state of one relay channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayLevel {
    /// Zero-based relay channel
    pub channel: u8,
    /// Whether the contact should be closed
    pub closed: bool,
    /// Whether the coil should be driven (accounts for active-low boards)
    pub energized: bool,
}

/// Assignment of each grid cell to a relay channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMap {
    channels: [[u8; SLOT_COUNT]; PORT_COUNT],
    active_low: bool,
}

impl Default for RelayMap {
    /// COM1 on channels 0..=3, COM2 on channels 4..=7, active-high
    fn default() -> Self {
        let mut channels = [[0u8; SLOT_COUNT]; PORT_COUNT];
        for port in RadioPort::ALL {
            for slot in AntennaSlot::ALL {
                channels[port.index()][slot.index()] = (port.index() * SLOT_COUNT + slot.index()) as u8;
            }
        }
        Self {
            channels,
            active_low: false,
        }
    }
}

impl RelayMap {
    /// Build a custom map. Every channel must be on the board and used once.
    pub fn new(channels: [[u8; SLOT_COUNT]; PORT_COUNT], active_low: bool) -> Result<Self, RelayError> {
        let mut seen = [false; RELAY_CHANNELS];
        for channel in channels.iter().flatten().copied() {
            let idx = channel as usize;
            if idx >= RELAY_CHANNELS {
                return Err(RelayError::InvalidChannel(channel, RELAY_CHANNELS));
            }
            if seen[idx] {
                return Err(RelayError::DuplicateChannel(channel));
            }
            seen[idx] = true;
        }
        Ok(Self {
            channels,
            active_low,
        })
    }

    /// Default layout with the given coil polarity
    pub fn with_active_low(active_low: bool) -> Self {
        Self {
            active_low,
            ..Self::default()
        }
    }

    /// Relay channel for a cell
    pub fn channel(&self, port: RadioPort, slot: AntennaSlot) -> u8 {
        self.channels[port.index()][slot.index()]
    }

    /// Whether coils are driven low to close a contact
    pub fn active_low(&self) -> bool {
        self.active_low
    }

    /// Coil levels for a grid, ordered break-before-make
    ///
    /// Every opening contact comes before every closing contact, so a port
    /// moving between antennas never touches two at once.
    pub fn levels(&self, grid: &ConnectionGrid) -> Vec<RelayLevel> {
        let mut levels: Vec<RelayLevel> = grid
            .cells()
            .map(|(port, slot, connected)| RelayLevel {
                channel: self.channel(port, slot),
                closed: connected,
                energized: connected != self.active_low,
            })
            .collect();
        // stable: keeps channel order within each group
        levels.sort_by_key(|level| level.closed);
        levels
    }

    /// Coil levels packed into a bitmask, bit n = channel n energized
    pub fn bitmask(&self, grid: &ConnectionGrid) -> u8 {
        self.levels(grid)
            .iter()
            .filter(|level| level.energized)
            .fold(0u8, |mask, level| mask | (1 << level.channel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: u8) -> AntennaSlot {
        AntennaSlot::new(i).unwrap()
    }

    #[test]
    fn test_default_layout() {
        let map = RelayMap::default();
        assert_eq!(map.channel(RadioPort::Primary, slot(0)), 0);
        assert_eq!(map.channel(RadioPort::Primary, slot(3)), 3);
        assert_eq!(map.channel(RadioPort::Secondary, slot(0)), 4);
        assert_eq!(map.channel(RadioPort::Secondary, slot(3)), 7);
    }

    #[test]
    fn test_custom_map_validation() {
        let ok = [[7, 6, 5, 4], [3, 2, 1, 0]];
        assert!(RelayMap::new(ok, false).is_ok());

        let duplicate = [[0, 1, 2, 3], [3, 4, 5, 6]];
        assert!(matches!(
            RelayMap::new(duplicate, false),
            Err(RelayError::DuplicateChannel(3))
        ));

        let out_of_range = [[0, 1, 2, 3], [4, 5, 6, 9]];
        assert!(matches!(
            RelayMap::new(out_of_range, false),
            Err(RelayError::InvalidChannel(9, RELAY_CHANNELS))
        ));
    }

    #[test]
    fn test_break_before_make_order() {
        let map = RelayMap::default();
        let grid = ConnectionGrid::default()
            .with_cell(RadioPort::Primary, slot(1), true)
            .with_cell(RadioPort::Secondary, slot(2), true);

        let levels = map.levels(&grid);
        assert_eq!(levels.len(), RELAY_CHANNELS);

        let first_close = levels.iter().position(|l| l.closed).unwrap();
        assert!(levels[first_close..].iter().all(|l| l.closed));
        assert_eq!(levels[first_close].channel, 1);
        assert_eq!(levels[first_close + 1].channel, 6);
    }

    #[test]
    fn test_bitmask_polarity() {
        let grid = ConnectionGrid::default()
            .with_cell(RadioPort::Primary, slot(0), true)
            .with_cell(RadioPort::Secondary, slot(3), true);

        assert_eq!(RelayMap::default().bitmask(&grid), 0b1000_0001);
        assert_eq!(RelayMap::with_active_low(true).bitmask(&grid), 0b0111_1110);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn any_grid() -> impl Strategy<Value = ConnectionGrid> {
            (any::<[bool; SLOT_COUNT]>(), any::<[bool; SLOT_COUNT]>())
                .prop_map(|(primary, secondary)| ConnectionGrid::from_rows(primary, secondary))
        }

        proptest! {
            #[test]
            fn levels_open_before_close(grid in any_grid(), active_low: bool) {
                let levels = RelayMap::with_active_low(active_low).levels(&grid);

                prop_assert_eq!(levels.len(), RELAY_CHANNELS);
                prop_assert!(levels.windows(2).all(|pair| pair[0].closed <= pair[1].closed));

                let mut channels: Vec<u8> = levels.iter().map(|l| l.channel).collect();
                channels.sort_unstable();
                prop_assert_eq!(channels, (0..RELAY_CHANNELS as u8).collect::<Vec<_>>());
            }

            #[test]
            fn bitmask_matches_levels(grid in any_grid(), active_low: bool) {
                let map = RelayMap::with_active_low(active_low);
                let mask = map.bitmask(&grid);

                for level in map.levels(&grid) {
                    prop_assert_eq!(mask & (1 << level.channel) != 0, level.energized);
                    prop_assert_eq!(level.energized, level.closed != active_low);
                    prop_assert_eq!(
                        level.closed,
                        grid.get(
                            RadioPort::ALL[level.channel as usize / SLOT_COUNT],
                            AntennaSlot::ALL[level.channel as usize % SLOT_COUNT],
                        )
                    );
                }
            }
        }
    }
}
