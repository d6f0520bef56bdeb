//! Radio ports, antenna slots and the connection grid

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Number of radio ports on the switch
pub const PORT_COUNT: usize = 2;

/// Number of antenna outputs on the switch
pub const SLOT_COUNT: usize = 4;

/// A radio input of the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum RadioPort {
    /// COM1
    #[cfg_attr(feature = "serde", serde(alias = "com1", alias = "COM1"))]
    Primary,
    /// COM2
    #[cfg_attr(feature = "serde", serde(alias = "com2", alias = "COM2"))]
    Secondary,
}

impl RadioPort {
    /// Both ports, in COM1, COM2 order
    pub const ALL: [RadioPort; PORT_COUNT] = [RadioPort::Primary, RadioPort::Secondary];

    /// Zero-based index (COM1 = 0)
    pub fn index(&self) -> usize {
        match self {
            RadioPort::Primary => 0,
            RadioPort::Secondary => 1,
        }
    }

    /// The other port
    pub fn other(&self) -> RadioPort {
        match self {
            RadioPort::Primary => RadioPort::Secondary,
            RadioPort::Secondary => RadioPort::Primary,
        }
    }

    /// Front panel label
    pub fn label(&self) -> &'static str {
        match self {
            RadioPort::Primary => "COM1",
            RadioPort::Secondary => "COM2",
        }
    }
}

impl fmt::Display for RadioPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RadioPort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "primary" | "com1" | "1" => Ok(RadioPort::Primary),
            "secondary" | "com2" | "2" => Ok(RadioPort::Secondary),
            _ => Err(CoreError::UnknownPort(s.to_string())),
        }
    }
}

/// An antenna output, index 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "u8", into = "u8")
)]
pub struct AntennaSlot(u8);

impl AntennaSlot {
    /// All four slots in order
    pub const ALL: [AntennaSlot; SLOT_COUNT] = [
        AntennaSlot(0),
        AntennaSlot(1),
        AntennaSlot(2),
        AntennaSlot(3),
    ];

    /// Create a slot, rejecting indices outside 0..=3
    pub fn new(index: u8) -> Result<Self, CoreError> {
        if (index as usize) < SLOT_COUNT {
            Ok(AntennaSlot(index))
        } else {
            Err(CoreError::InvalidSlot(index))
        }
    }

    /// Zero-based index
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// Factory display name ("ANT1".."ANT4")
    pub fn default_name(&self) -> String {
        format!("ANT{}", self.0 + 1)
    }
}

impl TryFrom<u8> for AntennaSlot {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        AntennaSlot::new(value)
    }
}

impl From<AntennaSlot> for u8 {
    fn from(slot: AntennaSlot) -> u8 {
        slot.0
    }
}

impl fmt::Display for AntennaSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ANT{}", self.0 + 1)
    }
}

/// Connection state of every relay contact in the matrix
///
/// One row per radio port, one column per antenna. The fixed-size rows mean
/// every one of the eight cells always has a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionGrid {
    primary: [bool; SLOT_COUNT],
    secondary: [bool; SLOT_COUNT],
}

impl ConnectionGrid {
    /// Build a grid from explicit rows
    pub fn from_rows(primary: [bool; SLOT_COUNT], secondary: [bool; SLOT_COUNT]) -> Self {
        Self { primary, secondary }
    }

    /// Whether `port` is connected to `slot`
    pub fn get(&self, port: RadioPort, slot: AntennaSlot) -> bool {
        self.row(port)[slot.index()]
    }

    /// Set a single cell in place
    pub fn set(&mut self, port: RadioPort, slot: AntennaSlot, connected: bool) {
        self.row_mut(port)[slot.index()] = connected;
    }

    /// Copy of this grid with one cell changed
    pub fn with_cell(mut self, port: RadioPort, slot: AntennaSlot, connected: bool) -> Self {
        self.set(port, slot, connected);
        self
    }

    /// Connection row for a port
    pub fn row(&self, port: RadioPort) -> [bool; SLOT_COUNT] {
        match port {
            RadioPort::Primary => self.primary,
            RadioPort::Secondary => self.secondary,
        }
    }

    fn row_mut(&mut self, port: RadioPort) -> &mut [bool; SLOT_COUNT] {
        match port {
            RadioPort::Primary => &mut self.primary,
            RadioPort::Secondary => &mut self.secondary,
        }
    }

    /// Slots a port is currently connected to
    pub fn connected_slots(&self, port: RadioPort) -> Vec<AntennaSlot> {
        AntennaSlot::ALL
            .into_iter()
            .filter(|slot| self.get(port, *slot))
            .collect()
    }

    /// Iterate over all eight cells as `(port, slot, connected)`
    pub fn cells(&self) -> impl Iterator<Item = (RadioPort, AntennaSlot, bool)> + '_ {
        RadioPort::ALL.into_iter().flat_map(move |port| {
            AntennaSlot::ALL
                .into_iter()
                .map(move |slot| (port, slot, self.get(port, slot)))
        })
    }

    /// True if no contact is closed
    pub fn is_open(&self) -> bool {
        self.cells().all(|(_, _, connected)| !connected)
    }
}

impl fmt::Display for ConnectionGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn row(f: &mut fmt::Formatter<'_>, cells: &[bool; SLOT_COUNT]) -> fmt::Result {
            f.write_str("[")?;
            for (i, connected) in cells.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                f.write_str(if *connected { "T" } else { "F" })?;
            }
            f.write_str("]")
        }

        f.write_str("{Primary:")?;
        row(f, &self.primary)?;
        f.write_str(", Secondary:")?;
        row(f, &self.secondary)?;
        f.write_str("}")
    }
}
