//! Operator-assigned display names for ports and antennas
//!
//! Names are labels only. Nothing in the interlock or the relay mapping looks
//! at them.

use crate::grid::{AntennaSlot, RadioPort, PORT_COUNT, SLOT_COUNT};

/// Display names for COM1 and COM2
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct RadioPortNames([String; PORT_COUNT]);

impl RadioPortNames {
    /// Build from explicit names in COM1, COM2 order
    pub fn new(names: [String; PORT_COUNT]) -> Self {
        Self(names)
    }

    /// Name of a port
    pub fn get(&self, port: RadioPort) -> &str {
        &self.0[port.index()]
    }

    /// Rename a port. A blank name restores the factory label.
    pub fn set(&mut self, port: RadioPort, name: &str) {
        let name = name.trim();
        self.0[port.index()] = if name.is_empty() {
            port.label().to_string()
        } else {
            name.to_string()
        };
    }

    /// All names in port order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for RadioPortNames {
    fn default() -> Self {
        Self(RadioPort::ALL.map(|port| port.label().to_string()))
    }
}

/// Display names for the four antennas
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct AntennaNames([String; SLOT_COUNT]);

impl AntennaNames {
    /// Build from explicit names in slot order
    pub fn new(names: [String; SLOT_COUNT]) -> Self {
        Self(names)
    }

    /// Name of an antenna
    pub fn get(&self, slot: AntennaSlot) -> &str {
        &self.0[slot.index()]
    }

    /// Rename an antenna. A blank name restores "ANT{n}".
    pub fn set(&mut self, slot: AntennaSlot, name: &str) {
        let name = name.trim();
        self.0[slot.index()] = if name.is_empty() {
            slot.default_name()
        } else {
            name.to_string()
        };
    }

    /// All names in slot order
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Default for AntennaNames {
    fn default() -> Self {
        Self(AntennaSlot::ALL.map(|slot| slot.default_name()))
    }
}
