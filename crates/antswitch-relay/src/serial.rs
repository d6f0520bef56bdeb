//! Serial USB relay board driver
//!
//! LCUS-type boards take one 4-byte frame per channel:
//! `A0 <channel, 1-based> <state> <checksum>`, where the checksum is the
//! low byte of the sum of the first three bytes.

use std::io::Write;
use std::time::Duration;

use antswitch_core::ConnectionGrid;
use serialport::SerialPort;
use tracing::{debug, info, warn};

use crate::driver::RelayDriver;
use crate::error::RelayError;
use crate::map::RelayMap;

/// Baud rate used by LCUS boards out of the box
pub const DEFAULT_BAUD_RATE: u32 = 9600;

const FRAME_START: u8 = 0xA0;

/// Encode a single channel command
pub fn lcus_frame(channel: u8, energized: bool) -> [u8; 4] {
    let number = channel.wrapping_add(1);
    let state = u8::from(energized);
    let checksum = FRAME_START.wrapping_add(number).wrapping_add(state);
    [FRAME_START, number, state, checksum]
}

/// Relay board attached to a serial port (or any byte sink)
pub struct SerialRelayBoard<W: Write + Send = Box<dyn SerialPort>> {
    port: W,
    label: String,
    map: RelayMap,
}

impl SerialRelayBoard {
    /// Open the board on a serial port
    pub fn open(port_name: &str, baud_rate: u32, map: RelayMap) -> Result<Self, RelayError> {
        let port = serialport::new(port_name, baud_rate)
            .timeout(Duration::from_millis(100))
            .open()
            .map_err(|source| RelayError::OpenFailed {
                port: port_name.to_string(),
                source,
            })?;

        info!("Opened relay board on {} at {} baud", port_name, baud_rate);
        Ok(Self::from_writer(port, port_name, map))
    }
}

impl<W: Write + Send> SerialRelayBoard<W> {
    /// Drive a board through an already-open byte sink
    pub fn from_writer(port: W, label: &str, map: RelayMap) -> Self {
        Self {
            port,
            label: label.to_string(),
            map,
        }
    }

    /// Borrow the underlying sink
    pub fn writer(&self) -> &W {
        &self.port
    }

    fn write_frame(&mut self, frame: &[u8; 4]) -> std::io::Result<()> {
        self.port.write_all(frame)?;
        self.port.flush()
    }
}

impl<W: Write + Send> RelayDriver for SerialRelayBoard<W> {
    fn apply_grid(&mut self, grid: &ConnectionGrid) {
        debug!("Relay board {}: applying {}", self.label, grid);

        for level in self.map.levels(grid) {
            let frame = lcus_frame(level.channel, level.energized);
            if let Err(e) = self.write_frame(&frame) {
                warn!(
                    "Relay board {}: failed to set channel {}: {}",
                    self.label, level.channel, e
                );
            }
        }
    }

    fn describe(&self) -> String {
        format!("relay board on {}", self.label)
    }
}
