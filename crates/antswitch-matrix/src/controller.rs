//! Switch controller
//!
//! The one owned aggregate of everything the switch knows: the matrix, the
//! interlock policy, the presets, the names and the device settings. It is
//! built once at startup from the store and written back on settings saves,
//! preset saves and shutdown.

use antswitch_core::{
    is_dangerous, AntennaNames, AntennaSlot, ConnectionGrid, Decision, DeviceSettings,
    InterlockPolicy, RadioPort, RadioPortNames, PORT_COUNT, SLOT_COUNT,
};
use antswitch_relay::RelayDriver;
use antswitch_store::{load_state, save_state, KeyValueStore, PersistedState};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SwitchError;
use crate::events::{ChangeSource, SwitchEvent};
use crate::matrix::{Commit, SwitchMatrix};
use crate::presets::PresetStore;

/// Preset entry as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetSummary {
    pub index: usize,
    pub name: String,
    pub grid: ConnectionGrid,
}

/// Complete, consistent view of the switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Live grid
    pub grid: ConnectionGrid,
    /// Whether the live grid is cross-connected
    pub dangerous: bool,
    /// Interlock override
    pub allow_cross_connection: bool,
    pub port_names: RadioPortNames,
    pub antenna_names: AntennaNames,
    /// Device settings with the WiFi passphrase masked
    pub device: DeviceSettings,
    pub presets: Vec<PresetSummary>,
}

/// Events kept between drains; the oldest are dropped beyond this
pub const EVENT_BUFFER_LIMIT: usize = 256;

/// Partial settings change; `None` fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettingsUpdate {
    pub port_names: Option<[String; PORT_COUNT]>,
    pub antenna_names: Option<[String; SLOT_COUNT]>,
    pub allow_cross_connection: Option<bool>,
    pub device: Option<DeviceUpdate>,
}

/// Partial device settings change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceUpdate {
    pub hostname: Option<String>,
    pub wifi_ssid: Option<String>,
    /// New passphrase. Empty keeps the stored one.
    pub wifi_password: Option<String>,
    pub ap_ssid: Option<String>,
}

/// Switch matrix, interlock policy and presets under one owner
///
/// Every mutation queues a [`SwitchEvent`]. Callers that drive the controller
/// directly should call [`drain_events`](Self::drain_events) after each
/// request; at most [`EVENT_BUFFER_LIMIT`] undrained events are kept.
#[derive(Debug)]
pub struct SwitchController {
    matrix: SwitchMatrix,
    policy: InterlockPolicy,
    presets: PresetStore,
    port_names: RadioPortNames,
    antenna_names: AntennaNames,
    device: DeviceSettings,
    event_buffer: Vec<SwitchEvent>,
}

impl SwitchController {
    /// Controller with factory defaults and an open grid
    pub fn new(relays: Box<dyn RelayDriver>) -> Self {
        Self::from_state(PersistedState::default(), relays)
    }

    /// Controller from previously persisted state
    ///
    /// The persisted grid is trusted as the boot state: it was committed
    /// under the interlock (or the override) that was in force when saved.
    pub fn from_state(state: PersistedState, relays: Box<dyn RelayDriver>) -> Self {
        Self {
            matrix: SwitchMatrix::new(state.grid, relays),
            policy: InterlockPolicy::new(state.allow_cross_connection),
            presets: PresetStore::from_presets(state.presets),
            port_names: state.port_names,
            antenna_names: state.antenna_names,
            device: state.device,
            event_buffer: Vec::new(),
        }
    }

    /// Build the controller from the store, using defaults for absent keys
    pub fn load_all<S>(store: &mut S, relays: Box<dyn RelayDriver>) -> Result<Self, SwitchError>
    where
        S: KeyValueStore + ?Sized,
    {
        let state = load_state(store)?;
        info!(
            "Loaded switch state: {} presets, override {}",
            state.presets.len(),
            state.allow_cross_connection
        );
        Ok(Self::from_state(state, relays))
    }

    /// Write every persisted field to the store
    pub fn save_all<S>(&mut self, store: &mut S) -> Result<(), SwitchError>
    where
        S: KeyValueStore + ?Sized,
    {
        save_state(store, &self.persisted_state())?;
        self.push_event(SwitchEvent::StateSaved);
        Ok(())
    }

    /// State as it would be persisted
    pub fn persisted_state(&self) -> PersistedState {
        PersistedState {
            grid: self.matrix.state(),
            allow_cross_connection: self.policy.allow_cross_connection(),
            port_names: self.port_names.clone(),
            antenna_names: self.antenna_names.clone(),
            device: self.device.clone(),
            presets: self.presets.presets().to_vec(),
        }
    }

    /// Snapshot of the live grid
    pub fn state(&self) -> ConnectionGrid {
        self.matrix.state()
    }

    /// Full client-facing view
    pub fn snapshot(&self) -> Snapshot {
        let grid = self.matrix.state();
        Snapshot {
            grid,
            dangerous: is_dangerous(&grid),
            allow_cross_connection: self.policy.allow_cross_connection(),
            port_names: self.port_names.clone(),
            antenna_names: self.antenna_names.clone(),
            device: self.device.redacted(),
            presets: self
                .presets
                .presets()
                .iter()
                .enumerate()
                .map(|(index, preset)| PresetSummary {
                    index,
                    name: preset.name().to_string(),
                    grid: *preset.grid(),
                })
                .collect(),
        }
    }

    pub fn policy(&self) -> InterlockPolicy {
        self.policy
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn port_names(&self) -> &RadioPortNames {
        &self.port_names
    }

    pub fn antenna_names(&self) -> &AntennaNames {
        &self.antenna_names
    }

    pub fn device(&self) -> &DeviceSettings {
        &self.device
    }

    /// Decision a single-cell change would get
    pub fn preview_cell(&self, port: RadioPort, slot: AntennaSlot, connected: bool) -> Decision {
        self.matrix.preview_cell(port, slot, connected, &self.policy)
    }

    /// Decision restoring a preset would get
    pub fn preview_preset(&self, index: usize) -> Result<Decision, SwitchError> {
        let grid = self.presets.load(index)?;
        Ok(self.matrix.preview_grid(&grid, &self.policy))
    }

    /// Change one contact, subject to the interlock
    pub fn set_cell(
        &mut self,
        port: RadioPort,
        slot: AntennaSlot,
        connected: bool,
    ) -> Result<Commit, SwitchError> {
        let source = ChangeSource::Cell {
            port,
            slot,
            connected,
        };
        let result = self.matrix.set_cell(port, slot, connected, &self.policy);
        self.record(&result, source);
        result
    }

    /// Restore a preset, re-checking its grid against the current policy
    pub fn load_preset(&mut self, index: usize) -> Result<Commit, SwitchError> {
        let grid = self.presets.load(index)?;
        let result = self.matrix.restore_grid(grid, &self.policy);
        self.record(&result, ChangeSource::Preset { index });
        result
    }

    /// Save `grid` as a new preset
    pub fn save_preset(&mut self, name: &str, grid: ConnectionGrid) -> Result<usize, SwitchError> {
        let index = self.presets.save(name, grid)?;
        let name = self
            .presets
            .get(index)
            .map(|preset| preset.name().to_string())
            .unwrap_or_default();
        self.push_event(SwitchEvent::PresetSaved { index, name });
        Ok(index)
    }

    /// Save the live grid as a new preset
    pub fn save_current_as_preset(&mut self, name: &str) -> Result<usize, SwitchError> {
        let grid = self.matrix.state();
        self.save_preset(name, grid)
    }

    /// Change the override flag
    ///
    /// The live grid is left as it is in both directions.
    pub fn set_allow_cross_connection(&mut self, allow: bool) {
        if self.policy.allow_cross_connection() == allow {
            return;
        }
        self.policy.set_allow_cross_connection(allow);
        info!("Cross-connection override {}", if allow { "enabled" } else { "disabled" });
        self.push_event(SwitchEvent::PolicyChanged {
            allow_cross_connection: allow,
        });
    }

    /// Apply a settings change in memory
    pub fn apply_settings(&mut self, update: SettingsUpdate) {
        let SettingsUpdate {
            port_names,
            antenna_names,
            allow_cross_connection,
            device,
        } = update;

        if let Some(names) = port_names {
            for (port, name) in RadioPort::ALL.into_iter().zip(names.iter()) {
                self.port_names.set(port, name);
            }
        }
        if let Some(names) = antenna_names {
            for (slot, name) in AntennaSlot::ALL.into_iter().zip(names.iter()) {
                self.antenna_names.set(slot, name);
            }
        }
        if let Some(device) = device {
            self.apply_device(device);
        }
        self.push_event(SwitchEvent::SettingsChanged);

        if let Some(allow) = allow_cross_connection {
            self.set_allow_cross_connection(allow);
        }
    }

    fn apply_device(&mut self, update: DeviceUpdate) {
        if let Some(hostname) = update.hostname {
            let hostname = hostname.trim();
            if !hostname.is_empty() {
                self.device.hostname = hostname.to_string();
            }
        }
        if let Some(ssid) = update.wifi_ssid {
            self.device.wifi_ssid = ssid.trim().to_string();
        }
        if let Some(password) = update.wifi_password.filter(|p| !p.is_empty()) {
            self.device.wifi_password = password;
        }
        if let Some(ssid) = update.ap_ssid {
            let ssid = ssid.trim();
            if !ssid.is_empty() {
                self.device.ap_ssid = ssid.to_string();
            }
        }
    }

    /// Take pending events
    pub fn drain_events(&mut self) -> Vec<SwitchEvent> {
        std::mem::take(&mut self.event_buffer)
    }

    fn push_event(&mut self, event: SwitchEvent) {
        if self.event_buffer.len() >= EVENT_BUFFER_LIMIT {
            debug!("Event buffer full, dropping oldest event");
            self.event_buffer.remove(0);
        }
        self.event_buffer.push(event);
    }

    fn record(&mut self, result: &Result<Commit, SwitchError>, source: ChangeSource) {
        match result {
            Ok(commit) if commit.changed => self.push_event(SwitchEvent::GridChanged {
                grid: commit.grid,
                decision: commit.decision,
                source,
            }),
            Err(SwitchError::DangerRejected { conflicts }) => {
                self.push_event(SwitchEvent::MutationRejected {
                    conflicts: conflicts.clone(),
                    source,
                })
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antswitch_relay::SimulatedRelays;
    use antswitch_store::MemoryStore;

    fn slot(i: u8) -> AntennaSlot {
        AntennaSlot::new(i).unwrap()
    }

    fn controller() -> SwitchController {
        SwitchController::new(Box::new(SimulatedRelays::new()))
    }

    #[test]
    fn test_rejection_emits_event() {
        let mut ctl = controller();
        ctl.set_cell(RadioPort::Primary, slot(0), true).unwrap();
        assert!(ctl.set_cell(RadioPort::Secondary, slot(0), true).is_err());

        let events = ctl.drain_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], SwitchEvent::GridChanged { .. }));
        assert!(matches!(
            events[1],
            SwitchEvent::MutationRejected { ref conflicts, .. } if conflicts == &vec![slot(0)]
        ));
    }

    #[test]
    fn test_settings_update() {
        let mut ctl = controller();
        ctl.apply_settings(SettingsUpdate {
            port_names: Some(["IC-7610".to_string(), String::new()]),
            antenna_names: Some([
                "Yagi".to_string(),
                "Dipole".to_string(),
                "".to_string(),
                "Loop".to_string(),
            ]),
            allow_cross_connection: Some(true),
            device: Some(DeviceUpdate {
                wifi_ssid: Some(" shack ".to_string()),
                wifi_password: Some("secret".to_string()),
                ..Default::default()
            }),
        });

        assert_eq!(ctl.port_names().get(RadioPort::Primary), "IC-7610");
        assert_eq!(ctl.port_names().get(RadioPort::Secondary), "COM2");
        assert_eq!(ctl.antenna_names().get(slot(2)), "ANT3");
        assert!(ctl.policy().allow_cross_connection());
        assert_eq!(ctl.device().wifi_ssid, "shack");

        // empty passphrase keeps the stored one
        ctl.apply_settings(SettingsUpdate {
            device: Some(DeviceUpdate {
                wifi_password: Some(String::new()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(ctl.device().wifi_password, "secret");
        assert_eq!(ctl.snapshot().device.wifi_password, "********");

        let events = ctl.drain_events();
        assert!(events.contains(&SwitchEvent::PolicyChanged {
            allow_cross_connection: true
        }));
    }

    #[test]
    fn test_disabling_override_keeps_live_grid() {
        let mut ctl = controller();
        ctl.set_allow_cross_connection(true);
        ctl.set_cell(RadioPort::Primary, slot(1), true).unwrap();
        ctl.set_cell(RadioPort::Secondary, slot(1), true).unwrap();

        ctl.set_allow_cross_connection(false);
        assert!(ctl.snapshot().dangerous);

        // clearing one side of the conflict is still allowed
        ctl.set_cell(RadioPort::Secondary, slot(1), false).unwrap();
        assert!(!ctl.snapshot().dangerous);
    }

    #[test]
    fn test_save_all_then_load_all() {
        let mut store = MemoryStore::new();
        let mut ctl = controller();
        ctl.set_cell(RadioPort::Secondary, slot(3), true).unwrap();
        ctl.save_current_as_preset("Night").unwrap();
        ctl.save_all(&mut store).unwrap();

        let reloaded =
            SwitchController::load_all(&mut store, Box::new(SimulatedRelays::new())).unwrap();
        assert_eq!(reloaded.snapshot(), ctl.snapshot());
        assert_eq!(reloaded.persisted_state(), ctl.persisted_state());
    }

    #[test]
    fn test_undrained_events_are_bounded() {
        let mut ctl = controller();
        for i in 0..EVENT_BUFFER_LIMIT + 40 {
            ctl.set_cell(RadioPort::Primary, slot(0), i % 2 == 0).unwrap();
        }

        let events = ctl.drain_events();
        assert_eq!(events.len(), EVENT_BUFFER_LIMIT);
        // newest change is kept
        assert!(matches!(
            events.last(),
            Some(SwitchEvent::GridChanged { grid, .. }) if grid.is_open()
        ));
        assert!(ctl.drain_events().is_empty());
    }

    #[test]
    fn test_preview_preset() {
        let mut ctl = controller();
        let danger = ConnectionGrid::from_rows([true, false, false, false], [true, false, false, false]);
        ctl.save_preset("Both on 1", danger).unwrap();

        assert_eq!(ctl.preview_preset(0).unwrap(), Decision::Rejected);
        ctl.set_allow_cross_connection(true);
        assert_eq!(ctl.preview_preset(0).unwrap(), Decision::AllowedWithWarning);
        assert!(matches!(ctl.preview_preset(4), Err(SwitchError::NotFound { .. })));
    }
}
