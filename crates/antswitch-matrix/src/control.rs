//! Control surface
//!
//! Decodes operator requests, runs them against the controller and answers
//! with the complete switch state. Transport is someone else's problem: the
//! daemon feeds this JSON lines, a web front end could feed it form posts.
//!
//! Cross-connections the override permits are not committed until the
//! request carries `confirm: true`. Without it the response has status
//! `needs_confirmation` and nothing changes.

use antswitch_core::{AntennaSlot, ConnectionGrid, Decision, RadioPort};
use antswitch_store::KeyValueStore;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::controller::{SettingsUpdate, Snapshot, SwitchController};
use crate::error::SwitchError;

/// Operator request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ControlRequest {
    /// Report the current state
    GetState,

    /// Report the preset list (the snapshot carries it)
    ListPresets,

    /// Connect or disconnect one radio port from one antenna
    SetCell {
        port: RadioPort,
        slot: AntennaSlot,
        connected: bool,
        #[serde(default)]
        confirm: bool,
    },

    /// Restore a saved preset
    LoadPreset {
        index: usize,
        #[serde(default)]
        confirm: bool,
    },

    /// Save a preset from the given grid, or the live grid when omitted
    SavePreset {
        name: String,
        #[serde(default)]
        grid: Option<ConnectionGrid>,
    },

    /// Change names, override flag or device settings, then persist
    UpdateSettings(SettingsUpdate),
}

/// Outcome class of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    /// Request carried out
    Ok,
    /// Allowed only with operator confirmation; nothing changed
    NeedsConfirmation,
    /// Request refused or failed; see `error`
    Rejected,
}

/// Machine-readable failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlFailure {
    pub code: String,
    pub message: String,
}

impl From<&SwitchError> for ControlFailure {
    fn from(err: &SwitchError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Answer to every request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ControlFailure>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// State after the request
    pub state: Snapshot,
}

impl ControlResponse {
    pub fn is_ok(&self) -> bool {
        self.status == ResponseStatus::Ok
    }

    /// Failure for a request that could not be decoded
    pub fn bad_request(message: String, state: Snapshot) -> Self {
        Self {
            status: ResponseStatus::Rejected,
            error: Some(ControlFailure {
                code: "bad_request".to_string(),
                message,
            }),
            warning: None,
            state,
        }
    }

    /// Error code, if the request failed
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

/// Controller plus the store it persists to
#[derive(Debug)]
pub struct ControlSurface<S> {
    controller: SwitchController,
    store: S,
}

impl<S: KeyValueStore> ControlSurface<S> {
    pub fn new(controller: SwitchController, store: S) -> Self {
        Self { controller, store }
    }

    pub fn controller(&self) -> &SwitchController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SwitchController {
        &mut self.controller
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist the full state (shutdown flush)
    pub fn flush(&mut self) -> Result<(), SwitchError> {
        self.controller.save_all(&mut self.store)
    }

    /// Decode a JSON request and handle it
    pub fn handle_json(&mut self, line: &str) -> ControlResponse {
        match serde_json::from_str::<ControlRequest>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!("Bad control request: {}", e);
                ControlResponse::bad_request(e.to_string(), self.controller.snapshot())
            }
        }
    }

    /// Handle one request to completion
    pub fn handle(&mut self, request: ControlRequest) -> ControlResponse {
        debug!("Control request: {:?}", request);

        let outcome = match request {
            ControlRequest::GetState | ControlRequest::ListPresets => Ok(Outcome::Done),

            ControlRequest::SetCell {
                port,
                slot,
                connected,
                confirm,
            } => {
                let decision = self.controller.preview_cell(port, slot, connected);
                if decision.needs_confirmation() && !confirm {
                    Ok(Outcome::Confirm(format!(
                        "{} on {} would share an antenna with {}",
                        port,
                        slot,
                        port.other()
                    )))
                } else {
                    self.controller
                        .set_cell(port, slot, connected)
                        .map(|commit| Outcome::from_decision(commit.decision))
                }
            }

            ControlRequest::LoadPreset { index, confirm } => {
                match self.controller.preview_preset(index) {
                    Ok(decision) if decision.needs_confirmation() && !confirm => Ok(
                        Outcome::Confirm(format!("preset {} connects both radios to one antenna", index)),
                    ),
                    Ok(_) => self
                        .controller
                        .load_preset(index)
                        .map(|commit| Outcome::from_decision(commit.decision)),
                    Err(e) => Err(e),
                }
            }

            ControlRequest::SavePreset { name, grid } => {
                let grid = grid.unwrap_or_else(|| self.controller.state());
                self.controller
                    .save_preset(&name, grid)
                    .and_then(|_| self.controller.save_all(&mut self.store))
                    .map(|_| Outcome::Done)
            }

            ControlRequest::UpdateSettings(update) => {
                self.controller.apply_settings(update);
                self.controller
                    .save_all(&mut self.store)
                    .map(|_| Outcome::Done)
            }
        };

        let state = self.controller.snapshot();
        match outcome {
            Ok(Outcome::Done) => ControlResponse {
                status: ResponseStatus::Ok,
                error: None,
                warning: None,
                state,
            },
            Ok(Outcome::Warned(warning)) => ControlResponse {
                status: ResponseStatus::Ok,
                error: None,
                warning: Some(warning),
                state,
            },
            Ok(Outcome::Confirm(warning)) => ControlResponse {
                status: ResponseStatus::NeedsConfirmation,
                error: None,
                warning: Some(warning),
                state,
            },
            Err(e) => ControlResponse {
                status: ResponseStatus::Rejected,
                error: Some(ControlFailure::from(&e)),
                warning: None,
                state,
            },
        }
    }
}

enum Outcome {
    Done,
    Warned(String),
    Confirm(String),
}

impl Outcome {
    fn from_decision(decision: Decision) -> Self {
        match decision {
            Decision::AllowedWithWarning => {
                Outcome::Warned("both radios share an antenna (override enabled)".to_string())
            }
            _ => Outcome::Done,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::DeviceUpdate;
    use antswitch_relay::SimulatedRelays;
    use antswitch_store::MemoryStore;

    fn surface() -> ControlSurface<MemoryStore> {
        ControlSurface::new(
            SwitchController::new(Box::new(SimulatedRelays::new())),
            MemoryStore::new(),
        )
    }

    #[test]
    fn test_json_request_decoding() {
        let request: ControlRequest =
            serde_json::from_str(r#"{"op":"set_cell","port":"com2","slot":3,"connected":true}"#)
                .unwrap();
        assert_eq!(
            request,
            ControlRequest::SetCell {
                port: RadioPort::Secondary,
                slot: AntennaSlot::new(3).unwrap(),
                connected: true,
                confirm: false,
            }
        );

        let request: ControlRequest = serde_json::from_str(
            r#"{"op":"update_settings","allow_cross_connection":true,"device":{"hostname":"shack-sw"}}"#,
        )
        .unwrap();
        assert!(matches!(
            request,
            ControlRequest::UpdateSettings(SettingsUpdate {
                allow_cross_connection: Some(true),
                device: Some(DeviceUpdate { hostname: Some(ref name), .. }),
                ..
            }) if name == "shack-sw"
        ));
    }

    #[test]
    fn test_bad_request() {
        let mut surface = surface();

        let response = surface.handle_json(r#"{"op":"set_cell","port":"com1","slot":9,"connected":true}"#);
        assert_eq!(response.status, ResponseStatus::Rejected);
        assert_eq!(response.error_code(), Some("bad_request"));

        let response = surface.handle_json("not json");
        assert_eq!(response.error_code(), Some("bad_request"));
    }

    #[test]
    fn test_device_settings_update() {
        let mut surface = surface();

        let response = surface.handle_json(
            r#"{"op":"update_settings","device":{"hostname":"tower","ap_ssid":"ShackAP","wifi_password":"pw"}}"#,
        );

        assert!(response.is_ok());
        assert_eq!(response.state.device.hostname, "tower");
        assert_eq!(response.state.device.ap_ssid, "ShackAP");
        assert_eq!(response.state.device.wifi_password, "********");
        assert_eq!(surface.controller().device().wifi_password, "pw");
    }

    #[test]
    fn test_unknown_settings_field_is_bad_request() {
        let mut surface = surface();

        let response =
            surface.handle_json(r#"{"op":"update_settings","allow_cross_conection":true}"#);
        assert_eq!(response.status, ResponseStatus::Rejected);
        assert_eq!(response.error_code(), Some("bad_request"));
        assert!(!response.state.allow_cross_connection);

        let response =
            surface.handle_json(r#"{"op":"update_settings","device":{"host_name":"tower"}}"#);
        assert_eq!(response.error_code(), Some("bad_request"));
        assert_eq!(response.state.device.hostname, "antswitch");
    }

    #[test]
    fn test_interlock_rejection_wire_status() {
        let mut surface = surface();
        surface.handle_json(r#"{"op":"set_cell","port":"com1","slot":2,"connected":true}"#);

        let response =
            surface.handle_json(r#"{"op":"set_cell","port":"com2","slot":2,"connected":true}"#);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["status"], "rejected");
        assert_eq!(json["error"]["code"], "danger_rejected");
    }

    #[test]
    fn test_confirmation_flow() {
        let mut surface = surface();
        let slot = AntennaSlot::new(0).unwrap();
        surface.controller_mut().set_allow_cross_connection(true);
        surface
            .controller_mut()
            .set_cell(RadioPort::Primary, slot, true)
            .unwrap();

        let unconfirmed = surface.handle(ControlRequest::SetCell {
            port: RadioPort::Secondary,
            slot,
            connected: true,
            confirm: false,
        });
        assert_eq!(unconfirmed.status, ResponseStatus::NeedsConfirmation);
        assert!(!unconfirmed.state.dangerous);

        let confirmed = surface.handle(ControlRequest::SetCell {
            port: RadioPort::Secondary,
            slot,
            connected: true,
            confirm: true,
        });
        assert!(confirmed.is_ok());
        assert!(confirmed.warning.is_some());
        assert!(confirmed.state.dangerous);
    }

    #[test]
    fn test_save_preset_persists() {
        let mut surface = surface();
        let response = surface.handle(ControlRequest::SavePreset {
            name: "Low bands".to_string(),
            grid: None,
        });

        assert!(response.is_ok());
        assert_eq!(response.state.presets.len(), 1);
        assert!(surface.store().contains(antswitch_store::NAMESPACE, "preset.0"));
    }

    #[test]
    fn test_response_json_shape() {
        let mut surface = surface();
        let response = surface.handle(ControlRequest::LoadPreset {
            index: 0,
            confirm: false,
        });

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["error"]["code"], "not_found");
        assert!(json.get("warning").is_none());
        assert_eq!(json["state"]["antenna_names"][0], "ANT1");
    }
}
