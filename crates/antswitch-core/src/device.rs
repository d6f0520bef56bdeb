//! Device and network settings
//!
//! These are stored alongside the switch state so the network layer can pick
//! them up at boot. The switch engine only carries them around.

/// Persisted network identity of the switch
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct DeviceSettings {
    /// Network hostname
    pub hostname: String,
    /// Station-mode WiFi network
    pub wifi_ssid: String,
    /// Station-mode WiFi passphrase
    pub wifi_password: String,
    /// SSID of the fallback access point
    pub ap_ssid: String,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            hostname: "antswitch".to_string(),
            wifi_ssid: String::new(),
            wifi_password: String::new(),
            ap_ssid: "AntennaSwitch".to_string(),
        }
    }
}

impl DeviceSettings {
    /// Whether station-mode credentials have been configured
    pub fn has_station_credentials(&self) -> bool {
        !self.wifi_ssid.trim().is_empty()
    }

    /// Copy safe to show to a client: the passphrase is masked
    pub fn redacted(&self) -> Self {
        let wifi_password = if self.wifi_password.is_empty() {
            String::new()
        } else {
            "********".to_string()
        };
        Self {
            wifi_password,
            ..self.clone()
        }
    }
}
