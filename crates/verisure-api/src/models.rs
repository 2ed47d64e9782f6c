// Verisure API response and request types
//
// Models for the Verisure cloud JSON API. Vendor enums (arm state, plug
// state, lock state) are kept as raw strings here; `verisure-core` owns
// their interpretation so an unknown value is surfaced there instead of
// failing deserialization of the whole snapshot. Fields use
// `#[serde(default)]` liberally because presence varies by installation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `result` value of a transaction status poll that has not settled yet.
pub const NO_DATA: &str = "NO_DATA";

/// Parse a vendor ISO-8601 timestamp, dropping unparseable values.
fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

// ── Session ──────────────────────────────────────────────────────────

/// Body of `POST /cookie`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub cookie: String,
}

// ── Installation ─────────────────────────────────────────────────────

/// One customer site, from `GET /installation/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub giid: String,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Installation {
    /// Human-readable address: street, then alias, then the id.
    pub fn address(&self) -> &str {
        self.street
            .as_deref()
            .or(self.alias.as_deref())
            .unwrap_or(&self.giid)
    }
}

// ── Overview ─────────────────────────────────────────────────────────

/// Full point-in-time snapshot of one installation, from
/// `GET /installation/{giid}/overview`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    #[serde(default)]
    pub arm_state: Option<ArmState>,
    #[serde(default)]
    pub smart_plugs: Vec<SmartPlugStatus>,
    #[serde(default)]
    pub control_plugs: Vec<SmartPlugStatus>,
    #[serde(default)]
    pub climate_values: Vec<ClimateValue>,
    #[serde(default)]
    pub door_lock_status_list: Vec<DoorLockStatus>,
}

impl Overview {
    /// Every plug in the snapshot, smart plugs first.
    pub fn plugs(&self) -> impl Iterator<Item = &SmartPlugStatus> {
        self.smart_plugs.iter().chain(self.control_plugs.iter())
    }
}

/// Alarm arm state inside the overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmState {
    /// `ARMED_AWAY`, `ARMED_HOME` or `DISARMED`.
    pub status_type: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub changed_via: Option<String>,
}

impl ArmState {
    /// When the arm state last changed.
    pub fn changed_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.date.as_deref())
    }
}

/// Smart plug or control plug entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPlugStatus {
    pub device_label: String,
    #[serde(default)]
    pub area: String,
    /// `ON` or `OFF`.
    #[serde(default)]
    pub current_state: String,
}

/// Climate reading from a detector that reports temperature.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClimateValue {
    pub device_label: String,
    #[serde(default)]
    pub device_area: String,
    /// Hardware code, e.g. `SMOKE2` or `HUMIDITY1`.
    #[serde(default)]
    pub device_type: String,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub humidity: Option<f64>,
    #[serde(default)]
    pub time: Option<String>,
}

impl ClimateValue {
    /// When this reading was taken.
    pub fn measured_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.time.as_deref())
    }
}

/// Door lock entry inside the overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorLockStatus {
    pub device_label: String,
    #[serde(default)]
    pub area: String,
    /// `LOCKED` or `UNLOCKED`.
    #[serde(default)]
    pub locked_state: String,
}

// ── Door lock search ─────────────────────────────────────────────────

/// Door lock record from `GET /installation/{giid}/doorlockstate/search`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoorLockRecord {
    pub device_label: String,
    #[serde(default)]
    pub area: Option<String>,
    /// `LOCKED` or `UNLOCKED`.
    #[serde(default)]
    pub current_lock_state: String,
    /// `NONE` when no change is pending, otherwise the requested state.
    #[serde(default)]
    pub pending_lock_state: Option<String>,
    #[serde(default)]
    pub motor_jam: bool,
    #[serde(default)]
    pub secure_mode_active: Option<bool>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Command payloads ─────────────────────────────────────────────────

/// One element of the `POST /installation/{giid}/smartplug/state` array.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartPlugStateChange {
    pub device_label: String,
    pub state: bool,
}

/// Body of `PUT /installation/{giid}/device/{label}/{lock|unlock}`.
#[derive(Debug, Clone, Serialize)]
pub struct DoorLockCommand {
    pub code: String,
}

/// Body of `PUT /installation/{giid}/armstate/code`.
#[derive(Debug, Clone, Serialize)]
pub struct ArmStateCommand {
    pub code: String,
    pub state: String,
}

/// Error body returned with 4xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorError {
    #[serde(default)]
    pub error_group: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overview_tolerates_missing_collections() {
        let overview: Overview = serde_json::from_value(json!({
            "armState": { "statusType": "DISARMED", "date": "2024-03-01T18:04:11.000Z" }
        }))
        .unwrap();

        assert!(overview.smart_plugs.is_empty());
        assert!(overview.door_lock_status_list.is_empty());
        let arm = overview.arm_state.unwrap();
        assert_eq!(arm.status_type, "DISARMED");
        assert!(arm.changed_at().is_some());
    }

    #[test]
    fn plugs_chain_both_collections() {
        let overview: Overview = serde_json::from_value(json!({
            "smartPlugs": [{ "deviceLabel": "A", "area": "Kitchen", "currentState": "ON" }],
            "controlPlugs": [{ "deviceLabel": "B", "area": "Hall", "currentState": "OFF" }]
        }))
        .unwrap();

        let labels: Vec<_> = overview.plugs().map(|p| p.device_label.as_str()).collect();
        assert_eq!(labels, ["A", "B"]);
    }

    #[test]
    fn installation_address_falls_back() {
        let with_street: Installation =
            serde_json::from_value(json!({ "giid": "1", "street": "Main St 1" })).unwrap();
        let alias_only: Installation =
            serde_json::from_value(json!({ "giid": "2", "alias": "Cabin" })).unwrap();
        let bare: Installation = serde_json::from_value(json!({ "giid": "3" })).unwrap();

        assert_eq!(with_street.address(), "Main St 1");
        assert_eq!(alias_only.address(), "Cabin");
        assert_eq!(bare.address(), "3");
    }

    #[test]
    fn bad_timestamp_is_dropped() {
        let reading: ClimateValue = serde_json::from_value(json!({
            "deviceLabel": "X", "temperature": 21.5, "time": "yesterday"
        }))
        .unwrap();
        assert_eq!(reading.temperature, Some(21.5));
        assert!(reading.measured_at().is_none());
    }
}
