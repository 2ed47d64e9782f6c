// ── Device types and accessory information ──

use serde::Serialize;
use strum::{Display, EnumString};

pub const MANUFACTURER: &str = "Verisure";

/// Hardware codes known to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize)]
#[strum(serialize_all = "UPPERCASE")]
pub enum DeviceType {
    Alarm,
    Doorlock,
    Humidity1,
    Siren1,
    Smartcamera1,
    Smartplug,
    Smoke2,
    Voicebox1,
}

impl DeviceType {
    /// Display title used for names and the model field.
    pub fn title(self) -> &'static str {
        match self {
            Self::Alarm => "Larm",
            Self::Doorlock => "Yale Doorman",
            Self::Humidity1 => "Klimatdetektor",
            Self::Siren1 => "Siren",
            Self::Smartcamera1 => "Smart Camera",
            Self::Smartplug => "Smart plug",
            Self::Smoke2 => "Rökdetektor",
            Self::Voicebox1 => "Directenhet",
        }
    }

    /// Title for a raw hardware code, including codes the bridge doesn't know.
    pub fn title_for(code: &str) -> String {
        code.parse::<Self>()
            .map_or_else(|_| format!("Okänd enhet: {code}"), |t| t.title().to_owned())
    }
}

/// Which accessory service a device is exposed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum ServiceKind {
    SecuritySystem,
    LockMechanism,
    Switch,
    TemperatureSensor,
}

/// Accessory information block shown by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessoryInfo {
    pub manufacturer: &'static str,
    pub model: String,
    pub serial_number: String,
    pub service: ServiceKind,
    /// Host accessory category, where the default doesn't fit.
    pub category: Option<u8>,
}

impl AccessoryInfo {
    pub(crate) fn new(model: String, serial_number: String, service: ServiceKind) -> Self {
        Self {
            manufacturer: MANUFACTURER,
            model,
            serial_number,
            service,
            category: None,
        }
    }

    pub(crate) fn with_category(mut self, category: u8) -> Self {
        self.category = Some(category);
        self
    }
}
