// ── Accessory-facing values ──
//
// The numeric characteristic values the host works with. Each device
// publishes a `Characteristics` pair so current and target change together.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Security system state. Also used as the target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum SecurityState {
    Stay = 0,
    Away = 1,
    Night = 2,
    Disarmed = 3,
}

impl From<SecurityState> for u8 {
    fn from(state: SecurityState) -> Self {
        match state {
            SecurityState::Stay => 0,
            SecurityState::Away => 1,
            SecurityState::Night => 2,
            SecurityState::Disarmed => 3,
        }
    }
}

impl SecurityState {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Stay),
            1 => Some(Self::Away),
            2 => Some(Self::Night),
            3 => Some(Self::Disarmed),
            _ => None,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Stay => "stay",
            Self::Away => "away",
            Self::Night => "night",
            Self::Disarmed => "disarmed",
        }
    }

    fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "stay" | "home" => Some(Self::Stay),
            "away" => Some(Self::Away),
            "night" => Some(Self::Night),
            "disarmed" | "off" => Some(Self::Disarmed),
            _ => None,
        }
    }
}

/// Lock mechanism current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum LockState {
    Unsecured = 0,
    Secured = 1,
    Jammed = 2,
}

/// Lock mechanism target state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(u8)]
pub enum LockTarget {
    Unsecured = 0,
    Secured = 1,
}

impl From<LockState> for u8 {
    fn from(state: LockState) -> Self {
        match state {
            LockState::Unsecured => 0,
            LockState::Secured => 1,
            LockState::Jammed => 2,
        }
    }
}

impl From<LockTarget> for u8 {
    fn from(target: LockTarget) -> Self {
        u8::from(LockState::from(target))
    }
}

impl LockTarget {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Unsecured),
            1 => Some(Self::Secured),
            _ => None,
        }
    }

    fn from_label(raw: &str) -> Option<Self> {
        match raw {
            "unlocked" | "unsecured" | "unlock" => Some(Self::Unsecured),
            "locked" | "secured" | "lock" => Some(Self::Secured),
            _ => None,
        }
    }
}

impl From<LockTarget> for LockState {
    fn from(target: LockTarget) -> Self {
        match target {
            LockTarget::Unsecured => Self::Unsecured,
            LockTarget::Secured => Self::Secured,
        }
    }
}

/// One characteristic value, tagged by what it describes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AccessoryValue {
    Security(SecurityState),
    Lock(LockState),
    LockTarget(LockTarget),
    Switch(bool),
    Temperature(f64),
}

impl AccessoryValue {
    /// Numeric characteristic representation handed to the host.
    pub fn to_characteristic(self) -> Value {
        match self {
            Self::Security(s) => Value::from(u8::from(s)),
            Self::Lock(s) => Value::from(u8::from(s)),
            Self::LockTarget(s) => Value::from(u8::from(s)),
            Self::Switch(on) => Value::from(u8::from(on)),
            Self::Temperature(t) => Value::from(t),
        }
    }

    /// Parse a security state from a characteristic number or a label.
    pub(crate) fn parse_security(raw: &Value) -> Option<Self> {
        match raw {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .and_then(SecurityState::from_u8),
            Value::String(s) => s
                .parse::<u8>()
                .ok()
                .and_then(SecurityState::from_u8)
                .or_else(|| SecurityState::from_label(&s.to_ascii_lowercase())),
            _ => None,
        }
        .map(Self::Security)
    }

    /// Parse a lock target from a characteristic number or a label.
    pub(crate) fn parse_lock_target(raw: &Value) -> Option<Self> {
        match raw {
            Value::Number(n) => n
                .as_u64()
                .and_then(|n| u8::try_from(n).ok())
                .and_then(LockTarget::from_u8),
            Value::Bool(b) => Some(if *b {
                LockTarget::Secured
            } else {
                LockTarget::Unsecured
            }),
            Value::String(s) => s
                .parse::<u8>()
                .ok()
                .and_then(LockTarget::from_u8)
                .or_else(|| LockTarget::from_label(&s.to_ascii_lowercase())),
            _ => None,
        }
        .map(Self::LockTarget)
    }

    /// Parse a switch state from a bool, 0/1 or on/off.
    pub(crate) fn parse_switch(raw: &Value) -> Option<Self> {
        match raw {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => match n.as_u64() {
                Some(0) => Some(false),
                Some(1) => Some(true),
                _ => None,
            },
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "1" | "on" | "true" => Some(true),
                "0" | "off" | "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
        .map(Self::Switch)
    }
}

impl fmt::Display for AccessoryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Security(s) => f.write_str(s.label()),
            Self::Lock(LockState::Unsecured) | Self::LockTarget(LockTarget::Unsecured) => {
                f.write_str("unsecured")
            }
            Self::Lock(LockState::Secured) | Self::LockTarget(LockTarget::Secured) => {
                f.write_str("secured")
            }
            Self::Lock(LockState::Jammed) => f.write_str("jammed"),
            Self::Switch(true) => f.write_str("on"),
            Self::Switch(false) => f.write_str("off"),
            Self::Temperature(t) => write!(f, "{t:.1} °C"),
        }
    }
}

/// Last-known value pair of one accessory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Characteristics {
    pub current: AccessoryValue,
    /// `None` for read-only accessories.
    pub target: Option<AccessoryValue>,
}

impl Characteristics {
    pub fn read_only(current: AccessoryValue) -> Self {
        Self {
            current,
            target: None,
        }
    }

    pub fn settled(value: AccessoryValue) -> Self {
        Self {
            current: value,
            target: Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn characteristic_numbers() {
        assert_eq!(
            AccessoryValue::Security(SecurityState::Disarmed).to_characteristic(),
            json!(3)
        );
        assert_eq!(
            AccessoryValue::Lock(LockState::Jammed).to_characteristic(),
            json!(2)
        );
        assert_eq!(AccessoryValue::Switch(true).to_characteristic(), json!(1));
        assert_eq!(
            AccessoryValue::Temperature(21.5).to_characteristic(),
            json!(21.5)
        );
    }

    #[test]
    fn parse_security_accepts_numbers_and_labels() {
        assert_eq!(
            AccessoryValue::parse_security(&json!(1)),
            Some(AccessoryValue::Security(SecurityState::Away))
        );
        assert_eq!(
            AccessoryValue::parse_security(&json!("Night")),
            Some(AccessoryValue::Security(SecurityState::Night))
        );
        assert_eq!(AccessoryValue::parse_security(&json!(4)), None);
        assert_eq!(AccessoryValue::parse_security(&json!(null)), None);
    }

    #[test]
    fn parse_lock_target_rejects_jammed() {
        assert_eq!(
            AccessoryValue::parse_lock_target(&json!("lock")),
            Some(AccessoryValue::LockTarget(LockTarget::Secured))
        );
        assert_eq!(AccessoryValue::parse_lock_target(&json!(2)), None);
    }

    #[test]
    fn parse_switch() {
        assert_eq!(
            AccessoryValue::parse_switch(&json!("on")),
            Some(AccessoryValue::Switch(true))
        );
        assert_eq!(
            AccessoryValue::parse_switch(&json!(0)),
            Some(AccessoryValue::Switch(false))
        );
        assert_eq!(AccessoryValue::parse_switch(&json!(7)), None);
    }
}
