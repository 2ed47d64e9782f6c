// ── Vendor enums ──
//
// String forms used on the wire by the Verisure API. Parsing an unknown
// value fails; callers turn that into `CoreError::UnknownState`.

use strum::{AsRefStr, Display, EnumString};

/// Alarm arm state (`armState.statusType`, and the `state` of an arm command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum VendorArmState {
    ArmedAway,
    ArmedHome,
    Disarmed,
}

/// Smart plug state (`currentState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum PlugState {
    On,
    Off,
}

/// Door lock state codes (`lockedState`, `currentLockState`, `pendingLockState`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum LockCode {
    Locked,
    Unlocked,
    /// Only seen as `pendingLockState`.
    None,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn arm_state_wire_names() {
        assert_eq!(VendorArmState::ArmedAway.as_ref(), "ARMED_AWAY");
        assert_eq!(VendorArmState::ArmedHome.to_string(), "ARMED_HOME");
        assert_eq!(
            "DISARMED".parse::<VendorArmState>().unwrap(),
            VendorArmState::Disarmed
        );
        assert!("ARMED_NIGHT".parse::<VendorArmState>().is_err());
    }

    #[test]
    fn plug_and_lock_wire_names() {
        assert_eq!("ON".parse::<PlugState>().unwrap(), PlugState::On);
        assert_eq!("OFF".parse::<PlugState>().unwrap(), PlugState::Off);
        assert!("on".parse::<PlugState>().is_err());
        assert_eq!("UNLOCKED".parse::<LockCode>().unwrap(), LockCode::Unlocked);
        assert_eq!("NONE".parse::<LockCode>().unwrap(), LockCode::None);
    }
}
