// ── Vendor <-> accessory mapping ──
//
// Pure functions. Unknown vendor strings are errors, never defaults.

use verisure_api::models::{ArmState, DoorLockRecord, DoorLockStatus, SmartPlugStatus};

use crate::error::CoreError;
use crate::model::{LockCode, LockState, LockTarget, PlugState, SecurityState, VendorArmState};

fn unknown(kind: &'static str, value: &str) -> CoreError {
    CoreError::UnknownState {
        kind,
        value: value.to_owned(),
    }
}

/// `ARMED_AWAY` -> Away, `ARMED_HOME` -> Stay, `DISARMED` -> Disarmed.
pub fn security_state_from_vendor(raw: &str) -> Result<SecurityState, CoreError> {
    let state: VendorArmState = raw.parse().map_err(|_| unknown("arm", raw))?;
    Ok(match state {
        VendorArmState::ArmedAway => SecurityState::Away,
        VendorArmState::ArmedHome => SecurityState::Stay,
        VendorArmState::Disarmed => SecurityState::Disarmed,
    })
}

pub fn security_state(arm: &ArmState) -> Result<SecurityState, CoreError> {
    security_state_from_vendor(&arm.status_type)
}

/// Arm command state for a target. Stay and Night both arm at home.
pub fn vendor_arm_state(target: SecurityState) -> VendorArmState {
    match target {
        SecurityState::Away => VendorArmState::ArmedAway,
        SecurityState::Stay | SecurityState::Night => VendorArmState::ArmedHome,
        SecurityState::Disarmed => VendorArmState::Disarmed,
    }
}

fn lock_state_from_code(raw: &str) -> LockState {
    if matches!(raw.parse::<LockCode>(), Ok(LockCode::Unlocked)) {
        LockState::Unsecured
    } else {
        LockState::Secured
    }
}

/// A jammed motor wins; otherwise `UNLOCKED` is unsecured and anything else
/// secured.
pub fn lock_current_state(record: &DoorLockRecord) -> LockState {
    if record.motor_jam {
        return LockState::Jammed;
    }
    lock_state_from_code(&record.current_lock_state)
}

/// Pending state if one is set, otherwise the current state.
pub fn lock_target_state(record: &DoorLockRecord) -> LockState {
    match record.pending_lock_state.as_deref() {
        None | Some("") => lock_current_state(record),
        Some(raw) if matches!(raw.parse::<LockCode>(), Ok(LockCode::None)) => {
            lock_current_state(record)
        }
        Some(raw) => lock_state_from_code(raw),
    }
}

/// Lock value from the overview at discovery time.
pub fn initial_lock_state(status: &DoorLockStatus) -> LockTarget {
    if matches!(status.locked_state.parse::<LockCode>(), Ok(LockCode::Locked)) {
        LockTarget::Secured
    } else {
        LockTarget::Unsecured
    }
}

/// Target lock value derived from a current one. A jammed lock targets
/// secured, matching the host's expectation that jams happen while locking.
pub fn lock_target_from_state(state: LockState) -> LockTarget {
    match state {
        LockState::Unsecured => LockTarget::Unsecured,
        LockState::Secured | LockState::Jammed => LockTarget::Secured,
    }
}

pub fn plug_state(plug: &SmartPlugStatus) -> Result<bool, CoreError> {
    match plug.current_state.parse::<PlugState>() {
        Ok(PlugState::On) => Ok(true),
        Ok(PlugState::Off) => Ok(false),
        Err(_) => Err(unknown("plug", &plug.current_state)),
    }
}
