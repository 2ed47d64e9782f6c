// ── Devices ──
//
// The closed set of accessory kinds. Each kind turns host get/set calls
// into gateway calls and transaction waits; `Accessory` gives the host one
// uniform surface over all of them.

mod alarm;
mod climate;
mod door_lock;
mod smart_plug;

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::watch;
use tracing::error;
use verisure_api::models::Installation;

pub use alarm::Alarm;
pub use climate::ClimateSensor;
pub use door_lock::DoorLock;
pub use smart_plug::SmartPlug;

use crate::error::CoreError;
use crate::model::{AccessoryInfo, AccessoryValue, Characteristics};
use crate::session::Session;

/// State shared by every device kind.
pub(crate) struct DeviceCore {
    session: Session,
    installation: Arc<Installation>,
    label: String,
    name: String,
    info: AccessoryInfo,
    state: watch::Sender<Characteristics>,
    reported_at: watch::Sender<Option<DateTime<Utc>>>,
}

impl DeviceCore {
    pub(crate) fn new(
        session: Session,
        installation: Arc<Installation>,
        label: impl Into<String>,
        name: String,
        info: AccessoryInfo,
        initial: Characteristics,
    ) -> Self {
        Self {
            session,
            installation,
            label: label.into(),
            name,
            info,
            state: watch::Sender::new(initial),
            reported_at: watch::Sender::new(None),
        }
    }

    pub(crate) fn giid(&self) -> &str {
        &self.installation.giid
    }

    pub(crate) fn snapshot(&self) -> Characteristics {
        *self.state.borrow()
    }

    /// Record a freshly read current value.
    pub(crate) fn observe_current(&self, value: AccessoryValue) {
        self.state.send_modify(|c| c.current = value);
    }

    pub(crate) fn observe_target(&self, value: AccessoryValue) {
        self.state.send_modify(|c| c.target = Some(value));
    }

    /// Keep the vendor timestamp of the latest reading. Readings without
    /// one leave the previous timestamp in place.
    pub(crate) fn observe_reported_at(&self, at: Option<DateTime<Utc>>) {
        if at.is_some() {
            self.reported_at.send_replace(at);
        }
    }

    /// Replace current and target in one update.
    pub(crate) fn publish(&self, characteristics: Characteristics) {
        self.state.send_replace(characteristics);
    }
}

/// One exposed accessory.
pub enum Accessory {
    Alarm(Alarm),
    DoorLock(DoorLock),
    SmartPlug(SmartPlug),
    ClimateSensor(ClimateSensor),
}

impl Accessory {
    fn core(&self) -> &DeviceCore {
        match self {
            Self::Alarm(d) => &d.core,
            Self::DoorLock(d) => &d.core,
            Self::SmartPlug(d) => &d.core,
            Self::ClimateSensor(d) => &d.core,
        }
    }

    /// Unique display name.
    pub fn name(&self) -> &str {
        &self.core().name
    }

    /// Vendor device label (installation id for alarms).
    pub fn label(&self) -> &str {
        &self.core().label
    }

    pub fn info(&self) -> &AccessoryInfo {
        &self.core().info
    }

    pub fn installation(&self) -> &Installation {
        &self.core().installation
    }

    pub fn session(&self) -> &Session {
        &self.core().session
    }

    /// Last value pair seen or set, without contacting the backend.
    pub fn last_known(&self) -> Characteristics {
        self.core().snapshot()
    }

    /// When the backend last reported this device's state, if it says.
    /// Only alarms and climate sensors carry a timestamp.
    pub fn reported_at(&self) -> Option<DateTime<Utc>> {
        *self.core().reported_at.borrow()
    }

    /// Observe value changes.
    pub fn subscribe(&self) -> watch::Receiver<Characteristics> {
        self.core().state.subscribe()
    }

    pub fn supports_set(&self) -> bool {
        !matches!(self, Self::ClimateSensor(_))
    }

    pub async fn get_current_value(&self) -> Result<AccessoryValue, CoreError> {
        let result = match self {
            Self::Alarm(d) => d.current_state().await.map(AccessoryValue::Security),
            Self::DoorLock(d) => d.current_state().await.map(AccessoryValue::Lock),
            Self::SmartPlug(d) => d.current_state().await.map(AccessoryValue::Switch),
            Self::ClimateSensor(d) => d.temperature().await.map(AccessoryValue::Temperature),
        };
        self.report("get current value", result)
    }

    pub async fn get_target_value(&self) -> Result<AccessoryValue, CoreError> {
        let result = match self {
            Self::Alarm(d) => d.current_state().await.map(AccessoryValue::Security),
            Self::DoorLock(d) => d.target_state().await.map(AccessoryValue::LockTarget),
            Self::SmartPlug(d) => d.current_state().await.map(AccessoryValue::Switch),
            Self::ClimateSensor(_) => Err(self.read_only()),
        };
        self.report("get target value", result)
    }

    pub async fn set_target_value(&self, value: AccessoryValue) -> Result<(), CoreError> {
        let result = match (self, value) {
            (Self::Alarm(d), AccessoryValue::Security(target)) => d.set_target_state(target).await,
            (Self::DoorLock(d), AccessoryValue::LockTarget(target)) => {
                d.set_target_state(target).await
            }
            (Self::SmartPlug(d), AccessoryValue::Switch(on)) => d.set_state(on).await,
            (Self::ClimateSensor(_), _) => Err(self.read_only()),
            (_, value) => Err(CoreError::InvalidValue {
                device: self.name().to_owned(),
                value: value.to_string(),
            }),
        };
        self.report("set target value", result)
    }

    /// Parse a host characteristic value into this accessory's target type.
    pub fn value_from_characteristic(&self, raw: &Value) -> Result<AccessoryValue, CoreError> {
        let parsed = match self {
            Self::Alarm(_) => AccessoryValue::parse_security(raw),
            Self::DoorLock(_) => AccessoryValue::parse_lock_target(raw),
            Self::SmartPlug(_) => AccessoryValue::parse_switch(raw),
            Self::ClimateSensor(_) => return Err(self.read_only()),
        };
        parsed.ok_or_else(|| CoreError::InvalidValue {
            device: self.name().to_owned(),
            value: raw.to_string(),
        })
    }

    fn read_only(&self) -> CoreError {
        CoreError::Unsupported {
            operation: format!("{} is read-only", self.name()),
        }
    }

    fn report<T>(&self, operation: &str, result: Result<T, CoreError>) -> Result<T, CoreError> {
        if let Err(ref err) = result {
            error!(
                device = %self.name(),
                giid = %self.installation().giid,
                error = %err,
                "{operation} failed"
            );
        }
        result
    }
}

impl fmt::Debug for Accessory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessory")
            .field("name", &self.name())
            .field("label", &self.label())
            .field("service", &self.info().service)
            .field("state", &self.last_known())
            .finish()
    }
}

impl From<Alarm> for Accessory {
    fn from(d: Alarm) -> Self {
        Self::Alarm(d)
    }
}

impl From<DoorLock> for Accessory {
    fn from(d: DoorLock) -> Self {
        Self::DoorLock(d)
    }
}

impl From<SmartPlug> for Accessory {
    fn from(d: SmartPlug) -> Self {
        Self::SmartPlug(d)
    }
}

impl From<ClimateSensor> for Accessory {
    fn from(d: ClimateSensor) -> Self {
        Self::ClimateSensor(d)
    }
}
