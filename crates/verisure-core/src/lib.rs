// verisure-core: State reconciliation between the Verisure cloud and an
// accessory host (get/set over an eventually-consistent backend).

pub mod bridge;
pub mod config;
pub mod convert;
pub mod device;
pub mod error;
pub mod host;
pub mod model;
pub mod names;
pub mod poller;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use bridge::{Bridge, ConnectionState};
pub use config::{BridgeConfig, PollPolicy, TlsVerification};
pub use device::{Accessory, Alarm, ClimateSensor, DoorLock, SmartPlug};
pub use error::CoreError;
pub use host::AccessoryHandle;
pub use names::NameRegistry;
pub use poller::{ALREADY_IN_TARGET, PollState, TransactionPoller};
pub use session::Session;

pub use model::{
    AccessoryInfo, AccessoryValue, Characteristics, DeviceType, LockState, LockTarget,
    SecurityState, ServiceKind,
};

// Vendor records handed to device constructors.
pub use verisure_api::models::Installation;
