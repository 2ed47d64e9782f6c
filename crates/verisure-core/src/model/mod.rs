// ── Domain model ──
//
// Accessory-facing values and metadata, plus the vendor enums they are
// mapped from. Conversion between the two lives in `crate::convert`.

pub mod device_type;
pub mod value;
pub mod vendor;

pub use device_type::{AccessoryInfo, DeviceType, MANUFACTURER, ServiceKind};
pub use value::{AccessoryValue, Characteristics, LockState, LockTarget, SecurityState};
pub use vendor::{LockCode, PlugState, VendorArmState};
