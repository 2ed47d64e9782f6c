// ── Accessory-host adapter ──
//
// Converts the async device API into the host's completion-callback
// convention: every call eventually invokes its callback exactly once with
// `Err(error)` or `Ok(value)`. Values cross as numeric characteristics.
// Must be called from within a tokio runtime.

use std::sync::Arc;

use serde_json::Value;

use crate::device::Accessory;
use crate::error::CoreError;
use crate::model::{AccessoryInfo, AccessoryValue};

/// Host-facing handle to one accessory.
#[derive(Clone)]
pub struct AccessoryHandle {
    accessory: Arc<Accessory>,
}

impl AccessoryHandle {
    pub fn new(accessory: Arc<Accessory>) -> Self {
        Self { accessory }
    }

    pub fn name(&self) -> &str {
        self.accessory.name()
    }

    pub fn info(&self) -> &AccessoryInfo {
        self.accessory.info()
    }

    pub fn accessory(&self) -> &Arc<Accessory> {
        &self.accessory
    }

    pub fn get_current_value(
        &self,
        callback: impl FnOnce(Result<Value, CoreError>) + Send + 'static,
    ) {
        let accessory = Arc::clone(&self.accessory);
        tokio::spawn(async move {
            let result = accessory.get_current_value().await;
            callback(result.map(AccessoryValue::to_characteristic));
        });
    }

    pub fn get_target_value(
        &self,
        callback: impl FnOnce(Result<Value, CoreError>) + Send + 'static,
    ) {
        let accessory = Arc::clone(&self.accessory);
        tokio::spawn(async move {
            let result = accessory.get_target_value().await;
            callback(result.map(AccessoryValue::to_characteristic));
        });
    }

    /// Parse `value` for this accessory and set it as the target.
    /// A value the accessory can't take fails without contacting the backend.
    pub fn set_target_value(
        &self,
        value: Value,
        callback: impl FnOnce(Result<(), CoreError>) + Send + 'static,
    ) {
        let accessory = Arc::clone(&self.accessory);
        tokio::spawn(async move {
            let result = match accessory.value_from_characteristic(&value) {
                Ok(parsed) => accessory.set_target_value(parsed).await,
                Err(err) => Err(err),
            };
            callback(result);
        });
    }
}

impl From<Arc<Accessory>> for AccessoryHandle {
    fn from(accessory: Arc<Accessory>) -> Self {
        Self::new(accessory)
    }
}
