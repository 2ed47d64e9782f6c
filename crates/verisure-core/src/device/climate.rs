use std::sync::Arc;

use verisure_api::models::{ClimateValue, Installation};

use super::DeviceCore;
use crate::error::CoreError;
use crate::model::{AccessoryInfo, AccessoryValue, Characteristics, DeviceType, ServiceKind};
use crate::names::NameRegistry;
use crate::session::Session;

/// Read-only temperature sensor backed by a climate-capable detector.
pub struct ClimateSensor {
    pub(super) core: DeviceCore,
}

impl ClimateSensor {
    /// Fails with `Malformed` when the reading carries no temperature.
    pub fn new(
        session: Session,
        installation: Arc<Installation>,
        reading: &ClimateValue,
        names: &mut NameRegistry,
    ) -> Result<Self, CoreError> {
        let temperature = require_temperature(reading)?;
        let title = DeviceType::title_for(&reading.device_type);
        let name = names.assign(&format!("{title} ({})", reading.device_area));
        let info = AccessoryInfo::new(
            title,
            reading.device_label.clone(),
            ServiceKind::TemperatureSensor,
        );

        let core = DeviceCore::new(
            session,
            installation,
            reading.device_label.clone(),
            name,
            info,
            Characteristics::read_only(AccessoryValue::Temperature(temperature)),
        );
        core.observe_reported_at(reading.measured_at());

        Ok(Self { core })
    }

    /// Latest temperature in °C.
    pub async fn temperature(&self) -> Result<f64, CoreError> {
        let overview = self
            .core
            .session
            .fetch_overview(&self.core.installation)
            .await?;
        let reading = overview
            .climate_values
            .iter()
            .find(|c| c.device_label == self.core.label)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: self.core.label.clone(),
            })?;
        let temperature = require_temperature(reading)?;
        self.core.observe_current(AccessoryValue::Temperature(temperature));
        self.core.observe_reported_at(reading.measured_at());
        Ok(temperature)
    }
}

fn require_temperature(reading: &ClimateValue) -> Result<f64, CoreError> {
    reading.temperature.ok_or_else(|| CoreError::Malformed {
        message: format!("climate reading of {} has no temperature", reading.device_label),
    })
}
