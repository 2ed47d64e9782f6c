use std::sync::Arc;

use tracing::{info, warn};
use verisure_api::ApiRequest;
use verisure_api::models::{Installation, SmartPlugStateChange, SmartPlugStatus};

use super::DeviceCore;
use crate::convert;
use crate::error::CoreError;
use crate::model::{AccessoryInfo, AccessoryValue, Characteristics, DeviceType, ServiceKind};
use crate::names::NameRegistry;
use crate::session::Session;

/// Smart plug, exposed as a switch. Plug commands are synchronous.
pub struct SmartPlug {
    pub(super) core: DeviceCore,
}

impl SmartPlug {
    pub fn new(
        session: Session,
        installation: Arc<Installation>,
        plug: &SmartPlugStatus,
        names: &mut NameRegistry,
    ) -> Result<Self, CoreError> {
        let on = convert::plug_state(plug)?;
        let title = DeviceType::Smartplug.title();
        let name = names.assign(&format!("{title} ({})", plug.area));
        let info = AccessoryInfo::new(
            title.to_owned(),
            plug.device_label.clone(),
            ServiceKind::Switch,
        );

        Ok(Self {
            core: DeviceCore::new(
                session,
                installation,
                plug.device_label.clone(),
                name,
                info,
                Characteristics::settled(AccessoryValue::Switch(on)),
            ),
        })
    }

    pub async fn current_state(&self) -> Result<bool, CoreError> {
        let overview = self
            .core
            .session
            .fetch_overview(&self.core.installation)
            .await?;
        let plug = overview
            .plugs()
            .find(|p| p.device_label == self.core.label)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: self.core.label.clone(),
            })?;
        let on = convert::plug_state(plug)?;
        self.core.observe_current(AccessoryValue::Switch(on));
        Ok(on)
    }

    /// Switch on or off. The new value is published before the call and
    /// rolled back if the backend refuses it.
    pub async fn set_state(&self, on: bool) -> Result<(), CoreError> {
        let previous = self.core.snapshot();
        self.core.publish(Characteristics::settled(AccessoryValue::Switch(on)));

        let body = serde_json::to_value([SmartPlugStateChange {
            device_label: self.core.label.clone(),
            state: on,
        }])
        .map_err(|e| CoreError::Malformed {
            message: e.to_string(),
        });

        let result = match body {
            Ok(body) => self
                .core
                .session
                .call(ApiRequest::post(
                    format!("/installation/{}/smartplug/state", self.core.giid()),
                    body,
                ))
                .await
                .and_then(|resp| {
                    if resp.is_success() {
                        Ok(())
                    } else {
                        Err(CoreError::from_response(&resp))
                    }
                }),
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(device = %self.core.name, on, "plug switched");
                Ok(())
            }
            Err(err) => {
                warn!(device = %self.core.name, "plug command failed, restoring previous value");
                self.core.publish(previous);
                Err(err)
            }
        }
    }
}
