use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use verisure_api::ApiRequest;
use verisure_api::models::{DoorLockCommand, DoorLockRecord, DoorLockStatus, Installation};

use super::DeviceCore;
use crate::config::PollPolicy;
use crate::convert;
use crate::error::CoreError;
use crate::model::{
    AccessoryInfo, AccessoryValue, Characteristics, DeviceType, LockState, LockTarget,
    ServiceKind,
};
use crate::names::NameRegistry;
use crate::poller::{self, CommandOutcome};
use crate::session::Session;

const TRANSACTION_FIELD: &str = "doorLockStateChangeTransactionId";
const DOOR_LOCK_CATEGORY: u8 = 6;

/// Smart door lock, exposed as a lock mechanism.
pub struct DoorLock {
    pub(super) core: DeviceCore,
    door_code: Option<SecretString>,
    poll: PollPolicy,
}

impl DoorLock {
    pub fn new(
        session: Session,
        installation: Arc<Installation>,
        status: &DoorLockStatus,
        door_code: Option<SecretString>,
        poll: PollPolicy,
        names: &mut NameRegistry,
    ) -> Self {
        let name = names.assign(&status.area);
        let info = AccessoryInfo::new(
            DeviceType::Doorlock.title().to_owned(),
            status.device_label.clone(),
            ServiceKind::LockMechanism,
        )
        .with_category(DOOR_LOCK_CATEGORY);
        let initial = convert::initial_lock_state(status);

        Self {
            core: DeviceCore::new(
                session,
                installation,
                status.device_label.clone(),
                name,
                info,
                Characteristics {
                    current: AccessoryValue::Lock(initial.into()),
                    target: Some(AccessoryValue::LockTarget(initial)),
                },
            ),
            door_code,
            poll,
        }
    }

    async fn record(&self) -> Result<DoorLockRecord, CoreError> {
        self.core
            .session
            .door_locks(self.core.giid())
            .await?
            .into_iter()
            .find(|r| r.device_label == self.core.label)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: self.core.label.clone(),
            })
    }

    pub async fn current_state(&self) -> Result<LockState, CoreError> {
        let state = convert::lock_current_state(&self.record().await?);
        self.core.observe_current(AccessoryValue::Lock(state));
        Ok(state)
    }

    /// Pending state if a change is under way, otherwise the current state.
    pub async fn target_state(&self) -> Result<LockTarget, CoreError> {
        let state = convert::lock_target_state(&self.record().await?);
        let target = convert::lock_target_from_state(state);
        self.core.observe_target(AccessoryValue::LockTarget(target));
        Ok(target)
    }

    /// Lock or unlock, waiting until the backend confirms. Current and
    /// target are published together afterwards.
    pub async fn set_target_state(&self, target: LockTarget) -> Result<(), CoreError> {
        let code = self.door_code.as_ref().ok_or_else(|| CoreError::Config {
            message: format!("no door code configured for {}", self.core.name),
        })?;
        let giid = self.core.giid();
        let action = match target {
            LockTarget::Secured => "lock",
            LockTarget::Unsecured => "unlock",
        };
        let body = serde_json::to_value(DoorLockCommand {
            code: code.expose_secret().to_owned(),
        })
        .map_err(|e| CoreError::Malformed {
            message: e.to_string(),
        })?;

        info!(device = %self.core.name, action, "changing lock state");
        let outcome = poller::submit_and_settle(
            &self.core.session,
            ApiRequest::put(
                format!("/installation/{giid}/device/{}/{action}", self.core.label),
                body,
            ),
            TRANSACTION_FIELD,
            |id| format!("/installation/{giid}/doorlockstate/change/result/{id}"),
            self.poll,
        )
        .await?;

        if outcome == CommandOutcome::AlreadyInTarget {
            info!(device = %self.core.name, "lock already in requested state");
        }
        self.core.publish(Characteristics {
            current: AccessoryValue::Lock(target.into()),
            target: Some(AccessoryValue::LockTarget(target)),
        });
        Ok(())
    }
}
