use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tracing::info;
use verisure_api::ApiRequest;
use verisure_api::models::{ArmState, ArmStateCommand, Installation};

use super::DeviceCore;
use crate::config::PollPolicy;
use crate::convert;
use crate::error::CoreError;
use crate::model::{
    AccessoryInfo, AccessoryValue, Characteristics, DeviceType, SecurityState, ServiceKind,
};
use crate::names::NameRegistry;
use crate::poller::{self, CommandOutcome};
use crate::session::Session;

const TRANSACTION_FIELD: &str = "armStateChangeTransactionId";

/// Alarm panel of one installation, exposed as a security system.
pub struct Alarm {
    pub(super) core: DeviceCore,
    code: SecretString,
    poll: PollPolicy,
}

impl Alarm {
    /// Build from the installation's overview arm state.
    pub fn new(
        session: Session,
        installation: Arc<Installation>,
        arm_state: &ArmState,
        code: SecretString,
        poll: PollPolicy,
        names: &mut NameRegistry,
    ) -> Result<Self, CoreError> {
        let initial = convert::security_state(arm_state)?;
        let title = DeviceType::Alarm.title();
        let name = names.assign(&format!("{title} ({})", installation.address()));
        let info = AccessoryInfo::new(
            title.to_owned(),
            installation.giid.clone(),
            ServiceKind::SecuritySystem,
        );
        let label = installation.giid.clone();

        let core = DeviceCore::new(
            session,
            installation,
            label,
            name,
            info,
            Characteristics::settled(AccessoryValue::Security(initial)),
        );
        core.observe_reported_at(arm_state.changed_at());

        Ok(Self { core, code, poll })
    }

    /// Current arm state from a fresh overview.
    pub async fn current_state(&self) -> Result<SecurityState, CoreError> {
        let overview = self
            .core
            .session
            .fetch_overview(&self.core.installation)
            .await?;
        let arm = overview
            .arm_state
            .as_ref()
            .ok_or_else(|| CoreError::Malformed {
                message: format!("overview of {} has no arm state", self.core.giid()),
            })?;
        let state = convert::security_state(arm)?;
        self.core.observe_current(AccessoryValue::Security(state));
        self.core.observe_reported_at(arm.changed_at());
        Ok(state)
    }

    /// Arm or disarm, waiting until the backend confirms.
    pub async fn set_target_state(&self, target: SecurityState) -> Result<(), CoreError> {
        let giid = self.core.giid();
        let vendor_state = convert::vendor_arm_state(target);
        let body = serde_json::to_value(ArmStateCommand {
            code: self.code.expose_secret().to_owned(),
            state: vendor_state.to_string(),
        })
        .map_err(|e| CoreError::Malformed {
            message: e.to_string(),
        })?;

        info!(device = %self.core.name, state = %vendor_state, "changing arm state");
        let outcome = poller::submit_and_settle(
            &self.core.session,
            ApiRequest::put(format!("/installation/{giid}/armstate/code"), body),
            TRANSACTION_FIELD,
            |id| format!("/installation/{giid}/code/result/{id}"),
            self.poll,
        )
        .await?;

        if outcome == CommandOutcome::AlreadyInTarget {
            info!(device = %self.core.name, "alarm already in requested state");
        }
        self.core.publish(Characteristics::settled(AccessoryValue::Security(target)));
        Ok(())
    }
}
