// ── Bridge ──
//
// Platform-level driver for one Verisure account: authenticates, lists
// installations, and enumerates every supported device as an accessory.
// Enumeration runs once; the accessory set is fixed for the bridge lifetime.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use verisure_api::models::Installation;

use crate::config::BridgeConfig;
use crate::device::{Accessory, Alarm, ClimateSensor, DoorLock, SmartPlug};
use crate::error::CoreError;
use crate::names::NameRegistry;
use crate::session::Session;

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

pub struct Bridge {
    config: BridgeConfig,
    session: Session,
    names: NameRegistry,
    installations: Vec<Arc<Installation>>,
    accessories: Vec<Arc<Accessory>>,
    connection_state: watch::Sender<ConnectionState>,
}

impl Bridge {
    /// Create a bridge. Does not contact the backend.
    pub fn new(config: BridgeConfig) -> Result<Self, CoreError> {
        let session = Session::from_config(&config)?;
        Ok(Self::with_session(config, session))
    }

    /// Create a bridge around an existing session.
    pub fn with_session(config: BridgeConfig, session: Session) -> Self {
        Self {
            config,
            session,
            names: NameRegistry::new(),
            installations: Vec::new(),
            accessories: Vec::new(),
            connection_state: watch::Sender::new(ConnectionState::Disconnected),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn installations(&self) -> &[Arc<Installation>] {
        &self.installations
    }

    /// Accessories found by the last [`discover`](Self::discover).
    pub fn accessories(&self) -> &[Arc<Accessory>] {
        &self.accessories
    }

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection_state.subscribe()
    }

    /// Look up a discovered accessory by display name (case-insensitive).
    pub fn accessory(&self, name: &str) -> Option<&Arc<Accessory>> {
        self.accessories
            .iter()
            .find(|a| a.name() == name)
            .or_else(|| {
                self.accessories
                    .iter()
                    .find(|a| a.name().eq_ignore_ascii_case(name))
            })
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Authenticate and list installations.
    pub async fn connect(&mut self) -> Result<(), CoreError> {
        self.connection_state.send_replace(ConnectionState::Connecting);

        let result = async {
            self.session
                .authenticate(&self.config.email, &self.config.password)
                .await?;
            self.session.installations(&self.config.email).await
        }
        .await;

        match result {
            Ok(installations) => {
                info!(count = installations.len(), "connected to Verisure");
                self.installations = installations.into_iter().map(Arc::new).collect();
                self.connection_state.send_replace(ConnectionState::Connected);
                Ok(())
            }
            Err(err) => {
                self.connection_state.send_replace(ConnectionState::Failed);
                Err(err)
            }
        }
    }

    /// Enumerate accessories across all installations, connecting first if
    /// needed.
    ///
    /// Per installation the order is alarm, climate sensors, smart plugs,
    /// door locks. An installation whose discovery fails is skipped; the
    /// call fails only when nothing could be discovered at all.
    pub async fn discover(&mut self) -> Result<&[Arc<Accessory>], CoreError> {
        if *self.connection_state.borrow() != ConnectionState::Connected {
            self.connect().await?;
        }
        if !self.accessories.is_empty() {
            return Ok(&self.accessories);
        }

        let mut found = Vec::new();
        let mut last_error = None;
        for installation in self.installations.clone() {
            match self.discover_installation(&installation).await {
                Ok(accessories) => found.extend(accessories.into_iter().map(Arc::new)),
                Err(err) => {
                    error!(
                        giid = %installation.giid,
                        error = %err,
                        "installation discovery failed"
                    );
                    last_error = Some(err);
                }
            }
        }

        if let (true, Some(err)) = (found.is_empty(), last_error) {
            return Err(err);
        }

        info!(count = found.len(), "accessories discovered");
        self.accessories = found;
        Ok(&self.accessories)
    }

    async fn discover_installation(
        &mut self,
        installation: &Arc<Installation>,
    ) -> Result<Vec<Accessory>, CoreError> {
        let giid = installation.giid.as_str();
        let overview = self.session.fetch_overview(installation).await?;
        let mut accessories = Vec::new();

        let alarm_code = self
            .config
            .alarm_code
            .clone()
            .filter(|_| self.config.wants_alarm(giid));
        if let Some(code) = alarm_code {
            match &overview.arm_state {
                Some(arm) => accessories.push(
                    Alarm::new(
                        self.session.clone(),
                        Arc::clone(installation),
                        arm,
                        code,
                        self.config.poll,
                        &mut self.names,
                    )?
                    .into(),
                ),
                None => warn!(giid, "overview has no arm state, skipping alarm"),
            }
        } else {
            debug!(giid, "no alarm accessory for installation");
        }

        for reading in &overview.climate_values {
            match ClimateSensor::new(
                self.session.clone(),
                Arc::clone(installation),
                reading,
                &mut self.names,
            ) {
                Ok(sensor) => accessories.push(sensor.into()),
                Err(err) => warn!(
                    device = %reading.device_label,
                    error = %err,
                    "skipping climate sensor"
                ),
            }
        }

        for plug in &overview.smart_plugs {
            match SmartPlug::new(
                self.session.clone(),
                Arc::clone(installation),
                plug,
                &mut self.names,
            ) {
                Ok(plug) => accessories.push(plug.into()),
                Err(err) => warn!(device = %plug.device_label, error = %err, "skipping smart plug"),
            }
        }

        for lock in &overview.door_lock_status_list {
            accessories.push(
                DoorLock::new(
                    self.session.clone(),
                    Arc::clone(installation),
                    lock,
                    self.config.door_code.clone(),
                    self.config.poll,
                    &mut self.names,
                )
                .into(),
            );
        }

        debug!(giid, count = accessories.len(), "installation discovered");
        Ok(accessories)
    }
}
