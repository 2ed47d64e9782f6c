// ── Session / overview cache ──
//
// One authenticated API client shared by every device, plus the
// per-installation in-flight overview fetch. Concurrent fetches for the
// same installation share one request; the slot is cleared when that
// request settles, so results are never served after the fact.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use secrecy::SecretString;
use tracing::{debug, info};
use verisure_api::models::{DoorLockRecord, Installation, Overview};
use verisure_api::{ApiRequest, ApiResponse, TlsMode, TransportConfig, VerisureClient};

use crate::config::{BridgeConfig, TlsVerification};
use crate::error::CoreError;

type OverviewFetch = Shared<BoxFuture<'static, Result<Arc<Overview>, CoreError>>>;
type InFlight = DashMap<String, OverviewFetch>;

/// Cheaply cloneable handle to the shared API session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    client: Arc<VerisureClient>,
    in_flight: Arc<InFlight>,
}

impl Session {
    pub fn new(client: VerisureClient) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                client: Arc::new(client),
                in_flight: Arc::new(DashMap::new()),
            }),
        }
    }

    /// Build an unauthenticated session from bridge configuration.
    pub fn from_config(config: &BridgeConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match &config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            },
            ..TransportConfig::default()
        }
        .with_timeout(config.timeout);

        let client = VerisureClient::new(config.base_url.clone(), &transport)?;
        Ok(Self::new(client))
    }

    pub fn client(&self) -> &VerisureClient {
        &self.inner.client
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.client.is_authenticated()
    }

    /// Log in and keep the token for every later call.
    ///
    /// Any failure, including an unreachable backend, is an authentication
    /// failure carrying the underlying reason.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<SecretString, CoreError> {
        let token = self
            .inner
            .client
            .login(email, password)
            .await
            .map_err(|err| match CoreError::from(err) {
                auth @ CoreError::AuthenticationFailed { .. } => auth,
                other => CoreError::AuthenticationFailed {
                    message: format!("login did not complete: {other}"),
                },
            })?;
        info!("authenticated with Verisure");
        Ok(token)
    }

    pub async fn installations(&self, email: &str) -> Result<Vec<Installation>, CoreError> {
        let installations = self.inner.client.list_installations(email).await?;
        debug!(count = installations.len(), "listed installations");
        Ok(installations)
    }

    /// Full snapshot of one installation.
    ///
    /// Joins a fetch already in flight for the same installation instead of
    /// starting another. Every waiter gets the same result or error.
    pub async fn fetch_overview(
        &self,
        installation: &Installation,
    ) -> Result<Arc<Overview>, CoreError> {
        let giid = installation.giid.as_str();

        let fetch = match self.inner.in_flight.entry(giid.to_owned()) {
            Entry::Occupied(slot) => {
                debug!(giid, "joining in-flight overview fetch");
                slot.get().clone()
            }
            Entry::Vacant(slot) => {
                let fetch = overview_fetch(
                    Arc::clone(&self.inner.client),
                    Arc::downgrade(&self.inner.in_flight),
                    giid.to_owned(),
                );
                slot.insert(fetch.clone());
                fetch
            }
        };

        fetch.await
    }

    /// Door lock records of one installation. Not de-duplicated.
    pub async fn door_locks(&self, giid: &str) -> Result<Vec<DoorLockRecord>, CoreError> {
        Ok(self.inner.client.door_lock_states(giid).await?)
    }

    /// Raw gateway call. HTTP error statuses are returned, not raised.
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse, CoreError> {
        Ok(self.inner.client.call(request).await?)
    }

    /// Number of overview fetches currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }
}

fn overview_fetch(
    client: Arc<VerisureClient>,
    in_flight: Weak<InFlight>,
    giid: String,
) -> OverviewFetch {
    async move {
        let result = client
            .overview(&giid)
            .await
            .map(Arc::new)
            .map_err(CoreError::from);
        // Cleared before any waiter sees the result.
        if let Some(in_flight) = in_flight.upgrade() {
            in_flight.remove(&giid);
        }
        result
    }
    .boxed()
    .shared()
}
