// ── Transaction poller ──
//
// State-changing commands answer with a transaction id; the outcome is
// read from a status endpoint that says `NO_DATA` until the change has
// settled. `TransactionPoller` drives that wait with a fixed interval and a
// bounded number of "no data" answers. The interval timer lives inside
// `wait` and is dropped on every terminal transition.

use serde_json::Value;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use verisure_api::models::NO_DATA;
use verisure_api::{ApiRequest, ApiResponse, StatusCode};

use crate::config::PollPolicy;
use crate::error::CoreError;
use crate::session::Session;

/// Vendor error code for a command whose target state is already in place.
pub const ALREADY_IN_TARGET: &str = "VAL_00819";

/// Where one transaction stands.
#[derive(Debug, Clone)]
pub enum PollState {
    /// Still waiting. `retries` counts "no data" answers so far.
    Pending { retries: u32 },
    /// The status endpoint returned a final result.
    Resolved(String),
    /// The retry budget ran out before a final result.
    Exhausted,
    /// A poll failed outright.
    Failed(CoreError),
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

/// Bounded-retry wait on one vendor transaction.
pub struct TransactionPoller {
    session: Session,
    transaction_id: String,
    status_uri: String,
    policy: PollPolicy,
    state: PollState,
    polls: u32,
}

impl TransactionPoller {
    pub fn new(
        session: &Session,
        transaction_id: impl Into<String>,
        status_uri: impl Into<String>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            session: session.clone(),
            transaction_id: transaction_id.into(),
            status_uri: status_uri.into(),
            policy,
            state: PollState::Pending { retries: 0 },
            polls: 0,
        }
    }

    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Status requests issued so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Poll until the transaction settles, returning the final result value.
    ///
    /// The first poll happens one interval after the call. With the default
    /// policy a transaction that never settles costs nine polls.
    pub async fn wait(&mut self) -> Result<String, CoreError> {
        match &self.state {
            PollState::Pending { .. } => {}
            PollState::Resolved(result) => return Ok(result.clone()),
            PollState::Exhausted => return Err(self.exhausted()),
            PollState::Failed(err) => return Err(err.clone()),
        }

        let mut ticker = time::interval(self.policy.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            self.polls += 1;

            let retries = match self.state {
                PollState::Pending { retries } => retries,
                _ => 0,
            };

            match self.poll_once().await {
                Ok(Some(result)) => {
                    info!(
                        transaction = %self.transaction_id,
                        attempt = self.polls,
                        %result,
                        "transaction settled"
                    );
                    self.state = PollState::Resolved(result.clone());
                    return Ok(result);
                }
                Ok(None) if retries >= self.policy.max_retries => {
                    warn!(
                        transaction = %self.transaction_id,
                        attempt = self.polls,
                        "transaction never settled"
                    );
                    self.state = PollState::Exhausted;
                    return Err(self.exhausted());
                }
                Ok(None) => {
                    debug!(transaction = %self.transaction_id, attempt = self.polls, "no data yet");
                    self.state = PollState::Pending {
                        retries: retries + 1,
                    };
                }
                Err(err) => {
                    warn!(
                        transaction = %self.transaction_id,
                        attempt = self.polls,
                        error = %err,
                        "poll failed"
                    );
                    self.state = PollState::Failed(err.clone());
                    return Err(err);
                }
            }
        }
    }

    /// One status request: `Some(result)` once settled, `None` for no data.
    async fn poll_once(&self) -> Result<Option<String>, CoreError> {
        let resp = self
            .session
            .call(ApiRequest::get(self.status_uri.clone()))
            .await?;
        if !resp.is_success() {
            return Err(CoreError::from_response(&resp));
        }

        let result = match resp.body.get("result") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => {
                return Err(CoreError::Malformed {
                    message: format!(
                        "transaction {} status carried no result",
                        self.transaction_id
                    ),
                });
            }
            Some(other) => other.to_string(),
        };

        Ok((result != NO_DATA).then_some(result))
    }

    fn exhausted(&self) -> CoreError {
        CoreError::RetriesExhausted {
            transaction_id: self.transaction_id.clone(),
            attempts: self.polls,
        }
    }
}

// ── Command submission ───────────────────────────────────────────────

/// How the backend answered a state-changing command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CommandOutcome {
    /// Accepted; the change settles under this transaction id.
    Pending(String),
    /// Rejected with [`ALREADY_IN_TARGET`]: nothing to do.
    AlreadyInTarget,
}

/// Interpret a command response carrying its transaction id in `id_field`.
pub(crate) fn classify_command_response(
    resp: &ApiResponse,
    id_field: &str,
) -> Result<CommandOutcome, CoreError> {
    if resp.status == StatusCode::BAD_REQUEST && resp.error_code() == Some(ALREADY_IN_TARGET) {
        return Ok(CommandOutcome::AlreadyInTarget);
    }
    if !resp.is_success() {
        return Err(CoreError::from_response(resp));
    }

    match resp.body.get(id_field) {
        Some(Value::String(id)) if !id.is_empty() => Ok(CommandOutcome::Pending(id.clone())),
        Some(Value::Number(id)) => Ok(CommandOutcome::Pending(id.to_string())),
        _ => Err(CoreError::Malformed {
            message: format!("command response carried no {id_field}"),
        }),
    }
}

/// Send a state-changing command and wait for it to settle.
///
/// `status_uri` maps the transaction id to its status endpoint. Returns
/// once the transaction resolves or the backend reports the target state
/// already in place.
pub(crate) async fn submit_and_settle(
    session: &Session,
    command: ApiRequest,
    id_field: &str,
    status_uri: impl FnOnce(&str) -> String,
    policy: PollPolicy,
) -> Result<CommandOutcome, CoreError> {
    let resp = session.call(command).await?;
    let outcome = classify_command_response(&resp, id_field)?;

    if let CommandOutcome::Pending(id) = &outcome {
        debug!(transaction = %id, "command accepted, polling");
        TransactionPoller::new(session, id.as_str(), status_uri(id), policy)
            .wait()
            .await?;
    } else {
        debug!("already in target state");
    }
    Ok(outcome)
}
