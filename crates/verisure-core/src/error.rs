// ── Core error types ──
//
// User-facing errors from verisure-core. Every device operation is
// independently fallible; none of these is retried automatically.
// The `From<verisure_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.
//
// `CoreError` is `Clone`: one failed overview fetch is delivered to every
// caller waiting on it.

use thiserror::Error;
use verisure_api::{ApiResponse, StatusCode};

/// Unified error type for the core crate.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Cannot reach Verisure at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to Verisure timed out")]
    Timeout,

    #[error("Transport error: {message}")]
    Transport { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Device not found in latest snapshot: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Unknown {kind} state \"{value}\"")]
    UnknownState { kind: &'static str, value: String },

    #[error("Malformed response from Verisure: {message}")]
    Malformed { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Transaction {transaction_id} not confirmed after {attempts} polls")]
    RetriesExhausted { transaction_id: String, attempts: u32 },

    #[error("Rejected by Verisure (HTTP {status}): {message}")]
    Rejected {
        status: u16,
        /// Vendor error code, e.g. "VAL_00818".
        code: Option<String>,
        message: String,
        /// The original error body.
        body: serde_json::Value,
    },

    #[error("Invalid value {value} for {device}")]
    InvalidValue { device: String, value: String },

    #[error("Operation not supported: {operation}")]
    Unsupported { operation: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Error for a gateway response the caller could not accept.
    ///
    /// 401/403 become [`AuthenticationFailed`](Self::AuthenticationFailed);
    /// every other status becomes [`Rejected`](Self::Rejected) carrying the body.
    pub fn from_response(resp: &ApiResponse) -> Self {
        let status = resp.status.as_u16();
        if resp.status == StatusCode::UNAUTHORIZED || resp.status == StatusCode::FORBIDDEN {
            return CoreError::AuthenticationFailed {
                message: format!("session refused (HTTP {status})"),
            };
        }
        CoreError::Rejected {
            status,
            code: resp.error_code().map(String::from),
            message: resp
                .error_message()
                .map(String::from)
                .unwrap_or_else(|| resp.status.to_string()),
            body: resp.body.clone(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::AuthenticationFailed { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<verisure_api::Error> for CoreError {
    fn from(err: verisure_api::Error) -> Self {
        match err {
            verisure_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            verisure_api::Error::NotAuthenticated => CoreError::AuthenticationFailed {
                message: "no session -- authenticate first".into(),
            },
            verisure_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            verisure_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            verisure_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            verisure_api::Error::Api {
                status,
                code,
                message,
            } => CoreError::Rejected {
                status,
                code,
                message,
                body: serde_json::Value::Null,
            },
            verisure_api::Error::Deserialization { message, body: _ } => {
                CoreError::Malformed { message }
            }
        }
    }
}
