use thiserror::Error;

/// Top-level error type for the `verisure-api` crate.
///
/// Covers transport-level failures only. HTTP error statuses on the generic
/// gateway call are returned to the caller as an [`ApiResponse`](crate::ApiResponse),
/// not as an error; the typed endpoint helpers (login, installations, overview)
/// turn them into [`Error::Authentication`] or [`Error::Api`].
/// `verisure-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, locked account) or the session
    /// cookie was refused by the backend.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// A call was attempted before a session token was obtained.
    #[error("Not authenticated -- no session token")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success status from a typed endpoint, with the vendor's
    /// `errorCode` / `errorMessage` when present.
    #[error("Verisure API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the session is missing or was refused.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Authentication { .. } | Self::NotAuthenticated)
    }

    /// Extract the vendor error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}
