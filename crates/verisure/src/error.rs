//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use verisure_config::ConfigError;
use verisure_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const UNSUPPORTED: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach Verisure at {url}")]
    #[diagnostic(
        code(verisure::connection_failed),
        help("Check network access and `base_url` in your config.\nReason: {reason}")
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to Verisure timed out")]
    #[diagnostic(code(verisure::timeout), help("Raise `timeout` in your config."))]
    Timeout,

    #[error("Verisure never confirmed transaction {transaction_id} ({attempts} polls)")]
    #[diagnostic(
        code(verisure::unconfirmed),
        help("The change may still happen. Check the device before retrying.")
    )]
    Unconfirmed { transaction_id: String, attempts: u32 },

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(verisure::auth_failed),
        help("Verify your email and password.\nRun: verisure config set-password")
    )]
    AuthFailed { message: String },

    #[error("No credentials configured: {missing}")]
    #[diagnostic(
        code(verisure::no_credentials),
        help("Config file: {path}")
    )]
    NoCredentials { missing: String, path: String },

    // ── Accessories ──────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(verisure::not_found),
        help("Run: verisure accessories to see available names")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
    },

    #[error("Verisure reported an unknown {kind} state '{value}'")]
    #[diagnostic(code(verisure::unknown_state))]
    UnknownState { kind: String, value: String },

    #[error("Rejected by Verisure (HTTP {status}{}): {message}", .code.as_deref().map(|c| format!(", {c}")).unwrap_or_default())]
    #[diagnostic(code(verisure::rejected))]
    Rejected {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected response from Verisure: {message}")]
    #[diagnostic(code(verisure::malformed))]
    Malformed { message: String },

    #[error("Operation not supported: {operation}")]
    #[diagnostic(code(verisure::unsupported))]
    Unsupported { operation: String },

    // ── Validation / configuration ───────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(verisure::validation))]
    Validation { field: String, reason: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(verisure::config))]
    Config { message: String },

    #[error("Internal error: {message}")]
    #[diagnostic(code(verisure::internal))]
    Internal { message: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(verisure::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Timeout | Self::Unconfirmed { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } => exit_code::USAGE,
            Self::Unsupported { .. } => exit_code::UNSUPPORTED,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout => CliError::Timeout,
            CoreError::Transport { message } => CliError::ConnectionFailed {
                url: "(unknown)".into(),
                reason: message,
            },
            CoreError::DeviceNotFound { identifier } => CliError::NotFound {
                resource_type: "device".into(),
                identifier,
            },
            CoreError::UnknownState { kind, value } => CliError::UnknownState {
                kind: kind.into(),
                value,
            },
            CoreError::Malformed { message } => CliError::Malformed { message },
            CoreError::RetriesExhausted {
                transaction_id,
                attempts,
            } => CliError::Unconfirmed {
                transaction_id,
                attempts,
            },
            CoreError::Rejected {
                status,
                code,
                message,
                body: _,
            } => CliError::Rejected {
                status,
                code,
                message,
            },
            CoreError::InvalidValue { device, value } => CliError::Validation {
                field: device,
                reason: format!("'{value}' is not a valid target"),
            },
            CoreError::Unsupported { operation } => CliError::Unsupported { operation },
            CoreError::Config { message } => CliError::Config { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { missing } => CliError::NoCredentials {
                missing,
                path: verisure_config::config_path().display().to_string(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::AuthenticationFailed {
                    message: "nope".into(),
                },
                exit_code::AUTH,
            ),
            (
                CoreError::DeviceNotFound {
                    identifier: "PLUG1".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::RetriesExhausted {
                    transaction_id: "tx".into(),
                    attempts: 9,
                },
                exit_code::TIMEOUT,
            ),
            (
                CoreError::InvalidValue {
                    device: "Hall".into(),
                    value: "dim".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::UnknownState {
                    kind: "arm",
                    value: "ARMED_NIGHT".into(),
                },
                exit_code::GENERAL,
            ),
        ];

        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn rejected_message_includes_vendor_code() {
        let err = CliError::Rejected {
            status: 400,
            code: Some("VAL_00818".into()),
            message: "Wrong code".into(),
        };
        assert_eq!(
            err.to_string(),
            "Rejected by Verisure (HTTP 400, VAL_00818): Wrong code"
        );
    }
}
