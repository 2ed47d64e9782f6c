//! Configuration for the Verisure bridge.
//!
//! TOML file + environment loading, credential resolution (env, keyring,
//! plaintext), and translation to `verisure_core::BridgeConfig`.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use verisure_core::{BridgeConfig, PollPolicy, TlsVerification};

/// Keyring service name.
pub const KEYRING_SERVICE: &str = "verisure";
/// Environment variable prefix.
pub const ENV_PREFIX: &str = "VERISURE_";
/// Environment variable holding the account password.
pub const PASSWORD_ENV: &str = "VERISURE_PASSWORD";

const DEFAULT_BASE_URL: &str = "https://e-api01.verisure.com/xbn/2";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured: {missing}")]
    NoCredentials { missing: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// A numeric value that may be written as a TOML integer or string.
///
/// Codes with leading zeros must be written as strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Digits {
    Number(u64),
    Text(String),
}

impl Digits {
    /// The value as sent to the vendor: a string of digits.
    fn to_digit_string(&self, field: &str) -> Result<String, ConfigError> {
        match self {
            Self::Number(n) => Ok(n.to_string()),
            Self::Text(s) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(s.clone())
            }
            Self::Text(s) => Err(ConfigError::Validation {
                field: field.into(),
                reason: format!("expected digits, got '{s}'"),
            }),
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Account email.
    pub email: Option<String>,

    /// Account password (plaintext, prefer keyring or env).
    pub password: Option<String>,

    /// Alarm code. Without it no alarm accessories are created.
    pub alarm_code: Option<Digits>,

    /// Door code for lock/unlock.
    pub door_code: Option<Digits>,

    /// Installation ids that get no alarm accessory.
    #[serde(default)]
    pub ignore_alarms: Vec<Digits>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_poll_max_retries")]
    pub poll_max_retries: u32,

    /// Extra CA certificate (PEM) to trust.
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            email: None,
            password: None,
            alarm_code: None,
            door_code: None,
            ignore_alarms: Vec::new(),
            base_url: default_base_url(),
            timeout: default_timeout(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_retries: default_poll_max_retries(),
            ca_cert: None,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval_ms() -> u64 {
    200
}
fn default_poll_max_retries() -> u32 {
    8
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "verisure", "verisure").map_or_else(
        || PathBuf::from(".verisure").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Provider stack: defaults, then the TOML file, then `VERISURE_*` env.
///
/// `VERISURE_PASSWORD` is left out; it is read during credential
/// resolution so it wins over the keyring.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["password"]))
}

/// Load config from `path` (or the default location) and the environment.
/// A missing file is not an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    debug!(path = %path.display(), "loading config");
    Ok(figment(&path).extract()?)
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_entry(email: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{email}/password"),
    )?)
}

/// First available of: env value, keyring value, plaintext config value.
fn first_password(
    env: Option<String>,
    keyring: impl FnOnce() -> Option<String>,
    plaintext: Option<&str>,
) -> Option<SecretString> {
    env.or_else(keyring)
        .or_else(|| plaintext.map(str::to_owned))
        .map(SecretString::from)
}

/// Resolve the account password: `VERISURE_PASSWORD`, then the system
/// keyring, then the plaintext `password` field.
pub fn resolve_password(cfg: &Config, email: &str) -> Result<SecretString, ConfigError> {
    first_password(
        std::env::var(PASSWORD_ENV).ok(),
        || {
            keyring_entry(email)
                .ok()
                .and_then(|entry| entry.get_password().ok())
        },
        cfg.password.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        missing: format!("password for {email} (set {PASSWORD_ENV} or run `verisure config set-password`)"),
    })
}

/// Store the account password in the system keyring.
pub fn store_password(email: &str, password: &SecretString) -> Result<(), ConfigError> {
    use secrecy::ExposeSecret;
    keyring_entry(email)?.set_password(password.expose_secret())?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Account email, required for everything that talks to Verisure.
pub fn require_email(cfg: &Config) -> Result<&str, ConfigError> {
    cfg.email
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            missing: "email (set `email` in the config file or VERISURE_EMAIL)".into(),
        })
}

/// Build a `BridgeConfig`, resolving the password through the credential chain.
pub fn to_bridge_config(cfg: &Config) -> Result<BridgeConfig, ConfigError> {
    let email = require_email(cfg)?;
    let password = resolve_password(cfg, email)?;
    bridge_config_with_password(cfg, email, password)
}

fn bridge_config_with_password(
    cfg: &Config,
    email: &str,
    password: SecretString,
) -> Result<BridgeConfig, ConfigError> {
    let base_url: url::Url = cfg.base_url.parse().map_err(|_| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL: {}", cfg.base_url),
    })?;

    if cfg.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    if cfg.poll_interval_ms == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval_ms".into(),
            reason: "must be positive".into(),
        });
    }

    let mut bridge = BridgeConfig::new(base_url, email, password);
    bridge.alarm_code = cfg
        .alarm_code
        .as_ref()
        .map(|c| c.to_digit_string("alarm_code").map(SecretString::from))
        .transpose()?;
    bridge.door_code = cfg
        .door_code
        .as_ref()
        .map(|c| c.to_digit_string("door_code").map(SecretString::from))
        .transpose()?;
    bridge.ignore_alarms = cfg
        .ignore_alarms
        .iter()
        .map(|id| id.to_digit_string("ignore_alarms"))
        .collect::<Result<HashSet<_>, _>>()?;
    bridge.tls = cfg
        .ca_cert
        .clone()
        .map_or(TlsVerification::SystemDefaults, TlsVerification::CustomCa);
    bridge.timeout = Duration::from_secs(cfg.timeout);
    bridge.poll = PollPolicy {
        interval: Duration::from_millis(cfg.poll_interval_ms),
        max_retries: cfg.poll_max_retries,
    };

    Ok(bridge)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use secrecy::ExposeSecret;

    fn parse(toml: &str) -> Config {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap()
    }

    fn pw() -> SecretString {
        SecretString::from("hunter2".to_string())
    }

    #[test]
    fn defaults_apply() {
        let cfg = parse(r#"email = "owner@example.com""#);
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.timeout, 30);
        assert_eq!(cfg.poll_interval_ms, 200);
        assert_eq!(cfg.poll_max_retries, 8);
        assert!(cfg.alarm_code.is_none());
    }

    #[test]
    fn codes_accept_numbers_and_strings() {
        let cfg = parse(
            r#"
            email = "owner@example.com"
            alarm_code = 1234
            door_code = "0042"
            ignore_alarms = [123456, "654321"]
            "#,
        );
        let bridge = bridge_config_with_password(&cfg, "owner@example.com", pw()).unwrap();

        assert_eq!(bridge.alarm_code.unwrap().expose_secret(), "1234");
        assert_eq!(bridge.door_code.unwrap().expose_secret(), "0042");
        assert!(bridge.ignore_alarms.contains("123456"));
        assert!(bridge.ignore_alarms.contains("654321"));
        assert_eq!(bridge.poll, PollPolicy::default());
    }

    #[test]
    fn non_numeric_code_is_rejected() {
        let cfg = parse(r#"door_code = "12ab""#);
        let err = bridge_config_with_password(&cfg, "owner@example.com", pw()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "door_code"));
    }

    #[test]
    fn invalid_base_url_names_field() {
        let cfg = parse(r#"base_url = "not a url""#);
        let err = bridge_config_with_password(&cfg, "owner@example.com", pw()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "base_url"));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let cfg = parse("poll_interval_ms = 0");
        assert!(bridge_config_with_password(&cfg, "owner@example.com", pw()).is_err());
    }

    #[test]
    fn missing_email_is_no_credentials() {
        let cfg = parse("timeout = 10");
        assert!(matches!(
            require_email(&cfg),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn password_chain_order() {
        let from_env = first_password(Some("env".into()), || Some("ring".into()), Some("plain"));
        assert_eq!(from_env.unwrap().expose_secret(), "env");

        let from_ring = first_password(None, || Some("ring".into()), Some("plain"));
        assert_eq!(from_ring.unwrap().expose_secret(), "ring");

        let from_file = first_password(None, || None, Some("plain"));
        assert_eq!(from_file.unwrap().expose_secret(), "plain");

        assert!(first_password(None, || None, None).is_none());
    }

    #[test]
    fn env_overrides_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                email = "file@example.com"
                timeout = 10
                "#,
            )?;
            jail.set_env("VERISURE_EMAIL", "env@example.com");
            jail.set_env("VERISURE_PASSWORD", "from-env");

            let cfg = load_config(Some(Path::new("config.toml"))).map_err(|e| e.to_string())?;
            assert_eq!(cfg.email.as_deref(), Some("env@example.com"));
            assert_eq!(cfg.timeout, 10);
            assert!(cfg.password.is_none());

            let bridge = to_bridge_config(&cfg).map_err(|e| e.to_string())?;
            assert_eq!(bridge.password.expose_secret(), "from-env");
            Ok(())
        });
    }
}
