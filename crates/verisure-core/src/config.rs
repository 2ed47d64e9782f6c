// ── Runtime bridge configuration ──
//
// These types describe *how* to reach the Verisure cloud and what the
// bridge should expose. They carry credential data and tuning, but never
// touch disk. verisure-config builds a `BridgeConfig` and hands it in.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Bundled/system CA store.
    #[default]
    SystemDefaults,
    /// Additionally trust a custom CA certificate file.
    CustomCa(PathBuf),
}

/// Polling policy for transaction status endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each status poll.
    pub interval: Duration,
    /// "No data yet" answers tolerated before giving up. The poll after
    /// the last tolerated one is the final attempt.
    pub max_retries: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(200),
            max_retries: 8,
        }
    }
}

/// Configuration for one bridge (one Verisure account).
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// API base URL (e.g., `https://e-api01.verisure.com/xbn/2`).
    pub base_url: Url,
    /// Account email.
    pub email: String,
    pub password: SecretString,
    /// Alarm code. Without it no alarm accessories are created.
    pub alarm_code: Option<SecretString>,
    /// Door code used for lock/unlock commands.
    pub door_code: Option<SecretString>,
    /// Installation ids that get no alarm accessory.
    pub ignore_alarms: HashSet<String>,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    pub poll: PollPolicy,
}

impl BridgeConfig {
    /// Configuration with defaults for everything but the account.
    pub fn new(base_url: Url, email: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            email: email.into(),
            password,
            alarm_code: None,
            door_code: None,
            ignore_alarms: HashSet::new(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            poll: PollPolicy::default(),
        }
    }

    /// Whether an alarm accessory should be created for this installation.
    pub fn wants_alarm(&self, giid: &str) -> bool {
        self.alarm_code.is_some() && !self.ignore_alarms.contains(giid)
    }
}
