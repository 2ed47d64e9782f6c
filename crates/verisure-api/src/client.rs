// Verisure API HTTP client
//
// Wraps `reqwest::Client` with base-URL construction and the session token.
// The generic gateway call lives in `gateway.rs`; the typed endpoints below
// are thin decoders on top of it.

use std::sync::{PoisonError, RwLock};

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::gateway::{ApiRequest, ApiResponse, DEFAULT_ACCEPT};
use crate::models::{AuthResponse, DoorLockRecord, Installation, Overview};
use crate::transport::TransportConfig;

/// HTTP client for the Verisure cloud API.
///
/// Holds the session token obtained by [`login`](Self::login). The token
/// lives for the lifetime of the client and is never refreshed.
pub struct VerisureClient {
    http: reqwest::Client,
    base_url: Url,
    token: RwLock<Option<SecretString>>,
}

impl VerisureClient {
    /// Create a new client from a `TransportConfig`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            token: RwLock::new(None),
        }
    }

    /// The underlying HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Session token ───────────────────────────────────────────────

    /// Install a session token (normally done by [`login`](Self::login)).
    pub fn set_token(&self, token: SecretString) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// `Cookie` header value carrying the session token, if any.
    pub(crate) fn session_cookie(&self) -> Result<Option<HeaderValue>, Error> {
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        let Some(token) = guard.as_ref() else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&format!("vid={}", token.expose_secret()))
            .map_err(|_| Error::Authentication {
                message: "session token is not a valid header value".into(),
            })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }

    // ── URL builders ────────────────────────────────────────────────

    /// Build a full URL from a path relative to the API base.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let full = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), path);
        Url::parse(&full).map_err(Error::InvalidUrl)
    }

    // ── Endpoints ───────────────────────────────────────────────────

    /// Authenticate with account email and password.
    ///
    /// `POST /cookie` with Basic credentials `CPE/{email}:{password}`. On
    /// success the returned token is stored and attached to every later call.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.url("/cookie")?;
        debug!("logging in at {}", url);

        let resp = self
            .http
            .post(url)
            .basic_auth(format!("CPE/{email}"), Some(password.expose_secret()))
            .header(ACCEPT, DEFAULT_ACCEPT)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {body}"),
            });
        }

        let auth: AuthResponse =
            serde_json::from_str(&body).map_err(|e| Error::Authentication {
                message: format!("login response carried no session cookie: {e}"),
            })?;

        let token = SecretString::from(auth.cookie);
        self.set_token(token.clone());
        debug!("login successful");
        Ok(token)
    }

    /// List installations visible to the account.
    ///
    /// `GET /installation/search?email={email}`
    pub async fn list_installations(&self, email: &str) -> Result<Vec<Installation>, Error> {
        let email: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        debug!("listing installations");
        self.get_json(format!("/installation/search?email={email}"))
            .await
    }

    /// Full state snapshot of one installation.
    ///
    /// `GET /installation/{giid}/overview`
    pub async fn overview(&self, giid: &str) -> Result<Overview, Error> {
        debug!(giid, "fetching overview");
        self.get_json(format!("/installation/{giid}/overview")).await
    }

    /// Door lock records of one installation.
    ///
    /// `GET /installation/{giid}/doorlockstate/search`
    pub async fn door_lock_states(&self, giid: &str) -> Result<Vec<DoorLockRecord>, Error> {
        debug!(giid, "searching door lock states");
        self.get_json(format!("/installation/{giid}/doorlockstate/search"))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, uri: String) -> Result<T, Error> {
        let resp = self.call(ApiRequest::get(uri)).await?;
        decode(resp)
    }
}

/// Decode a typed endpoint response, mapping error statuses.
fn decode<T: DeserializeOwned>(resp: ApiResponse) -> Result<T, Error> {
    if resp.status == StatusCode::UNAUTHORIZED || resp.status == StatusCode::FORBIDDEN {
        return Err(Error::Authentication {
            message: "session expired or invalid credentials".into(),
        });
    }

    if !resp.is_success() {
        return Err(Error::Api {
            status: resp.status.as_u16(),
            code: resp.error_code().map(String::from),
            message: resp
                .error_message()
                .map(String::from)
                .unwrap_or_else(|| resp.status.to_string()),
        });
    }

    serde_json::from_value(resp.body.clone()).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: resp.body.to_string(),
    })
}
