// Command gateway
//
// The single uniform wrapper around one Verisure HTTP call. Applies the
// default method and headers, attaches the session cookie, and normalizes
// the response into an `ApiResponse`. HTTP error statuses are returned,
// not raised: callers decide whether a given 4xx is recoverable.

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{debug, trace};

use crate::client::VerisureClient;
use crate::error::Error;
use crate::models::VendorError;

/// `Accept` header sent unless the caller overrides it.
pub const DEFAULT_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";

/// One request through the gateway. Unset fields fall back to defaults.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Path relative to the API base URL, including any query string.
    pub uri: String,
    /// Defaults to `GET`.
    pub method: Option<Method>,
    /// Merged over the defaults; a caller value replaces the default one.
    pub headers: HeaderMap,
    pub json: Option<Value>,
}

impl ApiRequest {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            method: None,
            headers: HeaderMap::new(),
            json: None,
        }
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(uri)
    }

    pub fn post(uri: impl Into<String>, json: Value) -> Self {
        Self::new(uri).with_method(Method::POST).with_json(json)
    }

    pub fn put(uri: impl Into<String>, json: Value) -> Self {
        Self::new(uri).with_method(Method::PUT).with_json(json)
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_json(mut self, json: Value) -> Self {
        self.json = Some(json);
        self
    }
}

/// Normalized gateway response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON when the body was JSON, the raw text as a string value
    /// otherwise, `Null` when empty.
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Vendor `errorCode`, e.g. `VAL_00819`.
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("errorCode").and_then(Value::as_str)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.body.get("errorMessage").and_then(Value::as_str)
    }

    /// The error body as a typed value (all fields empty if absent).
    pub fn vendor_error(&self) -> VendorError {
        serde_json::from_value(self.body.clone()).unwrap_or_default()
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_owned()))
}

impl VerisureClient {
    /// Perform one call against the Verisure API.
    ///
    /// Fails only when the request cannot be made or the transport fails;
    /// any HTTP status is returned in the [`ApiResponse`]. A call without a
    /// session token fails with [`Error::NotAuthenticated`] unless the
    /// caller supplies its own `Cookie` header.
    pub async fn call(&self, request: ApiRequest) -> Result<ApiResponse, Error> {
        let url = self.url(&request.uri)?;
        let method = request.method.unwrap_or(Method::GET);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DEFAULT_ACCEPT));
        match self.session_cookie()? {
            Some(cookie) => {
                headers.insert(COOKIE, cookie);
            }
            None if request.headers.contains_key(COOKIE) => {}
            None => return Err(Error::NotAuthenticated),
        }
        for (name, value) in &request.headers {
            headers.insert(name.clone(), value.clone());
        }

        debug!(%method, uri = %request.uri, "calling Verisure API");

        let mut builder = self.http().request(method, url).headers(headers);
        if let Some(ref body) = request.json {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(Error::Transport)?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let text = resp.text().await.map_err(Error::Transport)?;

        trace!(status = status.as_u16(), "Verisure API responded");

        Ok(ApiResponse {
            status,
            headers,
            body: parse_body(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn body_parsing() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  \n"), Value::Null);
        assert_eq!(parse_body(r#"{"result":"NO_DATA"}"#), json!({ "result": "NO_DATA" }));
        assert_eq!(parse_body("Bad Gateway"), Value::String("Bad Gateway".into()));
    }

    #[test]
    fn request_builders_set_method_and_body() {
        let req = ApiRequest::put("/x", json!({ "code": "1234" }));
        assert_eq!(req.method, Some(Method::PUT));
        assert_eq!(req.json, Some(json!({ "code": "1234" })));
        assert!(ApiRequest::get("/y").method.is_none());
    }
}
