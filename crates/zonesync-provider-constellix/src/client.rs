//! Constellix v1 transport client
//!
//! Signs every request, paces requests according to the configured rate
//! limit delay, retries once when the provider reports a locked resource,
//! and classifies failures into [`zonesync_core::Error`] variants.
//!
//! ## Authentication
//!
//! ```http
//! x-cnsdns-apiKey: <api key>
//! x-cnsdns-requestDate: <unix epoch, milliseconds>
//! x-cnsdns-hmac: base64(HMAC-SHA1(secret, requestDate))
//! ```

use base64::prelude::*;
use hmac::{Hmac, Mac};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use sha1::Sha1;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};
use zonesync_core::{Error, Lookup, Result};

use crate::native::{DomainTemplate, NativeDomain, NativePayload, NativeRecord, NativeType};

/// Production API root
pub const PRODUCTION_API_ROOT: &str = "https://api.dns.constellix.com/v1";

/// Sandbox API root
pub const SANDBOX_API_ROOT: &str = "https://api.sandbox.dns.constellix.com/v1";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Body marker of a 403 that means "locked, try again" rather than "forbidden"
const LOCK_MARKER: &str = "locked";

type HmacSha1 = Hmac<Sha1>;

/// Bounded retry for transiently locked resources
///
/// `max_attempts` counts the first attempt, so the default of 2 is
/// "retry once". `delay` is waited before each retry and is also the
/// minimum spacing kept between consecutive requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::ZERO,
        }
    }
}

/// Authenticated client for the Constellix REST API
pub struct ConstellixClient {
    http: reqwest::Client,
    base_url: String,
    /// ⚠️ NEVER log this value
    api_key: String,
    /// ⚠️ NEVER log this value
    secret_key: String,
    retry: RetryPolicy,
    last_request: Mutex<Option<Instant>>,
}

// Custom Debug implementation that hides the credentials
impl std::fmt::Debug for ConstellixClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstellixClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<REDACTED>")
            .field("secret_key", &"<REDACTED>")
            .field("retry", &self.retry)
            .finish()
    }
}

impl ConstellixClient {
    /// Create a new client
    ///
    /// # Parameters
    ///
    /// - `api_key`: Constellix API key
    /// - `secret_key`: Constellix secret key (signs each request)
    /// - `base_url`: API root, e.g. [`PRODUCTION_API_ROOT`]
    /// - `retry`: Lock retry and pacing policy
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        base_url: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let secret_key = secret_key.into();
        if api_key.is_empty() || secret_key.is_empty() {
            return Err(Error::config("Constellix API key and secret key are required"));
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            secret_key,
            retry,
            last_request: Mutex::new(None),
        })
    }

    /// `x-cnsdns-hmac` value for a request dated `request_date`
    pub fn signature(&self, request_date: &str) -> Result<String> {
        let mut mac = HmacSha1::new_from_slice(self.secret_key.as_bytes())
            .map_err(|e| Error::config(format!("Unusable secret key: {}", e)))?;
        mac.update(request_date.as_bytes());
        Ok(BASE64_STANDARD.encode(mac.finalize().into_bytes()))
    }

    /// Issue one API call and decode its JSON body
    ///
    /// Empty success bodies decode to `Value::Null`.
    ///
    /// # Errors
    ///
    /// - `Error::NotFound`: 404
    /// - `Error::Unauthorized`: 401, or 403 without a lock marker
    /// - `Error::BadRequest`: 400 carrying validation messages
    /// - `Error::Http`: anything else, including a lock that outlived the retry
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        data: Option<&Value>,
    ) -> Result<Value> {
        let text = self.execute(method, path, params, data).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(Error::from)
    }

    /// Issue one API call and return its raw success body
    ///
    /// Mutations go through here directly: whatever the provider confirms
    /// them with is not decoded.
    async fn execute(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        data: Option<&Value>,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 1;

        loop {
            self.pace().await;

            let request_date = chrono::Utc::now().timestamp_millis().to_string();
            let mut builder = self
                .http
                .request(method.clone(), &url)
                .header("x-cnsdns-apiKey", &self.api_key)
                .header("x-cnsdns-hmac", self.signature(&request_date)?)
                .header("x-cnsdns-requestDate", &request_date);
            if !params.is_empty() {
                builder = builder.query(params);
            }
            if let Some(body) = data {
                builder = builder.json(body);
            }

            debug!("{} {} (attempt {})", method, path, attempt);
            let response = builder
                .send()
                .await
                .map_err(|e| Error::transport(format!("{} {} failed: {}", method, path, e)))?;

            let status = response.status();
            let text = response
                .text()
                .await
                .map_err(|e| Error::transport(format!("Failed to read response body: {}", e)))?;

            if status.is_success() {
                return Ok(text);
            }

            if is_locked(status, &text) && attempt < self.retry.max_attempts {
                warn!(
                    "{} {} hit a locked resource, retrying in {:?}",
                    method, path, self.retry.delay
                );
                tokio::time::sleep(self.retry.delay).await;
                attempt += 1;
                continue;
            }

            return Err(classify(status, path, text));
        }
    }

    /// `GET /domains`
    pub async fn list_domains(&self) -> Result<Lookup<Vec<NativeDomain>>> {
        match lookup(self.request(Method::GET, "/domains", &[], None).await)? {
            Lookup::Found(body) => Ok(Lookup::Found(serde_json::from_value(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    /// `GET /domains/{id}`
    pub async fn get_domain(&self, domain_id: u64) -> Result<Lookup<Value>> {
        let path = format!("/domains/{}", domain_id);
        lookup(self.request(Method::GET, &path, &[], None).await)
    }

    /// `POST /domains`, returning the new domain's ID
    ///
    /// `name` is the zone name without its trailing dot.
    pub async fn create_domain(&self, name: &str, template: &DomainTemplate) -> Result<u64> {
        let body = template.body(name);
        let created = self.request(Method::POST, "/domains", &[], Some(&body)).await?;

        let entry = match &created {
            Value::Array(items) => items.first(),
            other => Some(other),
        };
        entry
            .and_then(|e| e.get("id"))
            .and_then(Value::as_u64)
            .ok_or_else(|| {
                Error::provider("constellix", format!("Domain creation response has no id: {}", created))
            })
    }

    /// `GET /domains/{id}/records`
    pub async fn list_records(&self, domain_id: u64) -> Result<Lookup<Vec<NativeRecord>>> {
        let path = format!("/domains/{}/records", domain_id);
        match lookup(self.request(Method::GET, &path, &[], None).await)? {
            Lookup::Found(Value::Null) => Ok(Lookup::Found(Vec::new())),
            Lookup::Found(body) => Ok(Lookup::Found(serde_json::from_value(body)?)),
            Lookup::NotFound => Ok(Lookup::NotFound),
        }
    }

    /// `POST /domains/{id}/records/{TYPE}`
    pub async fn create_record(
        &self,
        domain_id: u64,
        native_type: NativeType,
        payload: &NativePayload,
    ) -> Result<()> {
        let path = format!("/domains/{}/records/{}", domain_id, native_type);
        let body = serde_json::to_value(payload)?;
        self.execute(Method::POST, &path, &[], Some(&body)).await?;
        Ok(())
    }

    /// `PUT /domains/{id}/records/{TYPE}/{recordId}`
    pub async fn update_record(
        &self,
        domain_id: u64,
        native_type: NativeType,
        record_id: u64,
        payload: &NativePayload,
    ) -> Result<()> {
        let path = format!("/domains/{}/records/{}/{}", domain_id, native_type, record_id);
        let body = serde_json::to_value(payload)?;
        self.execute(Method::PUT, &path, &[], Some(&body)).await?;
        Ok(())
    }

    /// `DELETE /domains/{id}/records/{TYPE}/{recordId}`
    pub async fn delete_record(
        &self,
        domain_id: u64,
        native_type: NativeType,
        record_id: u64,
    ) -> Result<()> {
        let path = format!("/domains/{}/records/{}/{}", domain_id, native_type, record_id);
        self.execute(Method::DELETE, &path, &[], None).await?;
        Ok(())
    }

    /// Keep at least `retry.delay` between consecutive requests
    async fn pace(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(at) = *last {
            let elapsed = at.elapsed();
            if elapsed < self.retry.delay {
                tokio::time::sleep(self.retry.delay - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// Turn a NotFound error into [`Lookup::NotFound`]
fn lookup(result: Result<Value>) -> Result<Lookup<Value>> {
    match result {
        Ok(body) => Ok(Lookup::Found(body)),
        Err(Error::NotFound(_)) => Ok(Lookup::NotFound),
        Err(e) => Err(e),
    }
}

fn is_locked(status: StatusCode, body: &str) -> bool {
    status == StatusCode::FORBIDDEN && body.to_ascii_lowercase().contains(LOCK_MARKER)
}

/// Map a non-success response onto the error taxonomy
pub(crate) fn classify(status: StatusCode, path: &str, body: String) -> Error {
    match status.as_u16() {
        400 => match validation_messages(&body) {
            Some(messages) => Error::bad_request(messages),
            None => Error::http(400, body),
        },
        401 => Error::Unauthorized,
        // A lock that is still held after the last attempt stays a plain HTTP error
        403 if is_locked(status, &body) => Error::http(403, body),
        403 => Error::Unauthorized,
        404 => Error::not_found(path.to_string()),
        code => Error::http(code, body),
    }
}

/// Messages of a `{"errors": [...]}` (or `{"error": ...}`) body
fn validation_messages(body: &str) -> Option<Vec<String>> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let field = parsed.get("errors").or_else(|| parsed.get("error"))?;
    match field {
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        ),
        Value::String(s) => Some(vec![s.clone()]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ConstellixClient {
        ConstellixClient::new("api", "secret", PRODUCTION_API_ROOT, RetryPolicy::default()).unwrap()
    }

    #[test]
    fn test_signature_is_base64_hmac_sha1() {
        assert_eq!(
            client().signature("1565000000000").unwrap(),
            "XbV/jAog0iiLlK1DkC0p08C4nPk="
        );
    }

    #[test]
    fn test_empty_credentials_rejected() {
        assert!(ConstellixClient::new("", "secret", PRODUCTION_API_ROOT, RetryPolicy::default()).is_err());
        assert!(ConstellixClient::new("api", "", PRODUCTION_API_ROOT, RetryPolicy::default()).is_err());
    }

    #[test]
    fn test_credentials_not_exposed_in_debug() {
        let debug = format!("{:?}", client());
        assert!(!debug.contains("secret"));
        assert!(debug.contains("ConstellixClient"));
    }

    #[test]
    fn test_classify() {
        assert!(matches!(
            classify(StatusCode::UNAUTHORIZED, "/domains", String::new()),
            Error::Unauthorized
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, "/domains", "Forbidden".into()),
            Error::Unauthorized
        ));
        assert!(matches!(
            classify(StatusCode::FORBIDDEN, "/domains", "Resource is locked".into()),
            Error::Http { status: 403, .. }
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, "/domains/1", String::new()),
            Error::NotFound(_)
        ));
        assert!(matches!(
            classify(StatusCode::BAD_GATEWAY, "/domains", "Things caught fire".into()),
            Error::Http { status: 502, .. }
        ));
    }

    #[test]
    fn test_classify_bad_request_messages() {
        let err = classify(
            StatusCode::BAD_REQUEST,
            "/domains",
            r#"{"errors": ["\"unittests\" is not a valid domain name"]}"#.into(),
        );
        assert_eq!(err.to_string(), "\n  - \"unittests\" is not a valid domain name");

        let unparsed = classify(StatusCode::BAD_REQUEST, "/domains", "nope".into());
        assert!(matches!(unparsed, Error::Http { status: 400, .. }));
    }
}
