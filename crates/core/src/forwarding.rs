//! Relay of ingested records to an operator-configured external URL.
//!
//! Forwarding is best-effort, at-most-once delivery: the ingestion path spawns
//! the relay after the record is stored and never waits for, or reports, the
//! outcome. The explicit test path ([`Forwarder::send_test`]) is the one place
//! where the relay result is surfaced to the caller.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::records::NfcRecord;

/// Operator-configured relay settings.
///
/// Updates are full-replace: any field omitted from an update payload
/// deserializes to its default rather than keeping its previous value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ForwardingConfig {
    /// Gate for all relay behaviour.
    pub enabled: bool,
    /// Destination URL; the empty string means unset.
    pub target_url: String,
    /// Optional bearer credential. A `Bearer ` prefix is added when missing.
    pub api_key: String,
    /// Extra headers merged into the relay request. These may override the
    /// default `Content-Type` but never the computed `Authorization`.
    pub custom_headers: BTreeMap<String, String>,
}

impl ForwardingConfig {
    /// Whether relaying should be attempted at all.
    pub fn is_configured(&self) -> bool {
        self.enabled && !self.target_url.is_empty()
    }
}

/// Process-wide forwarding configuration singleton.
///
/// Starts disabled and empty; replaced wholesale on every update. Not
/// persisted across restarts.
#[derive(Clone, Default)]
pub struct ForwardingStore {
    inner: Arc<Mutex<ForwardingConfig>>,
}

impl ForwardingStore {
    /// Creates a store holding the disabled default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current configuration verbatim.
    pub fn get(&self) -> ForwardingConfig {
        self.inner
            .lock()
            .expect("forwarding config mutex poisoned")
            .clone()
    }

    /// Replaces the configuration wholesale.
    pub fn set(&self, config: ForwardingConfig) {
        *self.inner.lock().expect("forwarding config mutex poisoned") = config;
    }
}

/// Errors raised while relaying a record.
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    #[error("Forwarding not configured")]
    NotConfigured,
    #[error("invalid forwarding header {0:?}")]
    InvalidHeader(String),
    #[error("failed to encode relay body: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

/// Outbound relay client.
///
/// Holds a single shared `reqwest::Client`; cloning is cheap. No retries and
/// no explicit timeout beyond transport defaults.
#[derive(Clone, Default)]
pub struct Forwarder {
    http: reqwest::Client,
}

impl Forwarder {
    /// Creates a forwarder with a fresh HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends one relay POST of `body` to the configured target.
    ///
    /// Returns without any network activity when the configuration is
    /// disabled or has no target URL. A non-2xx response is an error so that
    /// callers on the test path can surface the status.
    pub async fn relay<T: Serialize>(
        &self,
        config: &ForwardingConfig,
        body: &T,
    ) -> Result<(), ForwardError> {
        if !config.is_configured() {
            return Err(ForwardError::NotConfigured);
        }

        let headers = relay_headers(config)?;
        let payload = serde_json::to_vec(body)?;
        let response = self
            .http
            .post(&config.target_url)
            .headers(headers)
            .body(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ForwardError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_owned(),
            })
        }
    }

    /// Fire-and-forget relay of a stored record.
    ///
    /// Spawns the relay on the runtime and returns immediately; the outcome is
    /// logged and never reaches the ingesting client. Callers should check
    /// [`ForwardingConfig::is_configured`] first to avoid spawning a no-op
    /// task.
    pub fn spawn_relay(&self, config: ForwardingConfig, record: NfcRecord) {
        let forwarder = self.clone();
        tokio::spawn(async move {
            match forwarder.relay(&config, &record).await {
                Ok(()) => {
                    tracing::info!(target_url = %config.target_url, "data forwarded successfully");
                }
                Err(ForwardError::NotConfigured) => {}
                Err(e) => {
                    tracing::error!(target_url = %config.target_url, "failed to forward data: {e}");
                }
            }
        });
    }

    /// Relays a synthetic test record and surfaces the outcome.
    pub async fn send_test(&self, config: &ForwardingConfig) -> Result<(), ForwardError> {
        let test_record = serde_json::json!({
            "text": "Test NFC data from NFCure",
            "deviceInfo": "Test Device",
            "timestamp": Utc::now(),
            "test": true,
        });
        self.relay(config, &test_record).await
    }
}

/// Prefixes a credential with `Bearer ` unless it already carries it.
pub fn bearer_token(api_key: &str) -> String {
    if api_key.starts_with("Bearer ") {
        api_key.to_owned()
    } else {
        format!("Bearer {api_key}")
    }
}

/// Builds the relay header set: the JSON content type, then the operator's
/// custom headers (which may override it), then the computed `Authorization`,
/// which custom headers may not override.
fn relay_headers(config: &ForwardingConfig) -> Result<HeaderMap, ForwardError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, value) in &config.custom_headers {
        let name: HeaderName = name
            .parse()
            .map_err(|_| ForwardError::InvalidHeader(name.clone()))?;
        let value: HeaderValue = value
            .parse()
            .map_err(|_| ForwardError::InvalidHeader(name.to_string()))?;
        headers.insert(name, value);
    }

    if !config.api_key.is_empty() {
        let value: HeaderValue = bearer_token(&config.api_key)
            .parse()
            .map_err(|_| ForwardError::InvalidHeader(AUTHORIZATION.to_string()))?;
        headers.insert(AUTHORIZATION, value);
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured(target_url: &str) -> ForwardingConfig {
        ForwardingConfig {
            enabled: true,
            target_url: target_url.to_owned(),
            api_key: String::new(),
            custom_headers: BTreeMap::new(),
        }
    }

    #[test]
    fn get_is_idempotent_between_sets() {
        let store = ForwardingStore::new();
        store.set(configured("https://example.org/hook"));
        assert_eq!(store.get(), store.get());
    }

    #[test]
    fn set_replaces_the_whole_configuration() {
        let store = ForwardingStore::new();
        let mut first = configured("https://example.org/hook");
        first.api_key = "secret".to_owned();
        first
            .custom_headers
            .insert("X-Tenant".to_owned(), "alpha".to_owned());
        store.set(first);

        // Simulates an update payload that only names targetUrl.
        let update: ForwardingConfig =
            serde_json::from_str(r#"{"targetUrl": "https://example.org/other"}"#).unwrap();
        store.set(update);

        let current = store.get();
        assert!(!current.enabled);
        assert_eq!(current.target_url, "https://example.org/other");
        assert_eq!(current.api_key, "");
        assert!(current.custom_headers.is_empty());
    }

    #[test]
    fn bearer_prefix_is_added_once() {
        assert_eq!(bearer_token("abc"), "Bearer abc");
        assert_eq!(bearer_token("Bearer abc"), "Bearer abc");
    }

    #[test]
    fn custom_headers_may_override_content_type_but_not_authorization() {
        let mut config = configured("https://example.org/hook");
        config.api_key = "secret".to_owned();
        config
            .custom_headers
            .insert("Content-Type".to_owned(), "text/plain".to_owned());
        config
            .custom_headers
            .insert("Authorization".to_owned(), "Basic nope".to_owned());

        let headers = relay_headers(&config).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "text/plain");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret");
    }

    #[test]
    fn invalid_custom_header_is_rejected() {
        let mut config = configured("https://example.org/hook");
        config
            .custom_headers
            .insert("bad header name".to_owned(), "x".to_owned());
        assert!(matches!(
            relay_headers(&config),
            Err(ForwardError::InvalidHeader(_))
        ));
    }

    #[tokio::test]
    async fn relay_makes_no_call_when_disabled() {
        let forwarder = Forwarder::new();
        let config = ForwardingConfig::default();
        let result = forwarder.relay(&config, &serde_json::json!({})).await;
        assert!(matches!(result, Err(ForwardError::NotConfigured)));
    }

    #[tokio::test]
    async fn send_test_fails_fast_without_a_target() {
        let forwarder = Forwarder::new();
        let mut config = ForwardingConfig::default();
        config.enabled = true; // still no target URL
        let result = forwarder.send_test(&config).await;
        assert!(matches!(result, Err(ForwardError::NotConfigured)));
    }
}
