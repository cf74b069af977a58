//! Client configuration.

use std::time::Duration;

use cosapi_auth::{AuthError, Credentials};
use cosapi_protocol::constants::{
    DEFAULT_END_POINT, DEFAULT_SLICE_SIZE, EXPIRED_SECONDS, MIN_SLICE_FILE_SIZE, REQUEST_TIMEOUT,
};
use serde::{Deserialize, Serialize};

/// Account, endpoint and tuning settings for a [`crate::CosClient`].
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Numeric application id of the account.
    #[serde(default)]
    pub app_id: u64,

    #[serde(default)]
    pub secret_id: String,

    #[serde(default)]
    pub secret_key: String,

    /// Base URL of the file service; the app id and bucket are appended.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request ceiling enforced by the HTTP executor.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Lifetime of multi-use signatures.
    #[serde(default = "default_sign_expiry_secs")]
    pub sign_expiry_secs: u64,

    /// Slice size requested during negotiation (the service may override it).
    #[serde(default = "default_slice_size")]
    pub slice_size: u64,

    /// Files at or above this size use slice uploads in `upload_auto`.
    #[serde(default = "default_slice_threshold")]
    pub slice_threshold: u64,
}

fn default_endpoint() -> String {
    DEFAULT_END_POINT.into()
}

fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT.as_secs()
}

fn default_sign_expiry_secs() -> u64 {
    EXPIRED_SECONDS
}

fn default_slice_size() -> u64 {
    DEFAULT_SLICE_SIZE
}

fn default_slice_threshold() -> u64 {
    MIN_SLICE_FILE_SIZE
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_id: 0,
            secret_id: String::new(),
            secret_key: String::new(),
            endpoint: default_endpoint(),
            request_timeout_secs: default_request_timeout_secs(),
            sign_expiry_secs: default_sign_expiry_secs(),
            slice_size: default_slice_size(),
            slice_threshold: default_slice_threshold(),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("sign_expiry_secs", &self.sign_expiry_secs)
            .field("slice_size", &self.slice_size)
            .field("slice_threshold", &self.slice_threshold)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a configuration with default tuning for the given account.
    pub fn new(app_id: u64, secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            app_id,
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Validated signing credentials.
    pub fn credentials(&self) -> Result<Credentials, AuthError> {
        Credentials::new(self.app_id, self.secret_id.clone(), self.secret_key.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// URL of `path` inside `bucket`: `{endpoint}{app_id}/{bucket}{path}`.
    ///
    /// `path` is percent-encoded segment by segment; `/` separators are kept.
    pub fn resource_url(&self, bucket: &str, path: &str) -> String {
        let base = self.endpoint.trim_end_matches('/');
        format!(
            "{base}/{}/{bucket}{}",
            self.app_id,
            crate::path::encode_path(path)
        )
    }
}
