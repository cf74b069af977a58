//! Request signing for the COS object-storage REST API.
//!
//! The service authenticates every request with an `Authorization` header
//! carrying an app signature. Two modes exist:
//!
//! - **multi-use**: valid until an expiry timestamp, bound to a bucket only.
//!   Used for uploads, negotiation, listing and stat.
//! - **single-use**: expiry `0`, bound to one resource path. Used for update
//!   and delete.
//!
//! Callers depend on the [`Signer`] trait; [`AppSigner`] is the HMAC-SHA1
//! implementation backed by [`Credentials`].

mod signer;

pub use signer::{AppSigner, Signer, app_sign, file_id};

/// Errors produced by the auth crate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("missing credential: {0}")]
    MissingCredential(&'static str),
}

/// Account credentials used to sign requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub app_id: u64,
    pub secret_id: String,
    pub secret_key: String,
}

impl Credentials {
    /// Creates credentials, rejecting empty secrets.
    pub fn new(
        app_id: u64,
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();
        if secret_id.is_empty() {
            return Err(AuthError::MissingCredential("secret_id"));
        }
        if secret_key.is_empty() {
            return Err(AuthError::MissingCredential("secret_key"));
        }
        Ok(Self {
            app_id,
            secret_id,
            secret_key,
        })
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("app_id", &self.app_id)
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
