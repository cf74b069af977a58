use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha1::Sha1;
use tracing::trace;

use crate::{AuthError, Credentials};

type HmacSha1 = Hmac<Sha1>;

/// Produces `Authorization` header values.
///
/// The upload engine treats both tokens as opaque strings.
pub trait Signer: Send + Sync {
    /// Multi-use signature for `bucket`, valid until `expiry` (unix seconds).
    fn sign_more(&self, bucket: &str, expiry: u64) -> Result<String, AuthError>;

    /// Single-use signature bound to `path` inside `bucket`.
    fn sign_once(&self, bucket: &str, path: &str) -> Result<String, AuthError>;
}

/// HMAC-SHA1 app signer.
#[derive(Debug, Clone)]
pub struct AppSigner {
    credentials: Credentials,
}

impl AppSigner {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    fn sign(&self, expiry: u64, file_id: &str, bucket: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let nonce: u32 = rand::thread_rng().r#gen();
        app_sign(&self.credentials, expiry, file_id, bucket, now, nonce)
    }
}

impl Signer for AppSigner {
    fn sign_more(&self, bucket: &str, expiry: u64) -> Result<String, AuthError> {
        trace!(bucket, expiry, "signing multi-use");
        self.sign(expiry, "", bucket)
    }

    fn sign_once(&self, bucket: &str, path: &str) -> Result<String, AuthError> {
        let fid = file_id(self.credentials.app_id, bucket, path);
        trace!(bucket, file_id = %fid, "signing single-use");
        self.sign(0, &fid, bucket)
    }
}

/// Resource identifier a single-use signature is bound to.
pub fn file_id(app_id: u64, bucket: &str, path: &str) -> String {
    format!("/{app_id}/{bucket}{path}")
}

/// Computes an app signature.
///
/// `base64(hmac_sha1(secret_key, plain) ++ plain)` where `plain` is
/// `a={app_id}&k={secret_id}&e={expiry}&t={now}&r={nonce}&f={file_id}&b={bucket}`.
pub fn app_sign(
    credentials: &Credentials,
    expiry: u64,
    file_id: &str,
    bucket: &str,
    now: u64,
    nonce: u32,
) -> Result<String, AuthError> {
    let plain = format!(
        "a={}&k={}&e={}&t={}&r={}&f={}&b={}",
        credentials.app_id, credentials.secret_id, expiry, now, nonce, file_id, bucket
    );

    let mut mac = HmacSha1::new_from_slice(credentials.secret_key.as_bytes())
        .map_err(|e| AuthError::InvalidKey(e.to_string()))?;
    mac.update(plain.as_bytes());
    let digest = mac.finalize().into_bytes();

    let mut bin = Vec::with_capacity(digest.len() + plain.len());
    bin.extend_from_slice(&digest);
    bin.extend_from_slice(plain.as_bytes());
    Ok(STANDARD.encode(bin))
}
