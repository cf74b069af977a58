//! Test doubles shared by the engine tests.

use std::collections::VecDeque;

use crate::executor::{ApiRequest, RequestExecutor, TransportError};

/// Mock executor that replays scripted responses and records requests.
#[derive(Default)]
pub(crate) struct MockExecutor {
    responses: VecDeque<Result<Vec<u8>, TransportError>>,
    requests: Vec<ApiRequest>,
}

impl MockExecutor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_json(&mut self, body: &str) {
        self.responses.push_back(Ok(body.as_bytes().to_vec()));
    }

    pub(crate) fn push_raw(&mut self, body: Vec<u8>) {
        self.responses.push_back(Ok(body));
    }

    pub(crate) fn push_transport_error(&mut self, msg: &str) {
        self.responses
            .push_back(Err(TransportError::Io(std::io::Error::other(msg.to_string()))));
    }

    /// Scripts `n` successful slice acknowledgements.
    pub(crate) fn push_slice_acks(&mut self, n: usize) {
        for _ in 0..n {
            self.push_json(r#"{"code":0,"message":"SUCCESS","data":{"session":"s-1"}}"#);
        }
    }

    pub(crate) fn requests(&self) -> &[ApiRequest] {
        &self.requests
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.len()
    }

    /// Declared `offset` of every slice request, in order.
    pub(crate) fn slice_offsets(&self) -> Vec<u64> {
        self.requests
            .iter()
            .filter(|r| r.part("filecontent").is_some())
            .filter_map(|r| r.text_part("offset"))
            .map(|o| o.parse().unwrap())
            .collect()
    }
}

impl RequestExecutor for MockExecutor {
    fn execute(&mut self, request: ApiRequest) -> Result<Vec<u8>, TransportError> {
        self.requests.push(request);
        self.responses.pop_front().unwrap_or_else(|| {
            Err(TransportError::Io(std::io::Error::other(
                "no scripted response",
            )))
        })
    }
}

/// Signer returning predictable tokens that name the signing mode.
pub(crate) struct FixedSigner;

impl cosapi_auth::Signer for FixedSigner {
    fn sign_more(&self, bucket: &str, _expiry: u64) -> Result<String, cosapi_auth::AuthError> {
        Ok(format!("more:{bucket}"))
    }

    fn sign_once(&self, bucket: &str, path: &str) -> Result<String, cosapi_auth::AuthError> {
        Ok(format!("once:{bucket}{path}"))
    }
}
