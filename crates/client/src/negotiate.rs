//! `upload_slice` preparation handshake.

use cosapi_protocol::constants::Op;
use cosapi_protocol::messages::PrepareData;
use cosapi_protocol::{FileDigest, UploadOutcome, UploadSession};
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::executor::{self, ApiRequest, Endpoint, FormPart, RequestExecutor};

/// Parameters of one preparation request.
#[derive(Debug, Clone, Copy)]
pub struct PrepareRequest<'a> {
    pub digest: &'a FileDigest,
    pub biz_attr: Option<&'a str>,
    /// Session of an earlier attempt to resume.
    pub session: Option<&'a str>,
    /// Desired slice size; `None` or 0 lets the service choose.
    pub slice_size: Option<u64>,
}

impl PrepareRequest<'_> {
    /// Multipart fields; optional ones are omitted when empty.
    pub fn form_parts(&self) -> Vec<FormPart> {
        let mut parts = vec![
            FormPart::text("op", Op::UploadSlice.as_str()),
            FormPart::text("filesize", self.digest.byte_length.to_string()),
            FormPart::text("sha", self.digest.sha.clone()),
        ];
        if let Some(attr) = self.biz_attr.filter(|a| !a.is_empty()) {
            parts.push(FormPart::text("biz_attr", attr));
        }
        if let Some(session) = self.session.filter(|s| !s.is_empty()) {
            parts.push(FormPart::text("session", session));
        }
        if let Some(size) = self.slice_size.filter(|s| *s > 0) {
            parts.push(FormPart::text("slice_size", size.to_string()));
        }
        parts
    }
}

/// Result of the preparation handshake.
#[derive(Debug, Clone, PartialEq)]
pub enum NegotiationResult {
    /// The service already stores this content; nothing to transfer.
    DedupHit {
        resource_url: String,
        outcome: UploadOutcome,
    },
    /// Transfer must proceed from the session's resume offset.
    SessionStart { session: UploadSession },
    Failed { code: i32, message: String },
}

/// Performs the preparation handshake for one file.
pub struct UploadNegotiator<'a, E: RequestExecutor + ?Sized> {
    executor: &'a mut E,
    endpoint: &'a Endpoint,
}

impl<'a, E: RequestExecutor + ?Sized> UploadNegotiator<'a, E> {
    pub fn new(executor: &'a mut E, endpoint: &'a Endpoint) -> Self {
        Self { executor, endpoint }
    }

    /// Sends the preparation request and classifies the response.
    ///
    /// A response with `url` (or `access_url`) is a dedup hit. One with
    /// `offset`, `session` and `slice_size` starts a session. Anything else,
    /// or a session the transfer loop could not drive (zero slice size,
    /// offset past the end), is malformed.
    pub fn prepare(&mut self, request: &PrepareRequest<'_>) -> NegotiationResult {
        debug!(
            filesize = request.digest.byte_length,
            sha = %request.digest.sha,
            resume = request.session.is_some(),
            "negotiating slice upload"
        );

        match self.negotiate(request) {
            Ok(result) => result,
            Err(e) => {
                warn!(code = e.code(), error = %e, "negotiation failed");
                let outcome = e.into_outcome();
                NegotiationResult::Failed {
                    code: outcome.code,
                    message: outcome.message,
                }
            }
        }
    }

    fn negotiate(
        &mut self,
        request: &PrepareRequest<'_>,
    ) -> Result<NegotiationResult, ClientError> {
        let api_request = ApiRequest::multipart(self.endpoint, request.form_parts());
        let resp = executor::send(&mut *self.executor, api_request)?;

        if !resp.is_success() {
            return Err(ClientError::Service {
                code: resp.code,
                message: resp.message,
            });
        }

        let data = resp
            .parse_data::<PrepareData>()
            .map_err(|e| ClientError::MalformedResponse(format!("preparation data: {e}")))?
            .ok_or_else(|| {
                ClientError::MalformedResponse("preparation response has no data".into())
            })?;

        if let Some(url) = data.url.clone().or_else(|| data.access_url.clone()) {
            info!(resource_url = %url, "content already stored");
            let mut outcome = UploadOutcome::from_response(&resp);
            outcome.resource_url = Some(url.clone());
            return Ok(NegotiationResult::DedupHit {
                resource_url: url,
                outcome,
            });
        }

        let (Some(offset), Some(session_id), Some(slice_size)) =
            (data.offset, data.session, data.slice_size)
        else {
            return Err(ClientError::MalformedResponse(
                "preparation response lacks offset, session or slice_size".into(),
            ));
        };

        let session = UploadSession::new(session_id, slice_size, offset, request.digest.clone())
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;
        debug!(
            session = session.session_id(),
            slice_size,
            offset,
            "session negotiated"
        );
        Ok(NegotiationResult::SessionStart { session })
    }
}
