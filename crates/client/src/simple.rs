//! Single-request upload for small files.

use std::path::Path;

use cosapi_protocol::UploadOutcome;
use cosapi_protocol::constants::Op;
use cosapi_transfer::ContentHasher;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::executor::{self, ApiRequest, Endpoint, FormPart, RequestExecutor};
use crate::orchestrator::check_readable;

/// Uploads a whole file with its digest in one multipart request.
///
/// There is no session: any failure ends the attempt.
pub struct SimpleUploader<'a, E: RequestExecutor + ?Sized> {
    executor: &'a mut E,
    endpoint: &'a Endpoint,
    hasher: &'a ContentHasher,
}

impl<'a, E: RequestExecutor + ?Sized> SimpleUploader<'a, E> {
    pub fn new(executor: &'a mut E, endpoint: &'a Endpoint, hasher: &'a ContentHasher) -> Self {
        Self {
            executor,
            endpoint,
            hasher,
        }
    }

    pub fn upload(&mut self, path: &Path, biz_attr: Option<&str>) -> UploadOutcome {
        match self.try_upload(path, biz_attr) {
            Ok(outcome) => {
                if outcome.is_success() {
                    info!(
                        resource_url = outcome.resource_url.as_deref().unwrap_or(""),
                        "upload complete"
                    );
                } else {
                    warn!(code = outcome.code, message = %outcome.message, "upload rejected");
                }
                outcome
            }
            Err(e) => {
                warn!(error = %e, "upload failed");
                e.into_outcome()
            }
        }
    }

    fn try_upload(
        &mut self,
        path: &Path,
        biz_attr: Option<&str>,
    ) -> Result<UploadOutcome, ClientError> {
        check_readable(path)?;
        let digest = self.hasher.hash(path)?;
        debug!(sha = %digest.sha, len = digest.byte_length, "uploading whole file");

        let parts = vec![
            FormPart::text("op", Op::Upload.as_str()),
            FormPart::text("sha", digest.sha),
            FormPart::text("biz_attr", biz_attr.unwrap_or_default()),
            FormPart::file("filecontent", path),
        ];
        let request = ApiRequest::multipart(self.endpoint, parts);
        let resp = executor::send(&mut *self.executor, request)?;
        Ok(UploadOutcome::from_response(&resp))
    }
}
