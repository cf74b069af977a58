//! Folder and object metadata operations.
//!
//! Each is a single request with no state machine. The response `data`
//! (listing, stat details) is attached to the returned outcome.

use cosapi_protocol::UploadOutcome;
use cosapi_protocol::constants::{ListPattern, Op};
use cosapi_protocol::messages::MutationRequest;
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;

use crate::client::CosClient;
use crate::error::ClientError;
use crate::executor::{self, ApiRequest, Endpoint, RequestExecutor};
use crate::path::PathKind;

/// Paging and filtering of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of entries returned.
    pub num: u32,
    pub pattern: ListPattern,
    /// Opaque cursor from a previous page (`context` in the response).
    pub offset: String,
    /// 0 for ascending, 1 for descending.
    pub order: u8,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            num: 20,
            pattern: ListPattern::Both,
            offset: String::new(),
            order: 0,
        }
    }
}

impl ListOptions {
    fn query(&self) -> String {
        format!(
            "?op={}&num={}&pattern={}&offset={}&order={}",
            Op::List,
            self.num,
            self.pattern.as_str(),
            utf8_percent_encode(&self.offset, NON_ALPHANUMERIC),
            self.order
        )
    }
}

impl<E: RequestExecutor> CosClient<E> {
    /// Creates a folder. `path` must end with `/`.
    pub fn create_folder(
        &mut self,
        bucket: &str,
        path: &str,
        overwrite: bool,
        biz_attr: Option<&str>,
    ) -> UploadOutcome {
        let body = MutationRequest::create(overwrite, biz_attr);
        self.run(|c| {
            let endpoint = c.multi_use_endpoint(bucket, path, PathKind::Folder)?;
            c.post_json(&endpoint, &body)
        })
    }

    /// Lists a folder. `path` must end with `/`.
    pub fn list(&mut self, bucket: &str, path: &str, options: &ListOptions) -> UploadOutcome {
        self.run(|c| {
            let endpoint = c.multi_use_endpoint(bucket, path, PathKind::Folder)?;
            let url = format!("{}{}", endpoint.url, options.query());
            c.get(url, &endpoint)
        })
    }

    /// Returns the attributes of a file or folder.
    pub fn stat(&mut self, bucket: &str, path: &str) -> UploadOutcome {
        self.run(|c| {
            let endpoint = c.multi_use_endpoint(bucket, path, PathKind::Any)?;
            let url = format!("{}?op={}", endpoint.url, Op::Stat);
            c.get(url, &endpoint)
        })
    }

    /// Replaces the business attributes of a file or folder.
    pub fn update(&mut self, bucket: &str, path: &str, biz_attr: Option<&str>) -> UploadOutcome {
        let body = MutationRequest::update(biz_attr);
        self.run(|c| {
            let endpoint = c.single_use_endpoint(bucket, path)?;
            c.post_json(&endpoint, &body)
        })
    }

    /// Deletes a file or an empty folder.
    pub fn delete(&mut self, bucket: &str, path: &str) -> UploadOutcome {
        self.run(|c| {
            if path == "/" {
                return Err(ClientError::InvalidArgument(
                    "the bucket root cannot be deleted".into(),
                ));
            }
            let endpoint = c.single_use_endpoint(bucket, path)?;
            c.post_json(&endpoint, &MutationRequest::delete())
        })
    }

    fn run(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<UploadOutcome, ClientError>,
    ) -> UploadOutcome {
        op(self).unwrap_or_else(ClientError::into_outcome)
    }

    fn get(&mut self, url: String, endpoint: &Endpoint) -> Result<UploadOutcome, ClientError> {
        debug!(url = %url, "GET");
        let resp = executor::send(
            &mut self.executor,
            ApiRequest::get(url, &endpoint.authorization),
        )?;
        Ok(UploadOutcome::from_response(&resp))
    }

    fn post_json(
        &mut self,
        endpoint: &Endpoint,
        body: &MutationRequest,
    ) -> Result<UploadOutcome, ClientError> {
        let json = serde_json::to_string(body)
            .map_err(|e| ClientError::InvalidArgument(format!("request body: {e}")))?;
        debug!(url = %endpoint.url, op = %body.op, "POST");
        let request = ApiRequest::json(endpoint.url.clone(), &endpoint.authorization, json);
        let resp = executor::send(&mut self.executor, request)?;
        Ok(UploadOutcome::from_response(&resp))
    }
}
