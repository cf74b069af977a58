//! Request executor seam.
//!
//! The engine never talks to HTTP directly: it builds [`ApiRequest`]s and
//! hands them to a [`RequestExecutor`]. [`crate::HttpExecutor`] is the
//! production implementation; tests use a scripted mock.

use std::path::PathBuf;

use cosapi_protocol::ApiResponse;
use tracing::debug;

use crate::error::ClientError;

/// Errors from executing a single request.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header {0}")]
    InvalidHeader(String),
}

/// Issues one signed request and returns the raw response body.
///
/// An executor is used by one client at a time (`&mut self`); every call
/// returns a fresh body, so nothing from a previous response can leak into
/// the next one.
pub trait RequestExecutor {
    fn execute(&mut self, request: ApiRequest) -> Result<Vec<u8>, TransportError>;
}

impl<E: RequestExecutor + ?Sized> RequestExecutor for &mut E {
    fn execute(&mut self, request: ApiRequest) -> Result<Vec<u8>, TransportError> {
        (**self).execute(request)
    }
}

/// Where requests for one operation go and how they are authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub authorization: String,
}

impl Endpoint {
    pub fn new(url: impl Into<String>, authorization: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            authorization: authorization.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Value of one multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartValue {
    Text(String),
    /// In-memory binary payload (one slice).
    Bytes { file_name: String, data: Vec<u8> },
    /// Whole file streamed from disk.
    File(PathBuf),
}

/// One multipart form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

impl FormPart {
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: PartValue::Text(value.into()),
        }
    }

    pub fn bytes(name: &str, file_name: &str, data: Vec<u8>) -> Self {
        Self {
            name: name.to_string(),
            value: PartValue::Bytes {
                file_name: file_name.to_string(),
                data,
            },
        }
    }

    pub fn file(name: &str, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.to_string(),
            value: PartValue::File(path.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestBody {
    Empty,
    Json(String),
    Multipart(Vec<FormPart>),
}

/// A fully described request, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: RequestBody,
}

impl ApiRequest {
    /// GET with parameters already encoded in `url`.
    pub fn get(url: impl Into<String>, authorization: &str) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            headers: vec![("Authorization".into(), authorization.into())],
            body: RequestBody::Empty,
        }
    }

    /// Multipart POST (upload, preparation and slice operations).
    pub fn multipart(endpoint: &Endpoint, parts: Vec<FormPart>) -> Self {
        Self {
            method: Method::Post,
            url: endpoint.url.clone(),
            headers: vec![("Authorization".into(), endpoint.authorization.clone())],
            body: RequestBody::Multipart(parts),
        }
    }

    /// JSON POST (metadata-mutating operations).
    pub fn json(url: impl Into<String>, authorization: &str, body: String) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: vec![
                ("Authorization".into(), authorization.into()),
                ("Content-Type".into(), "application/json".into()),
            ],
            body: RequestBody::Json(body),
        }
    }

    /// Returns a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the text value of a multipart field.
    pub fn text_part(&self, name: &str) -> Option<&str> {
        match self.part(name)? {
            PartValue::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Returns a multipart field by name.
    pub fn part(&self, name: &str) -> Option<&PartValue> {
        match &self.body {
            RequestBody::Multipart(parts) => {
                parts.iter().find(|p| p.name == name).map(|p| &p.value)
            }
            _ => None,
        }
    }
}

/// Executes `request` and parses the response envelope.
///
/// Transport failures and bodies that are not a JSON envelope both become
/// [`ClientError::Network`]. A nonzero service code is *not* an error here;
/// callers decide what it means for their operation.
pub(crate) fn send<E: RequestExecutor + ?Sized>(
    executor: &mut E,
    request: ApiRequest,
) -> Result<ApiResponse, ClientError> {
    let body = executor
        .execute(request)
        .map_err(|e| ClientError::Network(e.to_string()))?;
    let resp = ApiResponse::from_slice(&body)
        .map_err(|e| ClientError::Network(format!("unparseable response body: {e}")))?;
    debug!(
        code = resp.code,
        message = %resp.message,
        data = resp.data.as_ref().map(|d| d.get()).unwrap_or(""),
        "response"
    );
    Ok(resp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExecutor;

    #[test]
    fn multipart_request_carries_authorization() {
        let ep = Endpoint::new("http://x/1/b/a", "sig");
        let req = ApiRequest::multipart(&ep, vec![FormPart::text("op", "upload")]);
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.header("authorization"), Some("sig"));
        assert_eq!(req.text_part("op"), Some("upload"));
        assert!(req.part("missing").is_none());
    }

    #[test]
    fn json_request_sets_content_type() {
        let req = ApiRequest::json("http://x", "sig", "{}".into());
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert!(req.text_part("op").is_none());
    }

    #[test]
    fn send_parses_envelope() {
        let mut exec = MockExecutor::new();
        exec.push_json(r#"{"code":0,"message":"SUCCESS"}"#);
        let resp = send(&mut exec, ApiRequest::get("http://x", "sig")).unwrap();
        assert!(resp.is_success());
        assert_eq!(exec.request_count(), 1);
    }

    #[test]
    fn send_maps_garbage_to_network_error() {
        let mut exec = MockExecutor::new();
        exec.push_raw(b"<html>bad gateway</html>".to_vec());
        let err = send(&mut exec, ApiRequest::get("http://x", "sig")).unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[test]
    fn send_maps_transport_failure_to_network_error() {
        let mut exec = MockExecutor::new();
        exec.push_transport_error("connection reset");
        let err = send(&mut exec, ApiRequest::get("http://x", "sig")).unwrap_err();
        assert!(matches!(err, ClientError::Network(m) if m.contains("connection reset")));
    }

    #[test]
    fn send_keeps_nonzero_code_as_response() {
        let mut exec = MockExecutor::new();
        exec.push_json(r#"{"code":-133,"message":"ERROR_CMD_BUCKET_NOTEXIST"}"#);
        let resp = send(&mut exec, ApiRequest::get("http://x", "sig")).unwrap();
        assert_eq!(resp.code, -133);
    }
}
