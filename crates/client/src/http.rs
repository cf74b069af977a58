//! Blocking HTTP transport.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::executor::{
    ApiRequest, FormPart, Method, PartValue, RequestBody, RequestExecutor, TransportError,
};

const CLIENT_USER_AGENT: &str = concat!("cosapi/", env!("CARGO_PKG_VERSION"));

/// Process-wide HTTP resources.
///
/// Build it once with [`Transport::initialize`] before any client is used,
/// and release it with [`Transport::shutdown`]. Executors handed out by
/// [`Transport::executor`] share its connection pool.
pub struct Transport {
    http: reqwest::blocking::Client,
}

impl Transport {
    /// Builds the shared connection pool with the configured timeout.
    pub fn initialize(config: &ClientConfig) -> Result<Self, TransportError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let http = reqwest::blocking::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout())
            .build()?;

        info!(
            timeout_secs = config.request_timeout_secs,
            endpoint = %config.endpoint,
            "transport initialized"
        );
        Ok(Self { http })
    }

    /// Returns a new executor backed by the shared pool.
    pub fn executor(&self) -> HttpExecutor {
        HttpExecutor {
            http: self.http.clone(),
        }
    }

    /// Releases the connection pool.
    pub fn shutdown(self) {
        drop(self.http);
        info!("transport shut down");
    }
}

/// [`RequestExecutor`] over `reqwest::blocking`.
///
/// The response body is returned whatever the HTTP status: the service
/// reports failures through the JSON envelope.
pub struct HttpExecutor {
    http: reqwest::blocking::Client,
}

impl HttpExecutor {
    fn build_form(parts: Vec<FormPart>) -> Result<Form, TransportError> {
        let mut form = Form::new();
        for part in parts {
            form = match part.value {
                PartValue::Text(value) => form.text(part.name, value),
                PartValue::Bytes { file_name, data } => {
                    form.part(part.name, Part::bytes(data).file_name(file_name))
                }
                PartValue::File(path) => form.file(part.name, path)?,
            };
        }
        Ok(form)
    }
}

impl RequestExecutor for HttpExecutor {
    fn execute(&mut self, request: ApiRequest) -> Result<Vec<u8>, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.http.get(&request.url),
            Method::Post => self.http.post(&request.url),
        };

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| TransportError::InvalidHeader(name.as_str().to_string()))?;
            builder = builder.header(name, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.body(body),
            RequestBody::Multipart(parts) => builder.multipart(Self::build_form(parts)?),
        };

        let resp = builder.send()?;
        let status = resp.status();
        let body = resp.bytes()?.to_vec();
        debug!(url = %request.url, status = status.as_u16(), len = body.len(), "request complete");
        Ok(body)
    }
}
