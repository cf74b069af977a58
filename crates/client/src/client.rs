//! Client facade: signing, URL building and operation dispatch.

use std::path::Path;
use std::sync::mpsc::Sender;

use cosapi_auth::{AppSigner, Signer};
use cosapi_protocol::UploadOutcome;
use cosapi_transfer::ContentHasher;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::UploadEvent;
use crate::executor::{Endpoint, RequestExecutor};
use crate::http::{HttpExecutor, Transport};
use crate::orchestrator::{SliceOptions, UploadOrchestrator, check_readable};
use crate::path::{PathKind, validate_bucket, validate_remote_path};
use crate::simple::SimpleUploader;

/// Client for one account.
///
/// Owns its executor exclusively, so one client runs one operation at a
/// time. Create one client per thread for parallel uploads.
pub struct CosClient<E: RequestExecutor = HttpExecutor> {
    pub(crate) config: ClientConfig,
    pub(crate) signer: Box<dyn Signer>,
    pub(crate) executor: E,
    hasher: ContentHasher,
    events: Option<Sender<UploadEvent>>,
}

impl CosClient<HttpExecutor> {
    /// Creates a client using an executor from `transport`.
    pub fn connect(transport: &Transport, config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_executor(config, transport.executor())
    }
}

impl<E: RequestExecutor> CosClient<E> {
    /// Creates a client signing with the configured credentials.
    pub fn with_executor(config: ClientConfig, executor: E) -> Result<Self, ClientError> {
        let signer = AppSigner::new(config.credentials()?);
        Ok(Self {
            config,
            signer: Box::new(signer),
            executor,
            hasher: ContentHasher::default(),
            events: None,
        })
    }

    /// Replaces the signer.
    pub fn with_signer(mut self, signer: Box<dyn Signer>) -> Self {
        self.signer = signer;
        self
    }

    /// Reports upload progress to `events`.
    pub fn with_events(mut self, events: Sender<UploadEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// URL of `path` inside `bucket`, after validating both.
    pub fn resource_url(&self, bucket: &str, path: &str) -> Result<String, ClientError> {
        validate_bucket(bucket)?;
        validate_remote_path(path, PathKind::Any)?;
        Ok(self.config.resource_url(bucket, path))
    }

    /// Endpoint authorized with a multi-use signature.
    pub(crate) fn multi_use_endpoint(
        &self,
        bucket: &str,
        path: &str,
        kind: PathKind,
    ) -> Result<Endpoint, ClientError> {
        validate_bucket(bucket)?;
        validate_remote_path(path, kind)?;
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let expiry = now + self.config.sign_expiry_secs;
        let authorization = self.signer.sign_more(bucket, expiry)?;
        Ok(Endpoint::new(self.config.resource_url(bucket, path), authorization))
    }

    /// Endpoint authorized with a single-use signature bound to `path`.
    pub(crate) fn single_use_endpoint(
        &self,
        bucket: &str,
        path: &str,
    ) -> Result<Endpoint, ClientError> {
        validate_bucket(bucket)?;
        validate_remote_path(path, PathKind::Any)?;
        let authorization = self.signer.sign_once(bucket, path)?;
        Ok(Endpoint::new(self.config.resource_url(bucket, path), authorization))
    }

    /// Uploads `src` to `bucket`/`dst` in one request.
    pub fn upload(
        &mut self,
        src: &Path,
        bucket: &str,
        dst: &str,
        biz_attr: Option<&str>,
    ) -> UploadOutcome {
        if let Err(e) = check_readable(src) {
            return e.into_outcome();
        }
        let endpoint = match self.multi_use_endpoint(bucket, dst, PathKind::File) {
            Ok(endpoint) => endpoint,
            Err(e) => return e.into_outcome(),
        };
        SimpleUploader::new(&mut self.executor, &endpoint, &self.hasher).upload(src, biz_attr)
    }

    /// Uploads `src` to `bucket`/`dst` through a resumable slice session.
    ///
    /// Without `options.slice_size` the configured slice size is requested.
    pub fn upload_slice(
        &mut self,
        src: &Path,
        bucket: &str,
        dst: &str,
        options: &SliceOptions,
    ) -> UploadOutcome {
        if let Err(e) = check_readable(src) {
            return e.into_outcome();
        }
        let endpoint = match self.multi_use_endpoint(bucket, dst, PathKind::File) {
            Ok(endpoint) => endpoint,
            Err(e) => return e.into_outcome(),
        };
        let options = SliceOptions {
            slice_size: options.slice_size.or(Some(self.config.slice_size)),
            ..options.clone()
        };
        UploadOrchestrator::new(&mut self.executor, &endpoint, &self.hasher)
            .with_events(self.events.as_ref())
            .upload_large(src, &options)
    }

    /// Uses a slice upload for files of at least `slice_threshold` bytes,
    /// a simple upload otherwise.
    pub fn upload_auto(
        &mut self,
        src: &Path,
        bucket: &str,
        dst: &str,
        biz_attr: Option<&str>,
    ) -> UploadOutcome {
        let len = match check_readable(src) {
            Ok(len) => len,
            Err(e) => return e.into_outcome(),
        };
        if len < self.config.slice_threshold {
            debug!(len, threshold = self.config.slice_threshold, "simple upload");
            self.upload(src, bucket, dst, biz_attr)
        } else {
            debug!(len, threshold = self.config.slice_threshold, "slice upload");
            let options = SliceOptions {
                biz_attr: biz_attr.map(str::to_string),
                ..SliceOptions::default()
            };
            self.upload_slice(src, bucket, dst, &options)
        }
    }
}
