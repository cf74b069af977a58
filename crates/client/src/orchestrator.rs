//! Resumable slice upload: check, hash, negotiate, transfer.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::mpsc::Sender;

use cosapi_protocol::constants::{MAX_SLICE_SIZE, MIN_SLICE_SIZE};
use cosapi_protocol::{UploadOutcome, UploadSession};
use cosapi_transfer::ContentHasher;
use tracing::{debug, info, warn};

use crate::error::ClientError;
use crate::events::{UploadEvent, UploadPhase, emit};
use crate::executor::{Endpoint, RequestExecutor};
use crate::negotiate::{NegotiationResult, PrepareRequest, UploadNegotiator};
use crate::slice_loop::SliceTransferLoop;

/// Caller choices for a slice upload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SliceOptions {
    pub biz_attr: Option<String>,
    /// Desired slice size; `None` or 0 lets the service choose.
    pub slice_size: Option<u64>,
    /// Session id of an interrupted attempt to resume.
    pub session: Option<String>,
}

/// Verifies `path` names a readable regular file and returns its length.
///
/// Runs before any network activity.
pub(crate) fn check_readable(path: &Path) -> Result<u64, ClientError> {
    let not_accessible = |source| ClientError::FileNotAccessible {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(not_accessible)?;
    let meta = file.metadata().map_err(not_accessible)?;
    if !meta.is_file() {
        return Err(not_accessible(io::Error::new(
            io::ErrorKind::InvalidInput,
            "not a regular file",
        )));
    }
    Ok(meta.len())
}

/// Normalizes a desired slice size: 0 means "service default".
pub(crate) fn validate_slice_size(desired: Option<u64>) -> Result<Option<u64>, ClientError> {
    match desired {
        None | Some(0) => Ok(None),
        Some(size) if (MIN_SLICE_SIZE..=MAX_SLICE_SIZE).contains(&size) => Ok(Some(size)),
        Some(size) => Err(ClientError::IllegalSliceSize(size)),
    }
}

/// Drives one slice upload through its states.
///
/// `NotStarted → Negotiating → (Deduplicated | Transferring → Completed | Failed)`.
/// The last negotiated session is kept so a failed transfer can be resumed
/// with [`UploadOrchestrator::last_session`].
pub struct UploadOrchestrator<'a, E: RequestExecutor + ?Sized> {
    executor: &'a mut E,
    endpoint: &'a Endpoint,
    hasher: &'a ContentHasher,
    events: Option<&'a Sender<UploadEvent>>,
    phase: UploadPhase,
    session: Option<UploadSession>,
}

impl<'a, E: RequestExecutor + ?Sized> UploadOrchestrator<'a, E> {
    pub fn new(executor: &'a mut E, endpoint: &'a Endpoint, hasher: &'a ContentHasher) -> Self {
        Self {
            executor,
            endpoint,
            hasher,
            events: None,
            phase: UploadPhase::NotStarted,
            session: None,
        }
    }

    pub fn with_events(mut self, events: Option<&'a Sender<UploadEvent>>) -> Self {
        self.events = events;
        self
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    /// Session negotiated by the most recent attempt, if any.
    pub fn last_session(&self) -> Option<&UploadSession> {
        self.session.as_ref()
    }

    /// Uploads `path` in slices, resuming `options.session` when given.
    pub fn upload_large(&mut self, path: &Path, options: &SliceOptions) -> UploadOutcome {
        self.phase = UploadPhase::NotStarted;
        self.session = None;

        if let Err(e) = check_readable(path) {
            return self.fail(e.into_outcome());
        }
        let slice_size = match validate_slice_size(options.slice_size) {
            Ok(size) => size,
            Err(e) => return self.fail(e.into_outcome()),
        };
        let digest = match self.hasher.hash(path) {
            Ok(digest) => digest,
            Err(e) => return self.fail(ClientError::from(e).into_outcome()),
        };

        self.set_phase(UploadPhase::Negotiating);
        let request = PrepareRequest {
            digest: &digest,
            biz_attr: options.biz_attr.as_deref(),
            session: options.session.as_deref(),
            slice_size,
        };
        let negotiated =
            UploadNegotiator::new(&mut *self.executor, self.endpoint).prepare(&request);

        let session = match negotiated {
            NegotiationResult::SessionStart { session } => session,
            NegotiationResult::DedupHit {
                resource_url,
                outcome,
            } => {
                self.set_phase(UploadPhase::Deduplicated);
                emit(
                    self.events,
                    UploadEvent::Completed {
                        resource_url: Some(resource_url),
                    },
                );
                return outcome;
            }
            NegotiationResult::Failed { code, message } => {
                return self.fail(UploadOutcome::failure(code, message));
            }
        };

        emit(
            self.events,
            UploadEvent::Negotiated {
                session_id: session.session_id().to_string(),
                slice_size: session.slice_size(),
                resume_offset: session.resume_offset(),
                file_size: session.file_size(),
            },
        );
        self.set_phase(UploadPhase::Transferring);

        let outcome = SliceTransferLoop::new(&mut *self.executor, self.endpoint)
            .with_events(self.events)
            .run(&session, path);
        self.session = Some(session);

        if !outcome.is_success() {
            return self.fail(outcome);
        }

        info!(
            resource_url = outcome.resource_url.as_deref().unwrap_or(""),
            "slice upload complete"
        );
        self.set_phase(UploadPhase::Completed);
        emit(
            self.events,
            UploadEvent::Completed {
                resource_url: outcome.resource_url.clone(),
            },
        );
        outcome
    }

    fn set_phase(&mut self, phase: UploadPhase) {
        debug!(from = ?self.phase, to = ?phase, "upload phase");
        self.phase = phase;
        emit(self.events, UploadEvent::Phase { phase });
    }

    fn fail(&mut self, outcome: UploadOutcome) -> UploadOutcome {
        warn!(code = outcome.code, message = %outcome.message, "slice upload failed");
        self.set_phase(UploadPhase::Failed);
        emit(
            self.events,
            UploadEvent::Failed {
                code: outcome.code,
                message: outcome.message.clone(),
            },
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockExecutor;
    use cosapi_protocol::constants::{
        CODE_FILE_NOT_EXISTS, CODE_ILLEGAL_SLICE_SIZE, CODE_MALFORMED_RESPONSE,
    };
    use cosapi_transfer::sha1_hex;
    use std::sync::mpsc;

    const MIB: u64 = 1024 * 1024;

    fn write_file(dir: &tempfile::TempDir, data: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join("big.bin");
        std::fs::write(&path, data).unwrap();
        path
    }

    fn endpoint() -> Endpoint {
        Endpoint::new("http://x/files/v1/1/b/big.bin", "sig")
    }

    #[test]
    fn validates_slice_size() {
        assert_eq!(validate_slice_size(None).unwrap(), None);
        assert_eq!(validate_slice_size(Some(0)).unwrap(), None);
        assert_eq!(validate_slice_size(Some(512 * 1024)).unwrap(), Some(512 * 1024));
        assert_eq!(validate_slice_size(Some(3 * MIB)).unwrap(), Some(3 * MIB));
        assert!(validate_slice_size(Some(512 * 1024 - 1)).is_err());
        assert!(validate_slice_size(Some(3 * MIB + 1)).is_err());
    }

    #[test]
    fn check_readable_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            check_readable(dir.path()),
            Err(ClientError::FileNotAccessible { .. })
        ));
    }

    #[test]
    fn full_pipeline_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..25 * MIB).map(|i| (i % 253) as u8).collect();
        let path = write_file(&dir, &data);

        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-1","offset":0,"slice_size":3145728}}"#,
        );
        exec.push_slice_acks(8);
        exec.push_json(r#"{"code":0,"message":"SUCCESS","data":{"url":"http://cdn/big.bin"}}"#);

        let ep = endpoint();
        let hasher = ContentHasher::default();
        let mut orch = UploadOrchestrator::new(&mut exec, &ep, &hasher);
        let outcome = orch.upload_large(&path, &SliceOptions::default());

        assert!(outcome.is_success());
        assert_eq!(outcome.resource_url.as_deref(), Some("http://cdn/big.bin"));
        assert_eq!(orch.phase(), UploadPhase::Completed);
        assert_eq!(orch.last_session().unwrap().session_id(), "s-1");

        let prepare = &exec.requests()[0];
        assert_eq!(prepare.text_part("sha"), Some(sha1_hex(&data).as_str()));
        assert_eq!(prepare.text_part("filesize"), Some("26214400"));
        assert_eq!(exec.request_count(), 10);
        let offsets = exec.slice_offsets();
        assert_eq!(offsets.len(), 9);
        assert_eq!(offsets[8], 25_165_824);
    }

    #[test]
    fn dedup_hit_sends_no_slices() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, b"already stored");

        let mut exec = MockExecutor::new();
        exec.push_json(r#"{"code":0,"message":"SUCCESS","data":{"url":"http://cdn/dup"}}"#);

        let ep = endpoint();
        let hasher = ContentHasher::default();
        let mut orch = UploadOrchestrator::new(&mut exec, &ep, &hasher);
        let outcome = orch.upload_large(&path, &SliceOptions::default());

        assert!(outcome.is_success());
        assert_eq!(outcome.resource_url.as_deref(), Some("http://cdn/dup"));
        assert_eq!(orch.phase(), UploadPhase::Deduplicated);
        assert!(orch.last_session().is_none());
        assert_eq!(exec.request_count(), 1);
        assert!(exec.slice_offsets().is_empty());
    }

    #[test]
    fn inaccessible_file_makes_no_network_call() {
        let mut exec = MockExecutor::new();
        let ep = endpoint();
        let hasher = ContentHasher::default();
        let mut orch = UploadOrchestrator::new(&mut exec, &ep, &hasher);
        let outcome = orch.upload_large(Path::new("/no/such/file.bin"), &SliceOptions::default());

        assert_eq!(outcome.code, CODE_FILE_NOT_EXISTS);
        assert_eq!(orch.phase(), UploadPhase::Failed);
        assert_eq!(exec.request_count(), 0);
    }

    #[test]
    fn illegal_slice_size_makes_no_network_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, b"content");

        let mut exec = MockExecutor::new();
        let ep = endpoint();
        let hasher = ContentHasher::default();
        let options = SliceOptions {
            slice_size: Some(4 * MIB),
            ..SliceOptions::default()
        };
        let outcome =
            UploadOrchestrator::new(&mut exec, &ep, &hasher).upload_large(&path, &options);

        assert_eq!(outcome.code, CODE_ILLEGAL_SLICE_SIZE);
        assert_eq!(exec.request_count(), 0);
    }

    #[test]
    fn resume_sends_session_and_starts_at_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, &[7u8; 10]);

        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-7","offset":8,"slice_size":4}}"#,
        );
        exec.push_slice_acks(1);

        let ep = endpoint();
        let hasher = ContentHasher::default();
        let options = SliceOptions {
            session: Some("s-7".into()),
            biz_attr: Some("tag".into()),
            ..SliceOptions::default()
        };
        let outcome =
            UploadOrchestrator::new(&mut exec, &ep, &hasher).upload_large(&path, &options);

        assert!(outcome.is_success());
        assert_eq!(exec.requests()[0].text_part("session"), Some("s-7"));
        assert_eq!(exec.requests()[0].text_part("biz_attr"), Some("tag"));
        assert_eq!(exec.slice_offsets(), vec![8]);
    }

    #[test]
    fn zero_negotiated_slice_size_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, b"content");

        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-1","offset":0,"slice_size":0}}"#,
        );

        let ep = endpoint();
        let hasher = ContentHasher::default();
        let outcome = UploadOrchestrator::new(&mut exec, &ep, &hasher)
            .upload_large(&path, &SliceOptions::default());

        assert_eq!(outcome.code, CODE_MALFORMED_RESPONSE);
        assert_eq!(exec.request_count(), 1);
    }

    #[test]
    fn failed_slice_keeps_session_for_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, &[1u8; 12]);

        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-3","offset":0,"slice_size":4}}"#,
        );
        exec.push_slice_acks(1);
        exec.push_json(r#"{"code":-96,"message":"ERROR_CMD_SLICE_FAIL"}"#);

        let ep = endpoint();
        let hasher = ContentHasher::default();
        let mut orch = UploadOrchestrator::new(&mut exec, &ep, &hasher);
        let outcome = orch.upload_large(&path, &SliceOptions::default());

        assert_eq!(outcome.code, -96);
        assert_eq!(outcome.message, "ERROR_CMD_SLICE_FAIL");
        assert_eq!(orch.phase(), UploadPhase::Failed);
        assert_eq!(orch.last_session().unwrap().session_id(), "s-3");
    }

    #[test]
    fn resumes_failed_upload_from_acknowledged_offset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, &[3u8; 12]);
        let ep = endpoint();
        let hasher = ContentHasher::default();

        // First attempt: slice 0 acknowledged, slice 4 rejected.
        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-9","offset":0,"slice_size":4}}"#,
        );
        exec.push_slice_acks(1);
        exec.push_json(r#"{"code":-96,"message":"ERROR_CMD_SLICE_FAIL"}"#);
        let session_id = {
            let mut orch = UploadOrchestrator::new(&mut exec, &ep, &hasher);
            assert_eq!(orch.upload_large(&path, &SliceOptions::default()).code, -96);
            orch.last_session().unwrap().session_id().to_string()
        };
        assert_eq!(exec.slice_offsets(), vec![0, 4]);

        // Second attempt: the service reports offset 4 for the same session.
        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-9","offset":4,"slice_size":4}}"#,
        );
        exec.push_slice_acks(1);
        exec.push_json(r#"{"code":0,"message":"SUCCESS","data":{"url":"http://cdn/big.bin"}}"#);
        let options = SliceOptions {
            session: Some(session_id),
            ..SliceOptions::default()
        };
        let outcome = {
            let mut orch = UploadOrchestrator::new(&mut exec, &ep, &hasher);
            let outcome = orch.upload_large(&path, &options);
            assert_eq!(orch.phase(), UploadPhase::Completed);
            outcome
        };

        assert!(outcome.is_success());
        assert_eq!(outcome.resource_url.as_deref(), Some("http://cdn/big.bin"));
        assert_eq!(exec.requests()[0].text_part("session"), Some("s-9"));
        assert_eq!(exec.slice_offsets(), vec![4, 8]);
    }

    #[test]
    fn emits_lifecycle_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, &[2u8; 6]);

        let mut exec = MockExecutor::new();
        exec.push_json(
            r#"{"code":0,"message":"SUCCESS","data":{"session":"s-1","offset":0,"slice_size":4}}"#,
        );
        exec.push_slice_acks(1);
        exec.push_json(r#"{"code":0,"message":"SUCCESS","data":{"url":"http://cdn/x"}}"#);

        let (tx, rx) = mpsc::channel();
        let ep = endpoint();
        let hasher = ContentHasher::default();
        UploadOrchestrator::new(&mut exec, &ep, &hasher)
            .with_events(Some(&tx))
            .upload_large(&path, &SliceOptions::default());
        drop(tx);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events.first(),
            Some(&UploadEvent::Phase {
                phase: UploadPhase::Negotiating
            })
        );
        assert!(events.contains(&UploadEvent::Negotiated {
            session_id: "s-1".into(),
            slice_size: 4,
            resume_offset: 0,
            file_size: 6,
        }));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, UploadEvent::SliceAcknowledged { .. }))
                .count(),
            2
        );
        assert_eq!(
            events.last(),
            Some(&UploadEvent::Completed {
                resource_url: Some("http://cdn/x".into())
            })
        );
    }
}
