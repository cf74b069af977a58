//! Sequential slice transfer for a negotiated session.

use std::path::Path;
use std::sync::mpsc::Sender;

use cosapi_protocol::constants::{CODE_SUCCESS, Op};
use cosapi_protocol::{UploadOutcome, UploadSession};
use cosapi_transfer::{Slice, SliceReader};
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::events::{UploadEvent, emit};
use crate::executor::{self, ApiRequest, Endpoint, FormPart, RequestExecutor};

/// Uploads the slices of one session, strictly in order.
///
/// Stops at the first slice that fails and returns that call's outcome
/// unchanged; the session can then be resumed by negotiating again with
/// its id. Emits [`UploadEvent::SliceAcknowledged`] after each slice.
pub struct SliceTransferLoop<'a, E: RequestExecutor + ?Sized> {
    executor: &'a mut E,
    endpoint: &'a Endpoint,
    events: Option<&'a Sender<UploadEvent>>,
}

impl<'a, E: RequestExecutor + ?Sized> SliceTransferLoop<'a, E> {
    pub fn new(executor: &'a mut E, endpoint: &'a Endpoint) -> Self {
        Self {
            executor,
            endpoint,
            events: None,
        }
    }

    pub fn with_events(mut self, events: Option<&'a Sender<UploadEvent>>) -> Self {
        self.events = events;
        self
    }

    /// Sends every slice of `path` from the session's resume offset.
    ///
    /// Returns the outcome of the last slice call. When there is nothing
    /// to send (empty file, or resuming at the end) no request is issued
    /// and a success outcome without a resource URL is returned.
    pub fn run(&mut self, session: &UploadSession, path: &Path) -> UploadOutcome {
        let mut reader = match SliceReader::open(
            path,
            session.slice_size(),
            session.file_size(),
            session.resume_offset(),
        ) {
            Ok(reader) => reader,
            Err(e) => return ClientError::from(e).into_outcome(),
        };

        debug!(
            session = session.session_id(),
            slices = session.remaining_slices(),
            from = session.resume_offset(),
            "transferring slices"
        );

        let mut last = UploadOutcome {
            code: CODE_SUCCESS,
            message: "nothing to transfer".into(),
            resource_url: None,
            data: None,
        };

        loop {
            let slice = match reader.next_slice() {
                Ok(Some(slice)) => slice,
                Ok(None) => break,
                Err(e) => {
                    warn!(offset = reader.offset(), error = %e, "slice read failed");
                    return ClientError::from(e).into_outcome();
                }
            };

            let offset = slice.offset;
            let bytes = slice.len() as u64;
            last = self.send_slice(session, slice);
            if !last.is_success() {
                warn!(offset, code = last.code, message = %last.message, "slice rejected");
                return last;
            }

            emit(
                self.events,
                UploadEvent::SliceAcknowledged {
                    offset,
                    bytes,
                    transferred: (offset + bytes).min(session.file_size()),
                    total: session.file_size(),
                },
            );
        }

        last
    }

    fn send_slice(&mut self, session: &UploadSession, slice: Slice) -> UploadOutcome {
        debug!(offset = slice.offset, len = slice.len(), "sending slice");
        let parts = vec![
            FormPart::text("op", Op::UploadSlice.as_str()),
            FormPart::text("offset", slice.offset.to_string()),
            FormPart::text("session", session.session_id()),
            FormPart::bytes("filecontent", "data", slice.data),
        ];
        let request = ApiRequest::multipart(self.endpoint, parts);
        match executor::send(&mut *self.executor, request) {
            Ok(resp) => UploadOutcome::from_response(&resp),
            Err(e) => e.into_outcome(),
        }
    }
}
