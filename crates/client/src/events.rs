//! Upload progress events.

use std::sync::mpsc::Sender;

use serde::Serialize;

/// State of one slice-upload attempt.
///
/// `NotStarted → Negotiating → (Deduplicated | Transferring → Completed | Failed)`.
/// Only `Negotiating` and `Transferring` perform I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadPhase {
    NotStarted,
    Negotiating,
    Deduplicated,
    Transferring,
    Completed,
    Failed,
}

/// Events emitted while an upload runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum UploadEvent {
    Phase {
        phase: UploadPhase,
    },
    /// The service opened (or continued) a session. Persist `session_id`
    /// to resume after a failure.
    Negotiated {
        session_id: String,
        slice_size: u64,
        resume_offset: u64,
        file_size: u64,
    },
    /// `transferred` counts bytes acknowledged in this run plus the resume
    /// offset; `total` is the file size.
    SliceAcknowledged {
        offset: u64,
        bytes: u64,
        transferred: u64,
        total: u64,
    },
    Completed {
        resource_url: Option<String>,
    },
    Failed {
        code: i32,
        message: String,
    },
}

/// Sends `event` if an observer is attached. A dropped receiver is ignored.
pub(crate) fn emit(events: Option<&Sender<UploadEvent>>, event: UploadEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}
