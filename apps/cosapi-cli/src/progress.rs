//! Logs upload events with a running transfer rate.

use std::sync::mpsc::Receiver;
use std::thread::{self, JoinHandle};

use cosapi_client::UploadEvent;
use cosapi_transfer::TransferRate;

/// Spawns a thread that logs every event until the sender is dropped.
pub fn spawn_reporter(events: Receiver<UploadEvent>) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut rate = TransferRate::default();
        for event in events {
            report(&event, &mut rate);
        }
    })
}

/// Waits for the reporter to drain. Returns `false` (after logging) if it
/// panicked.
pub fn finish(reporter: JoinHandle<()>) -> bool {
    match reporter.join() {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("progress reporter panicked");
            false
        }
    }
}

fn report(event: &UploadEvent, rate: &mut TransferRate) {
    match event {
        UploadEvent::Phase { phase } => tracing::debug!(?phase, "phase"),
        UploadEvent::Negotiated {
            session_id,
            slice_size,
            resume_offset,
            file_size,
        } => {
            rate.start(*resume_offset);
            tracing::info!(
                session = %session_id,
                slice_size,
                resume_offset,
                file_size,
                "session negotiated"
            );
        }
        UploadEvent::SliceAcknowledged {
            offset,
            bytes,
            transferred,
            total,
        } => {
            rate.acknowledge(*transferred);
            let eta = rate
                .eta(*total)
                .map(|d| format!("{}s", d.as_secs()))
                .unwrap_or_else(|| "-".into());
            tracing::info!(
                offset,
                bytes,
                progress = %percent(*transferred, *total),
                rate = %format_rate(rate.bytes_per_second()),
                eta = %eta,
                "slice acknowledged"
            );
        }
        UploadEvent::Completed { resource_url } => tracing::info!(
            resource_url = resource_url.as_deref().unwrap_or(""),
            "upload complete"
        ),
        UploadEvent::Failed { code, message } => {
            tracing::warn!(code, message = %message, "upload failed")
        }
    }
}

fn percent(done: u64, total: u64) -> String {
    if total == 0 {
        return "100%".into();
    }
    format!("{:.1}%", done as f64 * 100.0 / total as f64)
}

/// Formats a byte rate with a binary unit.
fn format_rate(bytes_per_second: f64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KiB/s", "MiB/s", "GiB/s"];
    let mut value = bytes_per_second;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
