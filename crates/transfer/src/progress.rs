use std::collections::VecDeque;
use std::time::{Duration, Instant};

const DEFAULT_WINDOW: Duration = Duration::from_secs(10);

/// Transfer rate of one slice session over a sliding time window.
///
/// Fed with the acknowledged byte position after each slice, so a resumed
/// session only counts the bytes sent in this run.
#[derive(Debug)]
pub struct TransferRate {
    window: Duration,
    /// `(when, bytes acknowledged so far)`, oldest first.
    points: VecDeque<(Instant, u64)>,
}

impl Default for TransferRate {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

impl TransferRate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            points: VecDeque::new(),
        }
    }

    /// Begins a session whose first `resume_offset` bytes are already stored.
    pub fn start(&mut self, resume_offset: u64) {
        self.start_at(Instant::now(), resume_offset);
    }

    /// Records that the service has acknowledged `transferred` bytes.
    pub fn acknowledge(&mut self, transferred: u64) {
        self.acknowledge_at(Instant::now(), transferred);
    }

    fn start_at(&mut self, at: Instant, resume_offset: u64) {
        self.points.clear();
        self.points.push_back((at, resume_offset));
    }

    fn acknowledge_at(&mut self, at: Instant, transferred: u64) {
        self.points.push_back((at, transferred));
        if let Some(cutoff) = at.checked_sub(self.window) {
            while self.points.len() > 2 && self.points[0].0 < cutoff {
                self.points.pop_front();
            }
        }
    }

    /// Bytes per second across the window; 0.0 until two points exist.
    pub fn bytes_per_second(&self) -> f64 {
        let (Some(&(t0, b0)), Some(&(t1, b1))) = (self.points.front(), self.points.back()) else {
            return 0.0;
        };
        let elapsed = t1.saturating_duration_since(t0);
        if elapsed.is_zero() {
            return 0.0;
        }
        b1.saturating_sub(b0) as f64 / elapsed.as_secs_f64()
    }

    /// Estimated time until `total` bytes are acknowledged.
    pub fn eta(&self, total: u64) -> Option<Duration> {
        let rate = self.bytes_per_second();
        if rate <= 0.0 {
            return None;
        }
        let done = self.points.back().map_or(0, |&(_, b)| b);
        Some(Duration::from_secs_f64(total.saturating_sub(done) as f64 / rate))
    }
}
