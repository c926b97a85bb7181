use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Deadline and cancellation shared by one reconciliation run.
///
/// Checked before each scanned entry and before each catalog mutation.
#[derive(Debug, Clone, Default)]
pub struct RunBudget {
    deadline: Option<Instant>,
    cancelled: Arc<AtomicBool>,
}

impl RunBudget {
    /// No deadline, not cancelled
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Budget that runs out `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + timeout),
            ..Self::default()
        }
    }

    /// Budget from an optional timeout in seconds
    pub fn from_timeout_seconds(seconds: Option<u64>) -> Self {
        match seconds {
            Some(secs) => Self::with_timeout(Duration::from_secs(secs)),
            None => Self::unlimited(),
        }
    }

    /// Flag that cancels every clone of this budget when set
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether the run should stop doing work
    pub fn is_exhausted(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}
