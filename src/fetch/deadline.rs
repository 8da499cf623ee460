//! Shared batch deadline and the read-only cancellation signal handed to tasks.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Read-only view of the batch cancellation token
///
/// Tasks can observe cancellation but have no way to trigger it; only the
/// deadline timer cancels the underlying token.
#[derive(Clone, Debug)]
pub struct CancellationSignal {
    token: CancellationToken,
}

impl CancellationSignal {
    /// Returns true once the deadline has elapsed
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves when the deadline elapses
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

/// A single deadline shared by every request of one batch
///
/// Arming the deadline spawns a timer that cancels the shared token exactly
/// once. Dropping the deadline aborts the timer, so nothing outlives the batch.
#[derive(Debug)]
pub struct BatchDeadline {
    duration: Duration,
    started: Instant,
    token: CancellationToken,
    timer: JoinHandle<()>,
}

impl BatchDeadline {
    /// Start the clock. Must be called from within a tokio runtime.
    pub fn arm(duration: Duration) -> Self {
        let started = Instant::now();
        let token = CancellationToken::new();
        let timer_token = token.clone();

        let timer = tokio::spawn(async move {
            tokio::time::sleep_until(started + duration).await;
            tracing::debug!(
                deadline_ms = duration.as_millis() as u64,
                "Batch deadline elapsed, cancelling in-flight requests"
            );
            timer_token.cancel();
        });

        Self {
            duration,
            started,
            token,
            timer,
        }
    }

    /// Signal to hand to fetch tasks
    pub fn signal(&self) -> CancellationSignal {
        CancellationSignal {
            token: self.token.clone(),
        }
    }

    /// The configured deadline
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Time since the deadline was armed
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Resolves when the deadline fires
    pub async fn expired(&self) {
        self.token.cancelled().await
    }
}

impl Drop for BatchDeadline {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
