use log::{debug, trace};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

/// Source of the current time in whole Unix seconds.
pub trait Timer {
    fn timestamp(&self) -> u64;
}

/// Wall clock sampled once per second.
///
/// Reads are a single atomic load, the `run` task refreshes the value.
pub struct SystemTimer {
    seconds: AtomicU64,
    cancellation_token: CancellationToken,
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}

impl SystemTimer {
    pub fn new(cancellation_token: CancellationToken) -> Self {
        debug!("Creating system timer");
        SystemTimer {
            seconds: AtomicU64::new(unix_now()),
            cancellation_token,
        }
    }

    pub async fn run(&self) {
        let start = Instant::now();
        let mut interval = interval_at(start, Duration::from_secs(1));
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.seconds.store(unix_now(), Ordering::Release);
                    trace!("Server tick: {}", self.timestamp());
                }
                _ = self.cancellation_token.cancelled() => {
                    debug!("Timer cancelled");
                    return;
                }
            }
        }
    }
}

impl Timer for SystemTimer {
    fn timestamp(&self) -> u64 {
        self.seconds.load(Ordering::Acquire)
    }
}
