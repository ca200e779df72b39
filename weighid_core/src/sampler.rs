//! Background sensor sampling.
//!
//! Spawns a thread that owns the `Scale` and forwards every reading through a
//! bounded channel, tracking the last-ok timestamp for the stall watchdog.
//! Paced and event-driven variants are provided.
//!
//! Each `Sampler` owns exactly one thread, which is shut down and joined
//! when the `Sampler` is dropped.
use crossbeam_channel as xch;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use weighid_traits::Scale;
use weighid_traits::clock::Clock;

use crate::error::DetectorError;
use crate::hw_error::map_hw_error;

/// Readings buffered between the sampling thread and the consumer.
const CHANNEL_CAPACITY: usize = 64;
/// How often a blocked send re-checks the shutdown flag.
const SEND_RETRY: Duration = Duration::from_millis(10);

/// Consecutive failed reads; only the first of a streak is worth a warning.
#[derive(Debug, Default)]
struct FailureStreak {
    count: u64,
}

impl FailureStreak {
    /// Record a failure; true when it starts a new streak.
    fn fail(&mut self) -> bool {
        self.count += 1;
        self.count == 1
    }

    /// Record a success; returns the length of the streak it ended, if any.
    fn recover(&mut self) -> Option<u64> {
        match std::mem::take(&mut self.count) {
            0 => None,
            n => Some(n),
        }
    }
}

/// Result of waiting for the next reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Value(f32),
    /// Nothing arrived within the wait.
    Pending,
    /// The sampling thread has finished (scale exhausted or gone).
    Closed,
}

pub struct Sampler {
    rx: xch::Receiver<f32>,
    last_ok: Arc<AtomicU64>,
    epoch: Instant,
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Sampler {
    /// Rate-paced sampler: one read every `1/hz` seconds.
    pub fn spawn<S: Scale + Send + 'static, C: Clock + Send + Sync + 'static>(
        scale: S,
        hz: u32,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let period = Duration::from_micros(crate::util::period_us(hz));
        Self::start(scale, Some(period), timeout, clock)
    }

    /// Event-driven sampler: relies on `scale.read(timeout)` blocking until
    /// data is ready. The only sleep is a short backoff after a failed read.
    pub fn spawn_event<S: Scale + Send + 'static, C: Clock + Send + Sync + 'static>(
        scale: S,
        timeout: Duration,
        clock: C,
    ) -> Self {
        Self::start(scale, None, timeout, clock)
    }

    fn start<S: Scale + Send + 'static, C: Clock + Send + Sync + 'static>(
        mut scale: S,
        period: Option<Duration>,
        timeout: Duration,
        clock: C,
    ) -> Self {
        let (tx, rx) = xch::bounded(CHANNEL_CAPACITY);
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let last_ok = Arc::new(AtomicU64::new(0));
        let last_ok_clone = last_ok.clone();
        let epoch = clock.now();

        let join_handle = std::thread::spawn(move || {
            let mut failures = FailureStreak::default();
            'sampling: loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    tracing::debug!("sampler thread received shutdown signal");
                    break;
                }

                match scale.read(timeout) {
                    Ok(v) => {
                        let mut pending = v;
                        loop {
                            match tx.send_timeout(pending, SEND_RETRY) {
                                Ok(()) => break,
                                Err(xch::SendTimeoutError::Timeout(v)) => {
                                    if shutdown_clone.load(Ordering::Relaxed) {
                                        break 'sampling;
                                    }
                                    pending = v;
                                }
                                Err(xch::SendTimeoutError::Disconnected(_)) => {
                                    tracing::debug!("sampler consumer disconnected, exiting thread");
                                    break 'sampling;
                                }
                            }
                        }
                        last_ok_clone.store(clock.ms_since(epoch), Ordering::Relaxed);
                        if let Some(failed) = failures.recover() {
                            tracing::info!(failed, "scale reads recovered");
                        }
                    }
                    Err(e) => match map_hw_error(&*e) {
                        DetectorError::EndOfStream => {
                            tracing::debug!("scale exhausted, closing sampler");
                            break;
                        }
                        other => {
                            // The consumer's stall watchdog decides when this is fatal.
                            if failures.fail() {
                                tracing::warn!(error = %other, "scale read failed");
                            } else {
                                tracing::debug!(error = %other, "scale read failed again");
                            }
                            // Backoff waits in real time, even under a simulated clock.
                            if period.is_none() {
                                std::thread::sleep(SEND_RETRY);
                            }
                        }
                    },
                }

                if let Some(period) = period {
                    if shutdown_clone.load(Ordering::Relaxed) {
                        break;
                    }
                    clock.sleep(period);
                }
            }
            tracing::trace!("sampler thread exiting cleanly");
        });

        Self {
            rx,
            last_ok,
            epoch,
            shutdown,
            join_handle: Some(join_handle),
        }
    }

    /// Wait up to `wait` for the next reading, in arrival order.
    pub fn next(&self, wait: Duration) -> Sample {
        match self.rx.recv_timeout(wait) {
            Ok(v) => Sample::Value(v),
            Err(xch::RecvTimeoutError::Timeout) => Sample::Pending,
            Err(xch::RecvTimeoutError::Disconnected) => Sample::Closed,
        }
    }

    /// Milliseconds since the last successful read, as seen by `clock`.
    pub fn stalled_for(&self, clock: &impl Clock) -> u64 {
        clock
            .ms_since(self.epoch)
            .saturating_sub(self.last_ok.load(Ordering::Relaxed))
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        // The thread exits between reads, after a blocking read returns, or
        // within SEND_RETRY when the channel is full.
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("sampler thread joined");
                }
                Err(e) => {
                    tracing::warn!(?e, "sampler thread panicked during shutdown");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_first_failure_of_a_streak_is_reported() {
        let mut f = FailureStreak::default();
        assert_eq!(f.recover(), None);
        assert!(f.fail());
        assert!(!f.fail());
        assert!(!f.fail());
        assert_eq!(f.recover(), Some(3));
        assert!(f.fail());
    }
}
