use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

/// Process-wide pacing for provider calls.
///
/// Guarantees at least `interval` between the moments successive `wait()`
/// calls return, across every batch that shares this throttle. Waiters
/// queue on the mutex, so pacing holds under concurrency too. Uses the tokio
/// clock, which tests can pause and advance.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_call: Mutex::new(None),
        }
    }

    /// Sleep until the next call is allowed, then claim the slot.
    pub async fn wait(&self) {
        let mut last_call = self.last_call.lock().await;

        if let Some(last) = *last_call {
            let next_allowed = last + self.interval;
            if Instant::now() < next_allowed {
                debug!("Throttling provider call for {:?}", next_allowed - Instant::now());
                sleep_until(next_allowed).await;
            }
        }

        *last_call = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_passes_immediately() {
        let throttle = Throttle::new(Duration::from_millis(200));
        let start = Instant::now();

        throttle.wait().await;

        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_consecutive_calls_are_spaced() {
        let throttle = Throttle::new(Duration::from_millis(200));
        let start = Instant::now();

        throttle.wait().await;
        throttle.wait().await;
        throttle.wait().await;

        assert!(Instant::now() - start >= Duration::from_millis(400));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_after_interval_elapsed() {
        let throttle = Throttle::new(Duration::from_millis(200));

        throttle.wait().await;
        tokio::time::advance(Duration::from_millis(500)).await;

        let before = Instant::now();
        throttle.wait().await;
        assert_eq!(Instant::now(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_wait_covers_only_remaining_time() {
        let throttle = Throttle::new(Duration::from_millis(200));

        throttle.wait().await;
        tokio::time::advance(Duration::from_millis(150)).await;

        let before = Instant::now();
        throttle.wait().await;
        assert_eq!(Instant::now() - before, Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shared_across_concurrent_waiters() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(100)));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                tokio::spawn(async move {
                    throttle.wait().await;
                    Instant::now()
                })
            })
            .collect();

        let mut finished = Vec::new();
        for handle in handles {
            finished.push(handle.await.expect("task should finish"));
        }
        finished.sort();

        for pair in finished.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(100));
        }
        assert!(*finished.last().unwrap() - start >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_never_waits() {
        let throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();

        for _ in 0..5 {
            throttle.wait().await;
        }

        assert_eq!(Instant::now(), start);
    }
}
