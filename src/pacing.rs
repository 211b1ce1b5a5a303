//! Human-like pacing between browser actions and catalog requests.
//!
//! All waits go through a [`Sleeper`] so the harvest loop can be driven in
//! tests without wall-clock delay.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::trace;

/// Something that can wait for a duration.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeper backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Randomized pause drawn uniformly from `[min, max]` seconds.
#[derive(Clone)]
pub struct Jitter {
    min_secs: f64,
    max_secs: f64,
    sleeper: Arc<dyn Sleeper>,
}

impl Jitter {
    /// Bounds are expected to be validated (`0 <= min <= max`) by configuration.
    pub fn new(min_secs: f64, max_secs: f64, sleeper: Arc<dyn Sleeper>) -> Self {
        Self {
            min_secs,
            max_secs,
            sleeper,
        }
    }

    /// Jitter backed by the tokio timer.
    pub fn with_tokio(min_secs: f64, max_secs: f64) -> Self {
        Self::new(min_secs, max_secs, Arc::new(TokioSleeper))
    }

    /// Draw a delay without sleeping.
    pub fn sample(&self) -> Duration {
        let secs = if self.max_secs > self.min_secs {
            rand::rng().random_range(self.min_secs..=self.max_secs)
        } else {
            self.min_secs
        };
        // Configuration rejects bounds a Duration cannot hold
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
    }

    /// Sleep for a random duration within the bounds.
    pub async fn pause(&self) {
        let delay = self.sample();
        trace!("Jitter pause {:?}", delay);
        self.sleeper.sleep(delay).await;
    }

    /// Sleep for a fixed duration through the same sleeper.
    pub async fn settle(&self, duration: Duration) {
        self.sleeper.sleep(duration).await;
    }
}

impl std::fmt::Debug for Jitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Jitter")
            .field("min_secs", &self.min_secs)
            .field("max_secs", &self.max_secs)
            .finish()
    }
}

/// Pick an integer uniformly from an inclusive range.
pub fn pick(range: RangeInclusive<i64>) -> i64 {
    rand::rng().random_range(range)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Mutex;

    /// Sleeper that records requested durations and returns immediately.
    #[derive(Default)]
    pub struct RecordingSleeper {
        pub calls: Mutex<Vec<Duration>>,
    }

    impl RecordingSleeper {
        pub fn count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Sleeper for RecordingSleeper {
        async fn sleep(&self, duration: Duration) {
            self.calls.lock().unwrap().push(duration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingSleeper;
    use super::*;

    #[test]
    fn test_sample_stays_within_bounds() {
        let jitter = Jitter::with_tokio(0.8, 1.8);
        for _ in 0..200 {
            let d = jitter.sample();
            assert!(d >= Duration::from_secs_f64(0.8));
            assert!(d <= Duration::from_secs_f64(1.8));
        }
    }

    #[test]
    fn test_sample_with_equal_bounds_is_fixed() {
        let jitter = Jitter::with_tokio(0.5, 0.5);
        assert_eq!(jitter.sample(), Duration::from_millis(500));
    }

    #[test]
    fn test_sample_with_unrepresentable_bounds_does_not_panic() {
        let jitter = Jitter::with_tokio(1e20, 1e20);
        assert_eq!(jitter.sample(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_pause_and_settle_go_through_sleeper() {
        let sleeper = Arc::new(RecordingSleeper::default());
        let jitter = Jitter::new(0.0, 0.0, sleeper.clone());

        jitter.pause().await;
        jitter.settle(Duration::from_secs(4)).await;

        let calls = sleeper.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![Duration::ZERO, Duration::from_secs(4)]);
    }

    #[test]
    fn test_pick_in_range() {
        for _ in 0..100 {
            let v = pick(1800..=2600);
            assert!((1800..=2600).contains(&v));
        }
    }
}
