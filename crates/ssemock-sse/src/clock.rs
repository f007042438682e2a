//! Pacing clocks.
//!
//! Scripts never call `tokio::time::sleep` directly; every pause goes through
//! a [`Clock`] so the same script can run in real time or instantly.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

/// A boxed future that completes when a pause is over.
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Source of pacing delays for scripted streams.
pub trait Clock: fmt::Debug + Send + Sync {
    /// Returns a future that resolves once `duration` has elapsed.
    fn sleep(&self, duration: Duration) -> Sleep;
}

/// Real-time clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn sleep(&self, duration: Duration) -> Sleep {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Clock whose pauses complete immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantClock;

impl Clock for InstantClock {
    fn sleep(&self, _duration: Duration) -> Sleep {
        Box::pin(std::future::ready(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_tokio_clock_waits_for_duration() {
        let start = Instant::now();
        TokioClock.sleep(Duration::from_millis(100)).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(100));
        assert!(elapsed < Duration::from_millis(110));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_clock_does_not_advance_time() {
        let start = Instant::now();
        InstantClock.sleep(Duration::from_secs(60)).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
