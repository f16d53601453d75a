use std::time::{Duration, Instant};

use backon::{BackoffBuilder, ExponentialBackoff, ExponentialBuilder};

/// Resettable exponential backoff used to pace per-target watch reconnects.\
/// Ported from the teacher's Kubernetes-API backoff policy: min 800ms, capped at a configurable
/// `max_delay` (the runtime expression of `DiscoveryConfig::retry_interval`, per `spec.md`
/// §4.2 step 3), with jitter and a self-reset after 120 seconds of not being consulted (so a
/// target that recovers and later fails again doesn't inherit a stale, maxed-out delay).
pub struct ResettableBackoff {
    backoff: ExponentialBackoff,
    builder: ExponentialBuilder,
    start_time: Instant,
}

impl ResettableBackoff {
    /// Builds a backoff capped at `max_delay` between per-target reconnect attempts.
    pub fn new(max_delay: Duration) -> Self {
        let min_delay = Duration::from_millis(800).min(max_delay);
        let builder = ExponentialBuilder::default()
            .with_min_delay(min_delay)
            .with_max_delay(max_delay)
            .with_factor(2.0)
            .without_max_times()
            .with_jitter();
        let backoff = builder.build();

        Self {
            backoff,
            builder,
            start_time: Instant::now(),
        }
    }

    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.start_time.elapsed().as_secs() > 120 {
            self.reset();
        }

        self.backoff.next()
    }

    pub fn reset(&mut self) {
        self.start_time = Instant::now();
        self.backoff = self.builder.build();
    }
}

impl Default for ResettableBackoff {
    /// Matches `DiscoveryConfig::default()`'s 30s `retry_interval`.
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}
