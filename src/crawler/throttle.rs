//! Politeness throttle
//!
//! Exactly one request is in flight at any time; this throttle controls the
//! gap between consecutive requests. The gap is the configured base delay
//! with uniform jitter in [0.5x, 1.5x], further widened by an adaptive
//! component that tracks observed response latency, clamped between the
//! configured floor and ceiling.

use crate::config::FetchConfig;
use std::time::Duration;

pub struct Throttle {
    base: Duration,
    min: Duration,
    max: Duration,

    /// Smoothed latency-driven delay, starts at the floor
    adaptive: Duration,
}

impl Throttle {
    pub fn new(config: &FetchConfig) -> Self {
        let min = Duration::from_millis(config.min_delay_ms);
        Self {
            base: Duration::from_millis(config.base_delay_ms),
            min,
            max: Duration::from_millis(config.max_delay_ms),
            adaptive: min,
        }
    }

    /// Computes the next inter-request delay
    ///
    /// The jittered base delay and the adaptive delay compete; the larger
    /// wins, clamped to the configured ceiling.
    pub fn next_delay(&self) -> Duration {
        let jitter = 0.5 + fastrand::f64(); // 0.5x..1.5x
        let jittered = self.base.mul_f64(jitter);
        jittered.max(self.adaptive).min(self.max)
    }

    /// Sleeps for the next inter-request delay
    pub async fn wait(&self) {
        tokio::time::sleep(self.next_delay()).await;
    }

    /// Folds an observed response latency into the adaptive delay
    ///
    /// A slow server pushes the delay up; fast responses let it decay back
    /// toward the floor. The result always stays within [floor, ceiling].
    pub fn observe_latency(&mut self, latency: Duration) {
        let blended = (self.adaptive + latency) / 2;
        self.adaptive = blended.clamp(self.min, self.max);
    }

    #[cfg(test)]
    pub fn adaptive_delay(&self) -> Duration {
        self.adaptive
    }
}
