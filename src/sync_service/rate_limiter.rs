use std::time::Duration;

///
/// Paces upstream calls: every `every` ticks, sleeps for `pause` and starts counting again.
/// Owned by a single synchronization run.
///
pub struct RateLimiter {
    every: usize,
    pause: Duration,
    count: usize,
    pauses: usize,
}

impl RateLimiter {
    /// An `every` of zero disables pausing
    pub fn new(every: usize, pause: Duration) -> Self {
        Self { every, pause, count: 0, pauses: 0 }
    }

    ///
    /// Records one processed unit of work, pausing if the batch is full.
    /// Returns whether a pause was taken.
    ///
    pub async fn tick(&mut self) -> bool {
        self.count += 1;
        if self.every == 0 || self.count < self.every {
            return false;
        }

        tokio::time::sleep(self.pause).await;
        self.count = 0;
        self.pauses += 1;
        true
    }

    pub fn pauses(&self) -> usize {
        self.pauses
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::Instant;

    use super::RateLimiter;

    #[tokio::test(start_paused = true)]
    async fn test_pauses_after_every_tenth_tick() {
        let mut limiter = RateLimiter::new(10, Duration::from_secs(1));
        let start = Instant::now();

        let mut paused_at = Vec::new();
        for i in 1..=25 {
            if limiter.tick().await {
                paused_at.push(i);
            }
        }

        assert_eq!(paused_at, vec![10, 20]);
        assert_eq!(limiter.pauses(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_batch_never_pauses() {
        let mut limiter = RateLimiter::new(0, Duration::from_secs(1));
        for _ in 0..30 {
            assert!(!limiter.tick().await);
        }
        assert_eq!(limiter.pauses(), 0);
    }
}
