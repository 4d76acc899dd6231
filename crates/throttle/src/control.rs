use std::time::{Duration, Instant};

use cfg::setting::SpeedLimit;
use thiserror::Error;

use crate::counter::{SpeedCounter, sleep_for_limit};
use crate::speed::SpeedInfo;

/// How long a transfer may stay under its minimum speed before being
/// kicked.
const MINIMUM_SPEED_KICK: Duration = Duration::from_secs(5);

/// A transfer stayed below its required minimum speed for too long.
#[derive(Clone, Copy, Debug, Error)]
#[error("transfer speed {actual:.1} KB/s stayed below the {minimum} KB/s minimum")]
pub struct MinimumSpeedError {
    /// The configured floor in KB/s.
    pub minimum: i64,
    /// The observed speed in KB/s.
    pub actual: f64,
}

/// Per-transfer pacing guard.
///
/// One `SpeedControl` lives for the duration of a single upload or
/// download. [`pace`](SpeedControl::pace) is called once per transferred
/// chunk with the transfer's cumulative progress; it enforces the user's
/// personal ceiling, the shared per-path limits, and the minimum-speed
/// floor. Dropping the guard withdraws the transfer's contribution from
/// the shared aggregates.
pub struct SpeedControl<'a> {
    minimum_speed: i64,
    maximum_speed: i64,
    limits: Vec<&'a SpeedLimit>,
    counter: &'a SpeedCounter,
    last_minimum_ok: Instant,
    last: Option<SpeedInfo>,
    sleep_fn: fn(Duration),
}

impl<'a> SpeedControl<'a> {
    /// Creates a guard for one transfer.
    ///
    /// `minimum_speed` and `maximum_speed` are the client's personal
    /// floor and ceiling in KB/s, zero disabling either; `limits` are
    /// the shared path limits binding this transfer (see
    /// `Config::download_limits_for`); `counter` is the direction's
    /// shared [`SpeedCounter`].
    #[must_use]
    pub fn new(
        minimum_speed: i64,
        maximum_speed: i64,
        limits: Vec<&'a SpeedLimit>,
        counter: &'a SpeedCounter,
    ) -> Self {
        Self {
            minimum_speed,
            maximum_speed,
            limits,
            counter,
            last_minimum_ok: Instant::now(),
            last: None,
            sleep_fn: std::thread::sleep,
        }
    }

    /// Replaces the sleep call so tests can observe requested pauses
    /// without blocking.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn with_sleep_fn(mut self, sleep_fn: fn(Duration)) -> Self {
        self.sleep_fn = sleep_fn;
        self
    }

    /// Applies pacing for the transfer's cumulative `progress`.
    ///
    /// Computes the binding constraint across the personal ceiling and
    /// every shared limit, then sleeps outside the counter's lock.
    ///
    /// # Errors
    ///
    /// [`MinimumSpeedError`] once the transfer has spent more than five
    /// seconds under the configured minimum speed.
    pub fn pace(&mut self, progress: SpeedInfo) -> Result<(), MinimumSpeedError> {
        if self.minimum_speed == 0 && self.maximum_speed == 0 && self.limits.is_empty() {
            return Ok(());
        }

        if self.minimum_speed > 0 {
            self.check_minimum(progress.speed() / 1024.0)?;
        }

        let mut sleep = Duration::ZERO;
        if self.maximum_speed > 0 {
            sleep = sleep_for_limit(progress.duration, progress.bytes, self.maximum_speed * 1024);
        }
        if !self.limits.is_empty() {
            sleep = sleep.max(self.counter.update(self.last, progress, &self.limits));
        }

        if !sleep.is_zero() {
            (self.sleep_fn)(sleep);
        }
        self.last = Some(progress);
        Ok(())
    }

    fn check_minimum(&mut self, speed_kb: f64) -> Result<(), MinimumSpeedError> {
        let now = Instant::now();
        if speed_kb > self.minimum_speed as f64 {
            self.last_minimum_ok = now;
        } else if now.duration_since(self.last_minimum_ok) > MINIMUM_SPEED_KICK {
            return Err(MinimumSpeedError {
                minimum: self.minimum_speed,
                actual: speed_kb,
            });
        }
        Ok(())
    }
}

impl Drop for SpeedControl<'_> {
    fn drop(&mut self) {
        self.counter.clear(self.last, &self.limits);
    }
}

#[cfg(test)]
mod tests {
    use super::SpeedControl;
    use crate::counter::SpeedCounter;
    use crate::speed::SpeedInfo;
    use acl::Acl;
    use cfg::setting::SpeedLimit;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    static RECORDED_MICROS: AtomicU64 = AtomicU64::new(0);

    fn record_sleep(duration: Duration) {
        RECORDED_MICROS.fetch_add(duration.as_micros() as u64, Ordering::SeqCst);
    }

    fn counter() -> SpeedCounter {
        SpeedCounter::new(|limit| limit.dl_limit() * 1024)
    }

    #[test]
    fn unlimited_transfer_never_sleeps() {
        let counter = counter();
        let mut control = SpeedControl::new(0, 0, Vec::new(), &counter).with_sleep_fn(record_sleep);
        let before = RECORDED_MICROS.load(Ordering::SeqCst);
        control
            .pace(SpeedInfo::new(Duration::ZERO, i64::MAX / 2))
            .expect("no minimum configured");
        assert_eq!(RECORDED_MICROS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn personal_ceiling_requests_a_sleep() {
        let counter = counter();
        // 1 KB/s ceiling, 100 KiB transferred instantly
        let mut control = SpeedControl::new(0, 1, Vec::new(), &counter).with_sleep_fn(record_sleep);
        let before = RECORDED_MICROS.load(Ordering::SeqCst);
        control
            .pace(SpeedInfo::new(Duration::ZERO, 100 * 1024))
            .expect("no minimum configured");
        assert!(RECORDED_MICROS.load(Ordering::SeqCst) > before);
    }

    #[test]
    fn drop_unregisters_from_shared_limits() {
        let counter = counter();
        let limit = SpeedLimit::new("/x/*", 1, 1, Acl::permit_all());
        {
            let mut control =
                SpeedControl::new(0, 0, vec![&limit], &counter).with_sleep_fn(record_sleep);
            control
                .pace(SpeedInfo::new(Duration::from_secs(1), 10))
                .expect("no minimum configured");
            assert_eq!(counter.len(), 1);
        }
        assert!(counter.is_empty());
    }

    #[test]
    fn fast_transfer_passes_the_minimum_check() {
        let counter = counter();
        // 1 KB/s floor, transfer runs at ~10 KB/s
        let mut control = SpeedControl::new(1, 0, Vec::new(), &counter).with_sleep_fn(record_sleep);
        control
            .pace(SpeedInfo::new(Duration::from_secs(1), 10 * 1024))
            .expect("fast enough");
    }
}
