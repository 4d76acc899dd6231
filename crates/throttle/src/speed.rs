use std::ops::{AddAssign, SubAssign};
use std::time::Duration;

/// One transfer's progress: wall-clock duration and bytes moved.
///
/// Values add when transfers join an aggregate and subtract when a
/// transfer refreshes or withdraws its contribution. Subtraction must
/// never underflow — an underflow means the caller paired mismatched
/// contributions. Debug builds assert on it; release builds clamp to
/// zero.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SpeedInfo {
    /// Time spent transferring.
    pub duration: Duration,
    /// Bytes transferred.
    pub bytes: i64,
}

impl SpeedInfo {
    /// Creates a progress record.
    #[must_use]
    pub const fn new(duration: Duration, bytes: i64) -> Self {
        Self { duration, bytes }
    }

    /// Average transfer rate in bytes per second.
    ///
    /// A zero duration reports the byte count itself, so a transfer that
    /// has not accumulated measurable time yet never divides by zero.
    #[must_use]
    pub fn speed(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs == 0.0 {
            self.bytes as f64
        } else {
            self.bytes as f64 / secs
        }
    }
}

impl AddAssign for SpeedInfo {
    fn add_assign(&mut self, rhs: Self) {
        self.duration = self.duration.saturating_add(rhs.duration);
        self.bytes = self.bytes.saturating_add(rhs.bytes);
    }
}

impl SubAssign for SpeedInfo {
    fn sub_assign(&mut self, rhs: Self) {
        debug_assert!(
            self.duration >= rhs.duration && self.bytes >= rhs.bytes,
            "speed aggregate underflow: mismatched update/clear pairing"
        );
        self.duration = self.duration.saturating_sub(rhs.duration);
        self.bytes = (self.bytes - rhs.bytes).max(0);
    }
}
