use std::sync::{LazyLock, Mutex, PoisonError};
use std::time::Duration;

use cfg::setting::SpeedLimit;
use rustc_hash::FxHashMap;

use crate::speed::SpeedInfo;

/// Upper bound on a single pacing sleep.
///
/// Keeps the transfer loop responsive to limits and peers changing under
/// it; a transfer that is far over budget sleeps repeatedly rather than
/// once for a long stretch.
pub const MAX_PACING_SLEEP: Duration = Duration::from_millis(100);

/// Computes the pause needed to keep a transfer under a byte-rate
/// ceiling.
///
/// `elapsed` and `bytes` describe the work done so far; the result is
/// the shortfall between the minimum wall-clock time that much data is
/// allowed to take and the time actually spent, capped at
/// [`MAX_PACING_SLEEP`]. A ceiling of zero or less means unlimited.
#[must_use]
pub fn sleep_for_limit(elapsed: Duration, bytes: i64, limit_bytes_per_sec: i64) -> Duration {
    if limit_bytes_per_sec <= 0 || bytes <= 0 {
        return Duration::ZERO;
    }
    let required = Duration::from_secs_f64(bytes as f64 / limit_bytes_per_sec as f64);
    match required.checked_sub(elapsed) {
        Some(excess) if !excess.is_zero() => excess.min(MAX_PACING_SLEEP),
        _ => Duration::ZERO,
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    refs: u32,
    aggregate: SpeedInfo,
}

/// Shared per-path transfer aggregates enforcing cumulative rate caps.
///
/// Each configured [`SpeedLimit`] path pattern keys one slot holding a
/// reference count and the summed [`SpeedInfo`] of every registered
/// transfer. A single mutex guards the map; critical sections only
/// update the aggregates and compute sleep times — the sleeping itself
/// is the caller's job, outside the lock.
pub struct SpeedCounter {
    limit_for: fn(&SpeedLimit) -> i64,
    speeds: Mutex<FxHashMap<String, Slot>>,
}

impl SpeedCounter {
    /// Creates a counter; `limit_for` extracts the direction's ceiling
    /// in bytes per second from a limit.
    #[must_use]
    pub fn new(limit_for: fn(&SpeedLimit) -> i64) -> Self {
        Self {
            limit_for,
            speeds: Mutex::new(FxHashMap::default()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FxHashMap<String, Slot>> {
        self.speeds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds a transfer's progress into every matching limit's aggregate
    /// and returns how long the caller should sleep.
    ///
    /// With `last` absent this is a new registration: the slot's
    /// reference count grows and `current` joins the aggregate. With
    /// `last` present the previous contribution is replaced in place.
    /// For each limit the aggregate's byte total is measured against the
    /// ceiling over the averaged transfer window; the largest shortfall
    /// across limits — the tightest limit — wins, capped at
    /// [`MAX_PACING_SLEEP`] per call.
    #[must_use]
    pub fn update(
        &self,
        last: Option<SpeedInfo>,
        current: SpeedInfo,
        limits: &[&SpeedLimit],
    ) -> Duration {
        let mut sleep = Duration::ZERO;
        let mut speeds = self.lock();
        for limit in limits {
            let slot = speeds
                .entry(limit.path().to_owned())
                .and_modify(|slot| {
                    match last {
                        Some(last) => slot.aggregate -= last,
                        None => slot.refs += 1,
                    }
                    slot.aggregate += current;
                })
                .or_insert(Slot {
                    refs: 1,
                    aggregate: current,
                });

            let ceiling = (self.limit_for)(limit);
            if ceiling <= 0 {
                continue;
            }
            let window = slot.aggregate.duration / slot.refs;
            sleep = sleep.max(sleep_for_limit(window, slot.aggregate.bytes, ceiling));
        }
        sleep
    }

    /// Withdraws a transfer's final contribution from every matching
    /// limit and drops slots whose reference count reaches zero.
    pub fn clear(&self, last: Option<SpeedInfo>, limits: &[&SpeedLimit]) {
        let Some(last) = last else { return };
        let mut speeds = self.lock();
        for limit in limits {
            if let Some(slot) = speeds.get_mut(limit.path()) {
                slot.refs = slot.refs.saturating_sub(1);
                if slot.refs == 0 {
                    speeds.remove(limit.path());
                } else {
                    slot.aggregate -= last;
                }
            }
        }
    }

    /// Number of path slots currently registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no transfer is currently registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// The reference count and aggregate for a path slot.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn snapshot(&self, path: &str) -> Option<(u32, SpeedInfo)> {
        self.lock()
            .get(path)
            .map(|slot| (slot.refs, slot.aggregate))
    }
}

/// The process-wide counter for download transfers.
#[must_use]
pub fn download_speeds() -> &'static SpeedCounter {
    static COUNTER: LazyLock<SpeedCounter> =
        LazyLock::new(|| SpeedCounter::new(|limit| limit.dl_limit() * 1024));
    &COUNTER
}

/// The process-wide counter for upload transfers.
#[must_use]
pub fn upload_speeds() -> &'static SpeedCounter {
    static COUNTER: LazyLock<SpeedCounter> =
        LazyLock::new(|| SpeedCounter::new(|limit| limit.ul_limit() * 1024));
    &COUNTER
}
