use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use acl::UserId;
use rustc_hash::FxHashMap;

/// Per-user session and transfer slot accounting.
///
/// Backs `max_users` login limits and `sim_xfers` simultaneous transfer
/// limits. Each counter family sits behind its own mutex; the critical
/// sections are single map operations. A negative limit means
/// unlimited.
#[derive(Default)]
pub struct SessionCounter {
    logged_in: Mutex<FxHashMap<UserId, u32>>,
    uploads: Mutex<FxHashMap<UserId, u32>>,
    downloads: Mutex<FxHashMap<UserId, u32>>,
}

fn acquire(map: &Mutex<FxHashMap<UserId, u32>>, uid: UserId, limit: i32) -> bool {
    let mut map = lock(map);
    let count = map.entry(uid).or_insert(0);
    if limit >= 0 && i64::from(*count) >= i64::from(limit) {
        return false;
    }
    *count += 1;
    true
}

fn release(map: &Mutex<FxHashMap<UserId, u32>>, uid: UserId) {
    let mut map = lock(map);
    if let Some(count) = map.get_mut(&uid) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            map.remove(&uid);
        }
    }
}

fn lock(
    map: &Mutex<FxHashMap<UserId, u32>>,
) -> MutexGuard<'_, FxHashMap<UserId, u32>> {
    map.lock().unwrap_or_else(PoisonError::into_inner)
}

impl SessionCounter {
    /// Creates an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide instance.
    #[must_use]
    pub fn global() -> &'static Self {
        static COUNTER: LazyLock<SessionCounter> = LazyLock::new(SessionCounter::new);
        &COUNTER
    }

    /// Claims a login slot; `false` when the user is at their limit.
    #[must_use]
    pub fn log_in(&self, uid: UserId, limit: i32) -> bool {
        acquire(&self.logged_in, uid, limit)
    }

    /// Releases a login slot.
    pub fn log_out(&self, uid: UserId) {
        release(&self.logged_in, uid);
    }

    /// Claims an upload slot; `false` when the user is at their limit.
    #[must_use]
    pub fn start_upload(&self, uid: UserId, limit: i32) -> bool {
        acquire(&self.uploads, uid, limit)
    }

    /// Releases an upload slot.
    pub fn stop_upload(&self, uid: UserId) {
        release(&self.uploads, uid);
    }

    /// Claims a download slot; `false` when the user is at their limit.
    #[must_use]
    pub fn start_download(&self, uid: UserId, limit: i32) -> bool {
        acquire(&self.downloads, uid, limit)
    }

    /// Releases a download slot.
    pub fn stop_download(&self, uid: UserId) {
        release(&self.downloads, uid);
    }
}

#[cfg(test)]
mod tests {
    use super::SessionCounter;

    #[test]
    fn login_slots_enforce_the_limit() {
        let counter = SessionCounter::new();
        assert!(counter.log_in(7, 2));
        assert!(counter.log_in(7, 2));
        assert!(!counter.log_in(7, 2));
        counter.log_out(7);
        assert!(counter.log_in(7, 2));
    }

    #[test]
    fn negative_limit_is_unlimited() {
        let counter = SessionCounter::new();
        for _ in 0..100 {
            assert!(counter.log_in(1, -1));
        }
    }

    #[test]
    fn users_count_independently() {
        let counter = SessionCounter::new();
        assert!(counter.start_download(1, 1));
        assert!(counter.start_download(2, 1));
        assert!(!counter.start_download(1, 1));
        counter.stop_download(1);
        assert!(counter.start_download(1, 1));
    }

    #[test]
    fn release_without_claim_is_harmless() {
        let counter = SessionCounter::new();
        counter.stop_upload(42);
        assert!(counter.start_upload(42, 1));
    }

    #[test]
    fn upload_and_download_slots_are_separate() {
        let counter = SessionCounter::new();
        assert!(counter.start_upload(5, 1));
        assert!(counter.start_download(5, 1));
        assert!(!counter.start_upload(5, 1));
        assert!(!counter.start_download(5, 1));
    }
}
