//! Process-wide slot holding the current [`Config`] snapshot.
//!
//! Readers clone the [`Arc`] and keep using their snapshot for the rest
//! of the operation; a reload builds a new snapshot and swaps it in
//! wholesale. No reader ever observes a partially updated config.

use std::sync::{Arc, RwLock};

use crate::config::Config;

static CURRENT: RwLock<Option<Arc<Config>>> = RwLock::new(None);

/// Returns the current config snapshot, if one has been installed.
#[must_use]
pub fn current() -> Option<Arc<Config>> {
    CURRENT
        .read()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .clone()
}

/// Installs a new snapshot, returning the one it replaced.
pub fn install(config: Arc<Config>) -> Option<Arc<Config>> {
    CURRENT
        .write()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .replace(config)
}

#[cfg(test)]
mod tests {
    // The slot is process-global, so exercising install/current ordering
    // lives in the loader integration tests where a real snapshot exists.
}
