//! Version-keyed memoization for derived views
//!
//! Derived views are pure projections over a module's current state. Each
//! module bumps a version counter on every mutation of the inputs a view
//! reads; a [`Memo`] holds the last computed value together with the
//! version it was computed at, so a view recomputes exactly when its
//! inputs changed and is a cheap clone otherwise.

use parking_lot::Mutex;

/// Single-slot cache keyed by a version counter
#[derive(Debug, Default)]
pub struct Memo<T> {
    slot: Mutex<Option<(u64, T)>>,
}

impl<T: Clone> Memo<T> {
    /// Create an empty memo
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value for `version`, computing and storing it if
    /// the cache holds a different version (or nothing)
    pub fn get_or_compute(&self, version: u64, compute: impl FnOnce() -> T) -> T {
        let mut slot = self.slot.lock();
        if let Some((cached_version, value)) = slot.as_ref() {
            if *cached_version == version {
                return value.clone();
            }
        }
        let value = compute();
        *slot = Some((version, value.clone()));
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn computes_once_per_version() {
        let memo = Memo::new();
        let calls = AtomicUsize::new(0);

        let first = memo.get_or_compute(1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            "value".to_string()
        });
        let second = memo.get_or_compute(1, || {
            calls.fetch_add(1, Ordering::SeqCst);
            unreachable!("cached version must not recompute")
        });

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn recomputes_when_version_changes() {
        let memo = Memo::new();

        assert_eq!(memo.get_or_compute(1, || 10), 10);
        assert_eq!(memo.get_or_compute(2, || 20), 20);
        // Going back to an old version recomputes too; only the latest
        // slot is retained.
        assert_eq!(memo.get_or_compute(1, || 30), 30);
    }
}
