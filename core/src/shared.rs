//! Explicitly owned state handle shared by a store's actions and getters.
//!
//! Writes never happen across an `.await`: every method takes the lock, runs a
//! synchronous closure and releases it. Each write bumps a revision counter
//! published on a `watch` channel so hosts can react to changes.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Cloneable handle to one store's state
///
/// Clones point at the same state. A lock poisoned by a panicking closure is
/// recovered rather than propagated.
///
/// # Example
///
/// ```
/// use fetch_store_core::SharedState;
///
/// let shared = SharedState::new(0_u32);
/// shared.update(|n| *n += 1);
/// assert_eq!(shared.read(|n| *n), 1);
/// assert_eq!(shared.revision(), 1);
/// ```
pub struct SharedState<S> {
    inner: Arc<RwLock<S>>,
    revision: Arc<watch::Sender<u64>>,
}

impl<S> SharedState<S> {
    /// Wrap an initial state
    #[must_use]
    pub fn new(initial: S) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(RwLock::new(initial)),
            revision: Arc::new(revision),
        }
    }

    /// Read the state through a closure
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&S) -> R,
    {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    /// Mutate the state and notify subscribers
    pub fn update<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut S) -> R,
    {
        let result = {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        self.bump();
        result
    }

    /// Mutate the state, notifying subscribers only when `f` returns `true`
    ///
    /// The check and the write happen under one lock acquisition.
    pub fn update_if<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut S) -> bool,
    {
        let changed = {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard)
        };
        if changed {
            self.bump();
        }
        changed
    }

    /// Replace the whole state and notify subscribers
    pub fn replace(&self, next: S) -> S {
        self.update(|state| std::mem::replace(state, next))
    }

    /// Subscribe to change notifications
    ///
    /// The receiver yields the revision number of the latest write.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Number of notifying writes so far
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    fn bump(&self) {
        self.revision.send_modify(|revision| *revision += 1);
    }
}

impl<S: Clone> SharedState<S> {
    /// Clone the current state
    #[must_use]
    pub fn snapshot(&self) -> S {
        self.read(S::clone)
    }
}

impl<S> Clone for SharedState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            revision: Arc::clone(&self.revision),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for SharedState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.read(|state| {
            f.debug_struct("SharedState")
                .field("state", state)
                .field("revision", &self.revision())
                .finish()
        })
    }
}

impl<S: Default> Default for SharedState<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let a = SharedState::new(vec![1]);
        let b = a.clone();
        b.update(|v| v.push(2));
        assert_eq!(a.snapshot(), vec![1, 2]);
    }

    #[test]
    fn test_update_if_only_notifies_on_change() {
        let shared = SharedState::new(0);
        assert!(!shared.update_if(|_| false));
        assert_eq!(shared.revision(), 0);

        assert!(shared.update_if(|n| {
            *n = 5;
            true
        }));
        assert_eq!(shared.revision(), 1);
        assert_eq!(shared.read(|n| *n), 5);
    }

    #[test]
    fn test_replace_returns_previous() {
        let shared = SharedState::new("old".to_string());
        let previous = shared.replace("new".to_string());
        assert_eq!(previous, "old");
        assert_eq!(shared.snapshot(), "new");
    }

    #[tokio::test]
    async fn test_subscribers_see_revisions() {
        let shared = SharedState::new(0);
        let mut rx = shared.subscribe();

        shared.update(|n| *n += 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);

        shared.update(|n| *n += 1);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 2);
    }

    #[test]
    fn test_poisoned_lock_is_recovered() {
        let shared = SharedState::new(1);
        let clone = shared.clone();
        let result = std::thread::spawn(move || {
            clone.update(|n| {
                *n = 99;
                #[allow(clippy::panic)]
                if *n == 99 {
                    panic!("poison the lock");
                }
            });
        })
        .join();
        assert!(result.is_err());

        assert_eq!(shared.read(|n| *n), 99);
        shared.update(|n| *n = 2);
        assert_eq!(shared.read(|n| *n), 2);
    }
}
