//! # Fetch Store Testing
//!
//! Testing utilities and helpers for fetch stores.
//!
//! This crate provides:
//! - Request-function doubles that hold a request mid-flight or count calls
//! - A Given-When-Then harness for actions
//! - Assertion helpers for request-state slices
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```ignore
//! use fetch_store_testing::{CallCounter, RequestGate};
//!
//! #[tokio::test]
//! async fn test_list_is_pending_while_in_flight() {
//!     let gate = RequestGate::new();
//!     let store = Store::new("todos", &definition(gate.clone()));
//!
//!     let pending = tokio::spawn(store.actions().list_action());
//!     gate.wait_entered(1).await;
//!     assertions::assert_pending(&store.state(|s| s.list.clone()));
//!
//!     gate.open();
//!     pending.await.unwrap();
//! }
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;


/// Request-function doubles.
pub mod mocks {
    use super::{watch, Arc, AtomicUsize, Ordering};

    /// Holds request functions mid-flight until opened
    ///
    /// Call [`RequestGate::pass`] inside a request function; it returns once
    /// the gate is open. While the gate is closed the endpoint's slice stays
    /// pending, which makes the pending state observable in tests.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let gate = RequestGate::new();
    /// let endpoint = Endpoint::new({
    ///     let gate = gate.clone();
    ///     move |_, ()| {
    ///         let gate = gate.clone();
    ///         async move {
    ///             gate.pass().await;
    ///             Ok(vec![])
    ///         }
    ///     }
    /// });
    /// ```
    #[derive(Debug, Clone)]
    pub struct RequestGate {
        open: Arc<watch::Sender<bool>>,
        entered: Arc<watch::Sender<usize>>,
    }

    impl RequestGate {
        /// Create a closed gate
        #[must_use]
        pub fn new() -> Self {
            let (open, _) = watch::channel(false);
            let (entered, _) = watch::channel(0);
            Self {
                open: Arc::new(open),
                entered: Arc::new(entered),
            }
        }

        /// Wait until the gate is open
        pub async fn pass(&self) {
            self.entered.send_modify(|entered| *entered += 1);
            let mut open = self.open.subscribe();
            let _ = open.wait_for(|open| *open).await;
        }

        /// Open the gate, releasing every waiting request
        pub fn open(&self) {
            self.open.send_replace(true);
        }

        /// Close the gate again
        pub fn close(&self) {
            self.open.send_replace(false);
        }

        /// Whether the gate is open
        #[must_use]
        pub fn is_open(&self) -> bool {
            *self.open.borrow()
        }

        /// Number of requests that reached the gate
        #[must_use]
        pub fn entered(&self) -> usize {
            *self.entered.borrow()
        }

        /// Wait until at least `count` requests reached the gate
        pub async fn wait_entered(&self, count: usize) {
            let mut entered = self.entered.subscribe();
            let _ = entered.wait_for(|entered| *entered >= count).await;
        }
    }

    impl Default for RequestGate {
        fn default() -> Self {
            Self::new()
        }
    }

    /// Counts request-function invocations
    ///
    /// Clones share the count.
    ///
    /// # Example
    ///
    /// ```
    /// use fetch_store_testing::CallCounter;
    ///
    /// let calls = CallCounter::new();
    /// let seen = calls.clone();
    /// seen.hit();
    /// assert_eq!(calls.count(), 1);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct CallCounter {
        calls: Arc<AtomicUsize>,
    }

    impl CallCounter {
        /// Create a counter at zero
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Record one invocation
        pub fn hit(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }

        /// Invocations so far
        #[must_use]
        pub fn count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Reset to zero
        pub fn reset(&self) {
            self.calls.store(0, Ordering::SeqCst);
        }
    }
}

/// Assertion helpers for request-state slices
pub mod assertions {
    use fetch_store_core::{RequestPhase, RequestState};
    use std::fmt::Debug;

    /// Assert that the slice is idle
    ///
    /// # Panics
    ///
    /// Panics if the slice is loading, failed or holds data.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_idle<T: Debug>(slice: &RequestState<T>) {
        assert_eq!(
            slice.phase(),
            RequestPhase::Idle,
            "Expected an idle slice, found {slice:?}"
        );
    }

    /// Assert that the slice is pending
    ///
    /// # Panics
    ///
    /// Panics if the slice is not loading, or if it still carries an error or
    /// data.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_pending<T: Debug>(slice: &RequestState<T>) {
        assert!(
            slice.is_loading && !slice.has_error && slice.error.is_none() && slice.data.is_none(),
            "Expected a pending slice, found {slice:?}"
        );
    }

    /// Assert that the slice settled with `expected`
    ///
    /// # Panics
    ///
    /// Panics if the slice is not fulfilled or holds different data.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_fulfilled<T: Debug + PartialEq>(slice: &RequestState<T>, expected: &T) {
        assert_eq!(
            slice.phase(),
            RequestPhase::Fulfilled,
            "Expected a fulfilled slice, found {slice:?}"
        );
        assert_eq!(slice.data.as_ref(), Some(expected));
    }

    /// Assert that the slice failed with `message`
    ///
    /// # Panics
    ///
    /// Panics if the slice is not rejected or the failure message differs.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_rejected<T: Debug>(slice: &RequestState<T>, message: &str) {
        assert_eq!(
            slice.phase(),
            RequestPhase::Rejected,
            "Expected a rejected slice, found {slice:?}"
        );
        assert_eq!(
            slice.error.as_ref().map(ToString::to_string).as_deref(),
            Some(message)
        );
    }

    /// Assert that the slice's flags agree with its error and data
    ///
    /// # Panics
    ///
    /// Panics if the slice is in a state no lifecycle transition produces.
    #[allow(clippy::panic)] // Test assertion
    pub fn assert_consistent<T: Debug>(slice: &RequestState<T>) {
        assert!(slice.is_consistent(), "Inconsistent slice: {slice:?}");
    }
}

/// Test helpers and utilities.
pub mod helpers {
    use tracing_subscriber::EnvFilter;

    /// Install a fmt subscriber writing through the test harness
    ///
    /// Honors `RUST_LOG`, defaulting to lifecycle traces from the fetch store
    /// crates. Safe to call from every test; only the first call installs.
    pub fn init_test_tracing() {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fetch_store_core=trace,fetch_store_runtime=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use fetch_store_core::{RequestFailure, RequestState};
    use proptest::prelude::*;
    use std::fmt::Debug;

    /// Failures with short lowercase messages
    pub fn request_failure() -> impl Strategy<Value = RequestFailure> {
        "[a-z][a-z ]{0,23}".prop_map(RequestFailure::msg)
    }

    /// Any state a slice can reach through the lifecycle
    pub fn request_state<T, D>(data: D) -> impl Strategy<Value = RequestState<T>>
    where
        T: Clone + Debug,
        D: Strategy<Value = T>,
    {
        prop_oneof![
            Just(RequestState::idle()),
            Just(RequestState::pending()),
            data.prop_map(RequestState::fulfilled),
            request_failure().prop_map(RequestState::rejected),
        ]
    }
}

// Re-export commonly used items
pub use action_test::ActionTest;
pub use helpers::init_test_tracing;
pub use mocks::{CallCounter, RequestGate};
