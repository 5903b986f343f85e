//! # Fetch Store Runtime
//!
//! Host store for fetch stores.
//!
//! A [`Store`] is registered under an id, seeds its state from a
//! [`StoreDefinition`](fetch_store_core::StoreDefinition), binds the generated
//! actions to that state and exposes getters over it. Every write made by an
//! action is announced to subscribers.
//!
//! ## Example
//!
//! ```ignore
//! use fetch_store_runtime::Store;
//!
//! let store = Store::new("todos", &todos_definition());
//!
//! store.actions().list_action().await;
//!
//! let todos = store.computed(|getters, state| getters.list_computed(state).data);
//! ```

use fetch_store_core::{FetchStore, RequestPhase, SharedState, StoreDefinition};
use std::sync::Arc;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// Request failures never show up here: they are recorded in the
    /// endpoint's slice.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Change notification channel closed
        ///
        /// Every sender is owned by the store's state, so this only happens
        /// once the state itself has been dropped.
        #[error("Store change channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```ignore
/// let config = StoreConfig::default()
///     .with_id("todos")
///     .with_notify_on_reset(false);
///
/// let store = Store::with_config(config, &definition);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Name the store is registered under, recorded on its tracing spans
    pub id: String,
    /// Whether [`Store::reset`] notifies subscribers
    pub notify_on_reset: bool,
}

impl StoreConfig {
    /// Create a configuration for the store `id`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Set the store id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Set whether resetting the store notifies subscribers
    #[must_use]
    pub const fn with_notify_on_reset(mut self, notify: bool) -> Self {
        self.notify_on_reset = notify;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            id: "store".to_string(),
            notify_on_reset: true,
        }
    }
}

/// Store runtime hosting one fetch store.
pub mod store {
    use super::{Arc, FetchStore, RequestPhase, SharedState, StoreConfig, StoreDefinition, StoreError};
    use std::fmt;
    use tokio::sync::watch;

    /// The Store - host container for a fetch store
    ///
    /// The Store manages:
    /// 1. State (a [`SharedState`] seeded from the definition)
    /// 2. Actions (bound once to that state)
    /// 3. Getters (projections over the current state)
    /// 4. Change notification (a revision counter bumped on every write)
    ///
    /// Cloning a Store yields another handle to the same state.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let store = Store::new("todos", &definition);
    ///
    /// let pending = store.actions().retrieve_action("1".to_string());
    /// assert!(store.state(|s| s.retrieve.is_loading));
    /// pending.await;
    /// ```
    pub struct Store<S: FetchStore> {
        config: Arc<StoreConfig>,
        definition: StoreDefinition<S>,
        shared: SharedState<S>,
        actions: S::Actions,
    }

    impl<S: FetchStore> Store<S> {
        /// Register a store under `id` with default configuration
        #[must_use]
        pub fn new(id: impl Into<String>, definition: &StoreDefinition<S>) -> Self {
            Self::with_config(StoreConfig::new(id), definition)
        }

        /// Register a store with custom configuration
        ///
        /// The state is built fresh from `definition`, so two stores created
        /// from one definition never share state.
        #[must_use]
        #[tracing::instrument(skip_all, fields(store = %config.id), name = "store_registered")]
        pub fn with_config(config: StoreConfig, definition: &StoreDefinition<S>) -> Self {
            let shared = SharedState::new(definition.state());
            let actions = definition.actions(&shared);
            tracing::debug!(endpoints = ?S::ENDPOINTS, "Store registered");

            Self {
                config: Arc::new(config),
                definition: definition.clone(),
                shared,
                actions,
            }
        }

        /// The id this store is registered under
        #[must_use]
        pub fn id(&self) -> &str {
            &self.config.id
        }

        /// The store configuration
        #[must_use]
        pub fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Actions bound to this store's state
        #[must_use]
        pub const fn actions(&self) -> &S::Actions {
            &self.actions
        }

        /// The getters of this store
        #[must_use]
        pub fn getters(&self) -> S::Getters {
            self.definition.getters()
        }

        /// Read state via a closure
        ///
        /// The read lock is held while `f` runs. Calling an action from inside
        /// `f` deadlocks, since the action needs the write lock; start actions
        /// after the read returns.
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            self.shared.read(f)
        }

        /// Evaluate getters against the current state
        ///
        /// Holds the read lock like [`Store::state`], so `f` must not call
        /// actions.
        ///
        /// # Example
        ///
        /// ```ignore
        /// let loading = store.computed(|getters, state| {
        ///     getters.list_computed(state).is_loading
        /// });
        /// ```
        pub fn computed<F, T>(&self, f: F) -> T
        where
            F: FnOnce(S::Getters, &S) -> T,
        {
            let getters = self.getters();
            self.shared.read(|state| f(getters, state))
        }

        /// Lifecycle phase of every endpoint, in declaration order
        #[must_use]
        pub fn phases(&self) -> Vec<(&'static str, RequestPhase)> {
            self.shared.read(|state| {
                S::ENDPOINTS
                    .iter()
                    .filter_map(|name| state.phase(name).map(|phase| (*name, phase)))
                    .collect()
            })
        }

        /// Subscribe to state changes
        ///
        /// The receiver yields the revision number of the latest write.
        #[must_use]
        pub fn subscribe(&self) -> watch::Receiver<u64> {
            self.shared.subscribe()
        }

        /// Number of notifying writes so far
        #[must_use]
        pub fn revision(&self) -> u64 {
            self.shared.revision()
        }

        /// Wait for the next state change and return its revision
        ///
        /// Changes made before this call are not reported.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ChannelClosed`] if the change channel closed
        /// while waiting.
        pub async fn changed(&self) -> Result<u64, StoreError> {
            let mut receiver = self.shared.subscribe();
            receiver
                .changed()
                .await
                .map_err(|_| StoreError::ChannelClosed)?;
            let revision = *receiver.borrow_and_update();
            Ok(revision)
        }

        /// Return every settled slice to idle
        ///
        /// Slices with a request in flight stay pending: the request keeps
        /// its claim on the endpoint and its result settles the slice.
        #[tracing::instrument(skip(self), fields(store = %self.config.id), name = "store_reset")]
        pub fn reset(&self) {
            let notify = self.config.notify_on_reset;
            let mut in_flight = 0;
            self.shared.update_if(|state| {
                in_flight = state.reset_settled();
                notify
            });
            tracing::debug!(in_flight, notified = notify, "Store reset");
        }

        /// The underlying shared state
        #[must_use]
        pub const fn shared(&self) -> &SharedState<S> {
            &self.shared
        }

        /// The definition this store was built from
        #[must_use]
        pub const fn definition(&self) -> &StoreDefinition<S> {
            &self.definition
        }
    }

    impl<S: FetchStore + Clone> Store<S> {
        /// Clone the current state
        #[must_use]
        pub fn snapshot(&self) -> S {
            self.shared.snapshot()
        }
    }

    impl<S: FetchStore> Clone for Store<S> {
        fn clone(&self) -> Self {
            Self {
                config: Arc::clone(&self.config),
                definition: self.definition.clone(),
                shared: self.shared.clone(),
                actions: self.actions.clone(),
            }
        }
    }

    impl<S: FetchStore> fmt::Debug for Store<S> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Store")
                .field("id", &self.config.id)
                .field("phases", &self.phases())
                .field("revision", &self.revision())
                .finish_non_exhaustive()
        }
    }
}

pub use store::Store;
