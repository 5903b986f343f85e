//! # Fetch Store Core
//!
//! Request-state model and action lifecycle for fetch stores.
//!
//! A fetch store removes the boilerplate of wiring asynchronous requests into
//! a state container. From a set of named endpoints it derives three
//! co-indexed pieces:
//!
//! - **State**: one [`RequestState`] slice per endpoint, all idle at first
//! - **Getters**: one `<name>_computed` selector per endpoint returning a
//!   [`Computed`] view of its slice
//! - **Actions**: one `<name>_action` per endpoint driving the request
//!   lifecycle `Idle → Pending → {Fulfilled, Rejected}`
//!
//! ## Core Concepts
//!
//! - [`Endpoint`]: wraps a request function `(actions, arg) → Result<T, RequestFailure>`
//! - [`EndpointBuilder`]: identity helper used while registering endpoints
//! - [`SharedState`]: explicitly owned state handle the actions write through
//! - [`FetchStore`]: implemented on the state struct by `#[derive(FetchStore)]`
//! - [`StoreDefinition`]: the factory output a host store consumes
//!
//! ## Guarantees
//!
//! - An action whose endpoint is already loading does nothing (single flight
//!   per endpoint); the in-flight request's result wins.
//! - The pending write happens before the request function runs.
//! - A started request runs to completion even if its action future is
//!   dropped.
//! - Actions never fail: request failures, panics included, are recorded in the
//!   slice as a [`RequestFailure`].
//!
//! ## Example
//!
//! ```ignore
//! use fetch_store_core::{Endpoint, RequestState, SharedState, StoreDefinition};
//! use fetch_store_macros::FetchStore;
//!
//! #[derive(FetchStore, Clone, Debug)]
//! struct TodosState {
//!     #[endpoint(arg = String)]
//!     retrieve: RequestState<Todo>,
//!     list: RequestState<Vec<Todo>>,
//! }
//!
//! let definition = StoreDefinition::<TodosState>::create(|build| TodosEndpoints {
//!     retrieve: build.create(Endpoint::new(|_, id| async move { api::retrieve(&id).await })),
//!     list: build.create(Endpoint::new(|_, ()| async { api::list().await })),
//! });
//!
//! let shared = SharedState::new(definition.state());
//! let actions = definition.actions(&shared);
//! actions.retrieve_action("1".to_string()).await;
//!
//! let todo = shared.read(|s| definition.getters().retrieve_computed(s).data);
//! ```

/// Endpoint definitions and the registration helper
pub mod endpoint;

/// The single failure kind recorded by actions
pub mod failure;

/// Per-endpoint request state and getter views
pub mod request;

/// Shared state handle
pub mod shared;

/// The request lifecycle driven by every action
pub mod lifecycle;

/// Store definition and the `FetchStore` trait
pub mod definition;

pub use definition::{create_fetch_store, FetchStore, FetchStoreOptions, StoreDefinition};
pub use endpoint::{Endpoint, EndpointBuilder, RequestFuture};
pub use failure::RequestFailure;
pub use lifecycle::{dispatch, ActionFuture, SliceFn};
pub use request::{Computed, RequestPhase, RequestState};
pub use shared::SharedState;
