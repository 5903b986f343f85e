//! The aggregate a fetch store is built from.
//!
//! [`FetchStore`] is implemented on a state struct by
//! `#[derive(FetchStore)]` (see `fetch-store-macros`); it ties together the
//! state shape, the generated endpoints struct, the generated actions handle
//! and the generated getters. [`StoreDefinition`] is the factory output a host
//! store consumes.

use crate::endpoint::EndpointBuilder;
use crate::request::RequestPhase;
use crate::shared::SharedState;
use std::fmt;
use std::sync::Arc;

/// A state shape with one `RequestState` slice per endpoint
///
/// Implemented by `#[derive(FetchStore)]`. Each endpoint `name` maps to:
///
/// - the state field `name`
/// - the getter `Self::Getters::name_computed`
/// - the action `Self::Actions::name_action`
pub trait FetchStore: Sized + Send + Sync + 'static {
    /// One endpoint definition per slice
    type Endpoints: Send + Sync + 'static;

    /// Handle exposing one action per endpoint, bound to a shared state
    type Actions: Clone + Send + Sync + 'static;

    /// Selectors projecting each slice out of a state
    type Getters: Copy + Send + Sync + 'static;

    /// Endpoint names, in declaration order
    const ENDPOINTS: &'static [&'static str];

    /// Build a fresh state with every slice idle
    fn idle() -> Self;

    /// Build the getters
    fn getters() -> Self::Getters;

    /// Bind the actions to a shared state
    fn bind(state: SharedState<Self>, endpoints: Arc<Self::Endpoints>) -> Self::Actions;

    /// Lifecycle phase of the slice called `endpoint`, `None` for unknown names
    fn phase(&self, endpoint: &str) -> Option<RequestPhase>;

    /// Return every settled slice to idle, leaving in-flight slices pending
    ///
    /// Returns how many slices were left pending.
    fn reset_settled(&mut self) -> usize;
}

/// Factory output: state builder, getters and actions for one set of endpoints
///
/// # Example
///
/// ```ignore
/// let definition = StoreDefinition::<TodosState>::create(|build| TodosEndpoints {
///     retrieve: build.create(Endpoint::new(|_actions, id: String| async move {
///         fetch_todo(&id).await
///     })),
/// });
///
/// let shared = SharedState::new(definition.state());
/// let actions = definition.actions(&shared);
/// actions.retrieve_action("1".into()).await;
///
/// let view = shared.read(|s| definition.getters().retrieve_computed(s));
/// ```
pub struct StoreDefinition<S: FetchStore> {
    endpoints: Arc<S::Endpoints>,
}

impl<S: FetchStore> StoreDefinition<S> {
    /// Run the `endpoints` callback and capture its endpoint map
    #[must_use]
    pub fn create<F>(endpoints: F) -> Self
    where
        F: FnOnce(EndpointBuilder<S::Actions>) -> S::Endpoints,
    {
        let endpoints = endpoints(EndpointBuilder::new());
        tracing::trace!(endpoints = ?S::ENDPOINTS, "Store definition created");
        Self {
            endpoints: Arc::new(endpoints),
        }
    }

    /// Build a fresh state; every call returns an independent value
    #[must_use]
    pub fn state(&self) -> S {
        S::idle()
    }

    /// The getters, one `<name>_computed` selector per endpoint
    #[must_use]
    pub fn getters(&self) -> S::Getters {
        S::getters()
    }

    /// Actions bound to `state`, one `<name>_action` per endpoint
    #[must_use]
    pub fn actions(&self, state: &SharedState<S>) -> S::Actions {
        S::bind(state.clone(), Arc::clone(&self.endpoints))
    }

    /// Endpoint names, in declaration order
    #[must_use]
    pub const fn endpoint_names(&self) -> &'static [&'static str] {
        S::ENDPOINTS
    }

    /// The registered endpoint definitions
    #[must_use]
    pub fn endpoints(&self) -> &S::Endpoints {
        &self.endpoints
    }
}

impl<S: FetchStore> Clone for StoreDefinition<S> {
    fn clone(&self) -> Self {
        Self {
            endpoints: Arc::clone(&self.endpoints),
        }
    }
}

impl<S: FetchStore> fmt::Debug for StoreDefinition<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreDefinition")
            .field("endpoints", &S::ENDPOINTS)
            .finish()
    }
}

/// Options accepted by [`create_fetch_store`]
///
/// `endpoints` receives the registration helper and returns the endpoint map.
#[derive(Debug, Clone)]
pub struct FetchStoreOptions<F> {
    /// Builds the endpoint map
    pub endpoints: F,
}

/// Build a [`StoreDefinition`] from options
///
/// Equivalent to `StoreDefinition::create(options.endpoints)`. When the
/// callback is written inline in the options struct, annotate its parameter
/// (`|build: EndpointBuilder<TodosActions>|`) since the closure is checked
/// before it reaches this function.
#[must_use]
pub fn create_fetch_store<S, F>(options: FetchStoreOptions<F>) -> StoreDefinition<S>
where
    S: FetchStore,
    F: FnOnce(EndpointBuilder<S::Actions>) -> S::Endpoints,
{
    StoreDefinition::create(options.endpoints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use crate::lifecycle::{dispatch, ActionFuture};
    use crate::request::{Computed, RequestState};
    use crate::RequestFailure;

    #[derive(Clone, Debug, PartialEq)]
    struct CounterState {
        fetch: RequestState<u32>,
        bump: RequestState<()>,
    }

    #[derive(Clone)]
    struct CounterEndpoints {
        fetch: Endpoint<CounterActions, u32, ()>,
        bump: Endpoint<CounterActions, (), u32>,
    }

    #[derive(Clone)]
    struct CounterActions {
        state: SharedState<CounterState>,
        endpoints: Arc<CounterEndpoints>,
    }

    impl CounterActions {
        fn fetch_action(&self) -> ActionFuture {
            fn slice(state: &mut CounterState) -> &mut RequestState<u32> {
                &mut state.fetch
            }
            dispatch(&self.state, "fetch", slice, &self.endpoints.fetch, self.clone(), ())
        }

        fn bump_action(&self, by: u32) -> ActionFuture {
            fn slice(state: &mut CounterState) -> &mut RequestState<()> {
                &mut state.bump
            }
            dispatch(&self.state, "bump", slice, &self.endpoints.bump, self.clone(), by)
        }
    }

    #[derive(Clone, Copy)]
    struct CounterGetters;

    impl CounterGetters {
        fn fetch_computed<'a>(self, state: impl Into<Option<&'a CounterState>>) -> Computed<u32> {
            Computed::project(state.into().map(|s| &s.fetch))
        }
    }

    impl FetchStore for CounterState {
        type Endpoints = CounterEndpoints;
        type Actions = CounterActions;
        type Getters = CounterGetters;

        const ENDPOINTS: &'static [&'static str] = &["fetch", "bump"];

        fn idle() -> Self {
            Self {
                fetch: RequestState::idle(),
                bump: RequestState::idle(),
            }
        }

        fn getters() -> Self::Getters {
            CounterGetters
        }

        fn bind(state: SharedState<Self>, endpoints: Arc<Self::Endpoints>) -> Self::Actions {
            CounterActions { state, endpoints }
        }

        fn phase(&self, endpoint: &str) -> Option<RequestPhase> {
            match endpoint {
                "fetch" => Some(self.fetch.phase()),
                "bump" => Some(self.bump.phase()),
                _ => None,
            }
        }

        fn reset_settled(&mut self) -> usize {
            usize::from(self.fetch.reset_unless_loading()) + usize::from(self.bump.reset_unless_loading())
        }
    }

    fn definition() -> StoreDefinition<CounterState> {
        StoreDefinition::create(|build| CounterEndpoints {
            fetch: build.create(Endpoint::immediate(|_, ()| Ok(41))),
            bump: build.create(Endpoint::new(|actions: CounterActions, by: u32| async move {
                if by == 0 {
                    return Err(RequestFailure::msg("nothing to bump"));
                }
                actions.fetch_action().await;
                Ok(())
            })),
        })
    }

    #[test]
    fn test_state_is_fresh_and_idle() {
        let definition = definition();
        let state = definition.state();
        assert_eq!(state, CounterState::idle());
        for name in definition.endpoint_names() {
            assert_eq!(state.phase(name), Some(RequestPhase::Idle));
        }
        assert_eq!(state.phase("missing"), None);
    }

    #[test]
    fn test_reset_settled_keeps_pending_slices() {
        let mut state = CounterState {
            fetch: RequestState::fulfilled(41),
            bump: RequestState::pending(),
        };

        assert_eq!(state.reset_settled(), 1);
        assert_eq!(state.fetch, RequestState::idle());
        assert_eq!(state.bump, RequestState::pending());
    }

    #[test]
    fn test_getters_on_fresh_state() {
        let definition = definition();
        let state = definition.state();
        assert_eq!(definition.getters().fetch_computed(&state), Computed::idle());
        assert_eq!(definition.getters().fetch_computed(None), Computed::undefined());
    }

    #[tokio::test]
    async fn test_actions_share_bound_state() {
        let definition = definition();
        let shared = SharedState::new(definition.state());
        let actions = definition.actions(&shared);

        actions.bump_action(1).await;

        let state = shared.snapshot();
        assert_eq!(state.bump, RequestState::fulfilled(()));
        assert_eq!(state.fetch, RequestState::fulfilled(41));
    }

    #[tokio::test]
    async fn test_failed_bump_leaves_fetch_idle() {
        let definition = definition();
        let shared = SharedState::new(definition.state());
        definition.actions(&shared).bump_action(0).await;

        let state = shared.snapshot();
        assert_eq!(
            state.bump,
            RequestState::rejected(RequestFailure::msg("nothing to bump"))
        );
        assert_eq!(state.fetch.phase(), RequestPhase::Idle);
    }

    #[tokio::test]
    async fn test_create_fetch_store_options() {
        let definition: StoreDefinition<CounterState> = create_fetch_store(FetchStoreOptions {
            endpoints: |build: EndpointBuilder<CounterActions>| CounterEndpoints {
                fetch: build.create(Endpoint::immediate(|_, ()| Ok(7))),
                bump: build.create(Endpoint::immediate(|_, _| Ok(()))),
            },
        });

        let shared = SharedState::new(definition.state());
        definition.actions(&shared).fetch_action().await;
        assert_eq!(shared.read(|s| s.fetch.clone()), RequestState::fulfilled(7));
        assert_eq!(format!("{definition:?}"), r#"StoreDefinition { endpoints: ["fetch", "bump"] }"#);
    }
}
