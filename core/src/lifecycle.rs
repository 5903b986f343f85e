//! The request lifecycle every generated action runs.
//!
//! ```text
//! Idle ──┐
//!        ├─▶ Pending ──▶ Fulfilled
//! Fulfilled/Rejected ─┘          └─▶ Rejected
//! ```
//!
//! The synchronous part of [`dispatch`] decides whether the call proceeds and
//! marks the slice pending under a single write lock, so there is no point
//! between reading `is_loading` and setting it where another call can slip in.
//! The only suspension point is the request function itself.
//!
//! A started request always settles. Dropping the action future detaches the
//! request onto the current Tokio runtime instead of cancelling it.

use crate::endpoint::{Endpoint, RequestFuture};
use crate::failure::RequestFailure;
use crate::request::RequestState;
use crate::shared::SharedState;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::runtime::Handle;

/// Future returned by every action
///
/// Actions never fail: whatever the request function does ends up in state.
pub type ActionFuture = BoxFuture<'static, ()>;

/// Selects one endpoint's slice out of the aggregate state
pub type SliceFn<S, T> = fn(&mut S) -> &mut RequestState<T>;

/// Drive one action invocation for the endpoint `name`
///
/// 1. If the slice is already loading, nothing happens and a completed future
///    is returned. The duplicate call is dropped without a signal.
/// 2. Otherwise the slice is set to [`RequestState::pending`] before this
///    function returns.
/// 3. The request function is called with `context` and `arg`.
/// 4. The returned future awaits the request and writes
///    [`RequestState::fulfilled`] or [`RequestState::rejected`]. Panics in the
///    request function are caught and recorded as a [`RequestFailure`].
///
/// Dropping the returned future before it completes does not cancel the
/// request: the remaining work is spawned on the current Tokio runtime and
/// still settles the slice. Outside a runtime the slice is rejected with
/// [`RequestFailure::cancelled`] instead, so the endpoint accepts new calls.
pub fn dispatch<S, C, T, A>(
    state: &SharedState<S>,
    name: &'static str,
    slice: SliceFn<S, T>,
    endpoint: &Endpoint<C, T, A>,
    context: C,
    arg: A,
) -> ActionFuture
where
    S: Send + Sync + 'static,
    T: Send + 'static,
{
    let started = state.update_if(|current| {
        let slot = slice(current);
        if slot.is_loading {
            return false;
        }
        *slot = RequestState::pending();
        true
    });

    if !started {
        tracing::trace!(endpoint = name, "Request already in flight, dropping call");
        return future::ready(()).boxed();
    }

    tracing::trace!(endpoint = name, "Request started");

    let request: RequestFuture<T> =
        match panic::catch_unwind(AssertUnwindSafe(|| endpoint.request(context, arg))) {
            Ok(request) => request,
            Err(payload) => future::ready(Err(RequestFailure::from_panic(payload))).boxed(),
        };

    let settle = {
        let state = state.clone();
        async move {
            let outcome = AssertUnwindSafe(request)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(RequestFailure::from_panic(payload)));

            let next = match outcome {
                Ok(data) => {
                    tracing::trace!(endpoint = name, "Request fulfilled");
                    RequestState::fulfilled(data)
                },
                Err(failure) => {
                    tracing::debug!(endpoint = name, error = %failure, "Request rejected");
                    RequestState::rejected(failure)
                },
            };

            state.update(|current| *slice(current) = next);
        }
        .boxed()
    };

    let state = state.clone();
    let abandon: Box<dyn FnOnce() + Send> = Box::new(move || {
        state.update_if(|current| {
            let slot = slice(current);
            if !slot.is_loading {
                return false;
            }
            *slot = RequestState::rejected(RequestFailure::cancelled());
            true
        });
    });

    InFlight {
        name,
        settle: Some(settle),
        abandon: Some(abandon),
    }
    .boxed()
}

/// A started request that settles even when its action future is dropped
struct InFlight {
    name: &'static str,
    settle: Option<BoxFuture<'static, ()>>,
    abandon: Option<Box<dyn FnOnce() + Send>>,
}

impl Future for InFlight {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let Some(settle) = self.settle.as_mut() else {
            return Poll::Ready(());
        };
        ready!(settle.poll_unpin(cx));
        self.settle = None;
        Poll::Ready(())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let Some(settle) = self.settle.take() else {
            return;
        };

        if let Ok(runtime) = Handle::try_current() {
            tracing::trace!(endpoint = self.name, "Action dropped mid-flight, detaching request");
            drop(runtime.spawn(settle));
        } else if let Some(abandon) = self.abandon.take() {
            tracing::debug!(endpoint = self.name, "Action dropped outside a runtime, rejecting request");
            drop(settle);
            abandon();
        }
    }
}
