//! Endpoint definitions and the registration helper.
//!
//! An [`Endpoint`] wraps the user's request function. The function receives two
//! ordinary parameters: the store's actions handle (so it can trigger other
//! endpoints' actions) and the request argument.

use crate::failure::RequestFailure;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Future produced by a request function
pub type RequestFuture<T> = BoxFuture<'static, Result<T, RequestFailure>>;

type RequestFn<C, T, A> = dyn Fn(C, A) -> RequestFuture<T> + Send + Sync;

/// A named unit of asynchronous work
///
/// # Type Parameters
///
/// - `C`: Context handed to the request function (the store's actions handle)
/// - `T`: Result produced on success
/// - `A`: Request argument
///
/// Endpoints are immutable once created; cloning shares the request function.
///
/// # Example
///
/// ```ignore
/// let retrieve: Endpoint<TodosActions, Todo, String> =
///     Endpoint::new(|_actions, id| async move { api.fetch_todo(&id).await });
/// ```
pub struct Endpoint<C, T, A> {
    request_fn: Arc<RequestFn<C, T, A>>,
}

impl<C, T, A> Endpoint<C, T, A>
where
    C: 'static,
    T: Send + 'static,
    A: 'static,
{
    /// Wrap an asynchronous request function
    #[must_use]
    pub fn new<F, Fut>(request_fn: F) -> Self
    where
        F: Fn(C, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RequestFailure>> + Send + 'static,
    {
        Self {
            request_fn: Arc::new(move |context: C, arg: A| -> RequestFuture<T> {
                request_fn(context, arg).boxed()
            }),
        }
    }

    /// Wrap a request function that produces its result without suspending
    #[must_use]
    pub fn immediate<F>(request_fn: F) -> Self
    where
        F: Fn(C, A) -> Result<T, RequestFailure> + Send + Sync + 'static,
    {
        Self {
            request_fn: Arc::new(move |context: C, arg: A| -> RequestFuture<T> {
                future::ready(request_fn(context, arg)).boxed()
            }),
        }
    }
}

impl<C, T, A> Endpoint<C, T, A> {
    /// Call the request function
    ///
    /// The function body runs up to its first suspension point before this
    /// returns; the rest runs when the returned future is polled.
    pub fn request(&self, context: C, arg: A) -> RequestFuture<T> {
        (self.request_fn)(context, arg)
    }
}

impl<C, T, A> Clone for Endpoint<C, T, A> {
    fn clone(&self) -> Self {
        Self {
            request_fn: Arc::clone(&self.request_fn),
        }
    }
}

impl<C, T, A> fmt::Debug for Endpoint<C, T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("result", &std::any::type_name::<T>())
            .field("arg", &std::any::type_name::<A>())
            .finish_non_exhaustive()
    }
}

/// Registration helper handed to the `endpoints` callback
///
/// `create` passes its definition through untouched; it exists so call sites
/// can spell out result and argument types per endpoint.
pub struct EndpointBuilder<C> {
    _context: PhantomData<fn() -> C>,
}

impl<C> EndpointBuilder<C> {
    /// Create a builder
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _context: PhantomData,
        }
    }

    /// Register an endpoint definition, returning it unchanged
    #[must_use]
    #[allow(clippy::unused_self)] // Identity helper, the receiver only carries `C`
    pub const fn create<T, A>(&self, endpoint: Endpoint<C, T, A>) -> Endpoint<C, T, A> {
        endpoint
    }
}

impl<C> Clone for EndpointBuilder<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for EndpointBuilder<C> {}

impl<C> Default for EndpointBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EndpointBuilder<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointBuilder").finish()
    }
}
