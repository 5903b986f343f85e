//! The single failure kind a request function can produce.
//!
//! Whatever goes wrong inside a request function (an I/O error, a validation
//! error, a panic) ends up as a [`RequestFailure`] stored in the endpoint's
//! [`RequestState`](crate::request::RequestState). Nothing distinguishes the
//! sources beyond what the wrapped error itself carries.

use serde::{Serialize, Serializer};
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Boxed error accepted from request functions
type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Error, Debug)]
enum FailureKind {
    #[error("{0}")]
    Message(String),

    #[error("request function panicked: {0}")]
    Panicked(String),

    #[error("request dropped before it settled")]
    Cancelled,

    #[error("{0}")]
    Source(BoxError),
}

/// Opaque failure value recorded when a request function fails
///
/// Cloning is cheap: clones share the same underlying error. Any
/// `std::error::Error + Send + Sync` converts into a `RequestFailure`, so `?`
/// works inside request functions.
///
/// Two failures compare equal when they render the same message.
///
/// # Example
///
/// ```
/// use fetch_store_core::RequestFailure;
///
/// let failure = RequestFailure::msg("not found");
/// assert_eq!(failure.to_string(), "not found");
/// assert_eq!(failure, RequestFailure::msg("not found"));
/// ```
#[derive(Clone)]
pub struct RequestFailure {
    kind: Arc<FailureKind>,
}

impl RequestFailure {
    /// Create a failure from a plain message
    #[must_use]
    pub fn msg(message: impl fmt::Display) -> Self {
        Self::with_kind(FailureKind::Message(message.to_string()))
    }

    /// Create a failure from a panic payload caught while running a request
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());

        Self::with_kind(FailureKind::Panicked(message))
    }

    /// Failure recorded when an action is dropped outside a runtime before
    /// its request settled
    #[must_use]
    pub fn cancelled() -> Self {
        Self::with_kind(FailureKind::Cancelled)
    }

    fn with_kind(kind: FailureKind) -> Self {
        Self {
            kind: Arc::new(kind),
        }
    }

    /// Whether this failure was produced by a panicking request function
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(*self.kind, FailureKind::Panicked(_))
    }

    /// Whether the request was abandoned before it settled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(*self.kind, FailureKind::Cancelled)
    }

    /// The wrapped error, if the failure was built from one
    #[must_use]
    pub fn source_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match &*self.kind {
            FailureKind::Source(error) => Some(error.as_ref()),
            FailureKind::Message(_) | FailureKind::Panicked(_) | FailureKind::Cancelled => None,
        }
    }

    /// Recover the concrete error type the failure was built from
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        self.source_error()?.downcast_ref::<E>()
    }
}

impl<E> From<E> for RequestFailure
where
    E: StdError + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::with_kind(FailureKind::Source(Box::new(error)))
    }
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.kind, f)
    }
}

impl fmt::Debug for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RequestFailure")
            .field(&self.to_string())
            .finish()
    }
}

impl PartialEq for RequestFailure {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.kind, &other.kind) || self.to_string() == other.to_string()
    }
}

impl Eq for RequestFailure {}

impl Serialize for RequestFailure {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
