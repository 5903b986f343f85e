//! Per-endpoint request state and the read-only view getters publish.
//!
//! A [`RequestState`] moves through `Idle → Pending → {Fulfilled, Rejected}`
//! and is always replaced wholesale: every transition writes one of the four
//! constructors below, so the loading/error/data invariant can't be broken by a
//! partial update.

use crate::failure::RequestFailure;
use serde::Serialize;
use std::fmt;

/// Runtime status of exactly one endpoint
///
/// # Invariant
///
/// At most one of {loading, settled success, settled failure} is active:
///
/// - `is_loading` implies `!has_error` and `data.is_none()`
/// - `has_error` implies `!is_loading` and `data.is_none()`
/// - `data.is_some()` implies `!is_loading` and `!has_error`
///
/// Serializes with the field names host stores expect (`isLoading`,
/// `hasError`, `error`, `data`), the failure rendered as its message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestState<T> {
    /// A request is in flight
    pub is_loading: bool,
    /// The last request failed
    pub has_error: bool,
    /// Failure of the last request, if it failed
    pub error: Option<RequestFailure>,
    /// Result of the last successful request
    pub data: Option<T>,
}

impl<T> RequestState<T> {
    /// Idle state: nothing requested yet
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            is_loading: false,
            has_error: false,
            error: None,
            data: None,
        }
    }

    /// A request is in flight
    #[must_use]
    pub const fn pending() -> Self {
        Self {
            is_loading: true,
            has_error: false,
            error: None,
            data: None,
        }
    }

    /// The request succeeded with `data`
    #[must_use]
    pub const fn fulfilled(data: T) -> Self {
        Self {
            is_loading: false,
            has_error: false,
            error: None,
            data: Some(data),
        }
    }

    /// The request failed with `failure`
    #[must_use]
    pub const fn rejected(failure: RequestFailure) -> Self {
        Self {
            is_loading: false,
            has_error: true,
            error: Some(failure),
            data: None,
        }
    }

    /// Which lifecycle phase this slice is in
    #[must_use]
    pub const fn phase(&self) -> RequestPhase {
        if self.is_loading {
            RequestPhase::Pending
        } else if self.has_error {
            RequestPhase::Rejected
        } else if self.data.is_some() {
            RequestPhase::Fulfilled
        } else {
            RequestPhase::Idle
        }
    }

    /// Return the slice to idle unless a request is in flight
    ///
    /// Returns `true` when the slice was left pending.
    pub fn reset_unless_loading(&mut self) -> bool {
        if self.is_loading {
            return true;
        }
        *self = Self::idle();
        false
    }

    /// Check the loading/error/data invariant
    #[must_use]
    pub const fn is_consistent(&self) -> bool {
        let loading_ok = !self.is_loading || (!self.has_error && self.data.is_none());
        let error_ok = !self.has_error || (!self.is_loading && self.data.is_none());
        let data_ok = self.data.is_none() || (!self.is_loading && !self.has_error);
        loading_ok && error_ok && data_ok
    }
}

impl<T> Default for RequestState<T> {
    fn default() -> Self {
        Self::idle()
    }
}

/// Lifecycle phase of one endpoint
///
/// `Fulfilled` and `Rejected` end a single invocation; the next action call
/// starts again from `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestPhase {
    /// Nothing requested yet
    Idle,
    /// A request is in flight
    Pending,
    /// The last request succeeded
    Fulfilled,
    /// The last request failed
    Rejected,
}

impl RequestPhase {
    /// Whether a request is in flight
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Whether the last request has settled, either way
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Rejected)
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Fulfilled => write!(f, "fulfilled"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// What a getter returns: the four request-state fields of one endpoint
///
/// Every field is `None` when the state handed to the getter has no slice for
/// the endpoint. For a present slice, `is_loading` and `has_error` are always
/// `Some`, while `error` and `data` mirror the slice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Computed<T> {
    /// Mirrors [`RequestState::is_loading`]
    pub is_loading: Option<bool>,
    /// Mirrors [`RequestState::has_error`]
    pub has_error: Option<bool>,
    /// Mirrors [`RequestState::error`]
    pub error: Option<RequestFailure>,
    /// Mirrors [`RequestState::data`]
    pub data: Option<T>,
}

impl<T: Clone> Computed<T> {
    /// Re-read the four fields of `slice`, tolerating a missing slice
    #[must_use]
    pub fn project(slice: Option<&RequestState<T>>) -> Self {
        slice.map_or_else(Self::undefined, |slice| Self {
            is_loading: Some(slice.is_loading),
            has_error: Some(slice.has_error),
            error: slice.error.clone(),
            data: slice.data.clone(),
        })
    }
}

impl<T> Computed<T> {
    /// View of a state that has no slice for the endpoint
    #[must_use]
    pub const fn undefined() -> Self {
        Self {
            is_loading: None,
            has_error: None,
            error: None,
            data: None,
        }
    }

    /// View of an idle slice
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            is_loading: Some(false),
            has_error: Some(false),
            error: None,
            data: None,
        }
    }

    /// Whether the view was read from an existing slice
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        self.is_loading.is_some()
    }
}

impl<T> From<RequestState<T>> for Computed<T> {
    fn from(state: RequestState<T>) -> Self {
        Self {
            is_loading: Some(state.is_loading),
            has_error: Some(state.has_error),
            error: state.error,
            data: state.data,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_constructors_satisfy_invariant() {
        assert!(RequestState::<u32>::idle().is_consistent());
        assert!(RequestState::<u32>::pending().is_consistent());
        assert!(RequestState::fulfilled(7).is_consistent());
        assert!(RequestState::<u32>::rejected(RequestFailure::msg("boom")).is_consistent());
    }

    #[test]
    fn test_inconsistent_state_detected() {
        let broken = RequestState {
            is_loading: true,
            has_error: false,
            error: None,
            data: Some(1),
        };
        assert!(!broken.is_consistent());

        let broken = RequestState::<u32> {
            is_loading: true,
            has_error: true,
            error: None,
            data: None,
        };
        assert!(!broken.is_consistent());
    }

    #[test]
    fn test_phases() {
        assert_eq!(RequestState::<u32>::idle().phase(), RequestPhase::Idle);
        assert_eq!(RequestState::<u32>::pending().phase(), RequestPhase::Pending);
        assert_eq!(RequestState::fulfilled(()).phase(), RequestPhase::Fulfilled);
        assert_eq!(
            RequestState::<()>::rejected(RequestFailure::msg("x")).phase(),
            RequestPhase::Rejected
        );
        assert!(RequestPhase::Pending.is_pending());
        assert!(RequestPhase::Rejected.is_settled());
        assert!(!RequestPhase::Idle.is_settled());
        assert_eq!(RequestPhase::Fulfilled.to_string(), "fulfilled");
    }

    #[test]
    fn test_reset_keeps_in_flight_slice() {
        let mut pending = RequestState::<u8>::pending();
        assert!(pending.reset_unless_loading());
        assert_eq!(pending, RequestState::pending());

        let mut settled = RequestState::<u8>::rejected(RequestFailure::msg("gone"));
        assert!(!settled.reset_unless_loading());
        assert_eq!(settled, RequestState::idle());
    }

    #[test]
    fn test_default_is_idle() {
        assert_eq!(RequestState::<String>::default(), RequestState::idle());
    }

    #[test]
    fn test_project_present_slice() {
        let slice = RequestState::fulfilled("done".to_string());
        let view = Computed::project(Some(&slice));
        assert_eq!(view.is_loading, Some(false));
        assert_eq!(view.has_error, Some(false));
        assert_eq!(view.error, None);
        assert_eq!(view.data.as_deref(), Some("done"));
        assert!(view.is_defined());
        assert_eq!(view, Computed::from(slice));
    }

    #[test]
    fn test_project_missing_slice_is_undefined() {
        let view = Computed::<String>::project(None);
        assert_eq!(view, Computed::undefined());
        assert!(!view.is_defined());
    }

    #[test]
    fn test_project_idle() {
        let view = Computed::project(Some(&RequestState::<u8>::idle()));
        assert_eq!(view, Computed::idle());
    }

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(RequestState::<u8>::rejected(RequestFailure::msg(
            "not found",
        )))
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "isLoading": false,
                "hasError": true,
                "error": "not found",
                "data": null,
            })
        );
    }

    #[derive(Clone, Debug)]
    enum Transition {
        Start,
        Succeed(u16),
        Fail(String),
    }

    fn transition() -> impl Strategy<Value = Transition> {
        prop_oneof![
            Just(Transition::Start),
            any::<u16>().prop_map(Transition::Succeed),
            "[a-z]{1,8}".prop_map(Transition::Fail),
        ]
    }

    proptest! {
        #[test]
        fn prop_wholesale_transitions_stay_consistent(
            steps in proptest::collection::vec(transition(), 0..32)
        ) {
            let mut state = RequestState::idle();
            for step in steps {
                state = match step {
                    Transition::Start => RequestState::pending(),
                    Transition::Succeed(value) => RequestState::fulfilled(value),
                    Transition::Fail(message) => RequestState::rejected(RequestFailure::msg(message)),
                };
                prop_assert!(state.is_consistent());
                let view = Computed::project(Some(&state));
                prop_assert_eq!(view.is_loading, Some(state.is_loading));
                prop_assert_eq!(view.data, state.data);
            }
        }
    }
}
