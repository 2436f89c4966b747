//! # Acceptance policies.
//!
//! [`Accept`] is the bearer-specific hook applied on top of generic score and
//! capability filtering: a request is only admitted if the policy accepts it.
//!
//! - [`AcceptAll`]: default, accepts everything.
//! - [`AcceptFn`]: wraps a closure `Fn(&NetworkRequest, i32) -> bool`.
//!
//! ## Contract
//! - Called on **every** evaluation of every request, including each global
//!   re-scan triggered by a provider score or filter change. Keep it cheap.
//! - Must be pure: no side effects, no blocking, no I/O.
//! - Receives the request's own score (best competing network), not the provider score.
//! - A panic is caught by the arbiter and counts as a rejection for that evaluation.
//!
//! ## Example
//! ```rust
//! use netarbiter::{Accept, AcceptFn, AcceptRef, Capabilities, NetworkRequest};
//!
//! // Only chase requests whose current best network is really poor.
//! let policy: AcceptRef = AcceptFn::arc("poor-only", |_req: &NetworkRequest, score: i32| score > 60);
//!
//! let req = NetworkRequest::request(1, Capabilities::new());
//! assert!(policy.accept(&req, 70));
//! assert!(!policy.accept(&req, 40));
//! assert_eq!(policy.name(), "poor-only");
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::request::NetworkRequest;

/// Shared handle to an acceptance policy.
pub type AcceptRef = Arc<dyn Accept>;

/// Bearer-specific admission predicate.
pub trait Accept: Send + Sync + 'static {
    /// Returns true if this provider should try to satisfy `request`.
    fn accept(&self, request: &NetworkRequest, score: i32) -> bool;

    /// Returns the policy name used in logs and events.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Accepts every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Accept for AcceptAll {
    fn accept(&self, _request: &NetworkRequest, _score: i32) -> bool {
        true
    }

    fn name(&self) -> &str {
        "accept-all"
    }
}

/// Closure-backed acceptance policy.
#[derive(Debug)]
pub struct AcceptFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> AcceptFn<F>
where
    F: Fn(&NetworkRequest, i32) -> bool + Send + Sync + 'static,
{
    /// Creates a new closure-backed policy.
    ///
    /// Prefer [`AcceptFn::arc`] when you immediately need an [`AcceptRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self { name: name.into(), f }
    }

    /// Creates the policy and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> Accept for AcceptFn<F>
where
    F: Fn(&NetworkRequest, i32) -> bool + Send + Sync + 'static,
{
    fn accept(&self, request: &NetworkRequest, score: i32) -> bool {
        (self.f)(request, score)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{Capabilities, RequestKind};

    #[test]
    fn test_accept_all() {
        let req = NetworkRequest::request(1, Capabilities::new());
        assert!(AcceptAll.accept(&req, i32::MIN));
        assert!(AcceptAll.accept(&req, i32::MAX));
        assert_eq!(AcceptAll.name(), "accept-all");
    }

    #[test]
    fn test_accept_fn_sees_request_and_score() {
        let policy = AcceptFn::new("no-background", |req: &NetworkRequest, _score: i32| {
            req.kind() != RequestKind::BackgroundRequest
        });
        let fg = NetworkRequest::request(1, Capabilities::new());
        let bg = NetworkRequest::new(2, RequestKind::BackgroundRequest, Capabilities::new());
        assert!(policy.accept(&fg, 0));
        assert!(!policy.accept(&bg, 0));
        assert_eq!(policy.name(), "no-background");
    }
}
