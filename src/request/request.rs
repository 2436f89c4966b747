//! # Network requests as announced by the broker.
//!
//! A [`NetworkRequest`] pairs a broker-assigned [`RequestId`] with an immutable
//! capability descriptor and a [`RequestKind`]. Only arbitrated kinds
//! ([`RequestKind::Request`], [`RequestKind::BackgroundRequest`]) take part in
//! admission; listen-style kinds are ignored by the engine.

use std::fmt;
use std::sync::Arc;

use super::capabilities::Capabilities;

/// Broker-assigned request identifier. Unique and never reused while the request is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl From<u64> for RequestId {
    fn from(v: u64) -> Self {
        RequestId(v)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the requester expects from the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// Wants exactly one satisfying network.
    Request,
    /// Like `Request`, but satisfied by a background network.
    BackgroundRequest,
    /// Informational: observes matching networks, never asks for one.
    Listen,
    /// Informational: follows the system default network.
    TrackDefault,
}

impl RequestKind {
    /// Returns true if requests of this kind are subject to admission.
    #[inline]
    pub fn is_arbitrated(self) -> bool {
        matches!(self, RequestKind::Request | RequestKind::BackgroundRequest)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::Request => "REQUEST",
            RequestKind::BackgroundRequest => "BACKGROUND_REQUEST",
            RequestKind::Listen => "LISTEN",
            RequestKind::TrackDefault => "TRACK_DEFAULT",
        }
    }
}

/// Immutable request: identifier, kind and required capabilities.
///
/// Cloning is cheap (the descriptor is shared).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetworkRequest {
    id: RequestId,
    kind: RequestKind,
    capabilities: Arc<Capabilities>,
}

impl NetworkRequest {
    /// Creates a request of the given kind.
    pub fn new(id: impl Into<RequestId>, kind: RequestKind, capabilities: Capabilities) -> Self {
        Self {
            id: id.into(),
            kind,
            capabilities: Arc::new(capabilities),
        }
    }

    /// Convenience: single-network request.
    #[inline]
    pub fn request(id: impl Into<RequestId>, capabilities: Capabilities) -> Self {
        Self::new(id, RequestKind::Request, capabilities)
    }

    /// Convenience: listen-only request.
    #[inline]
    pub fn listen(id: impl Into<RequestId>, capabilities: Capabilities) -> Self {
        Self::new(id, RequestKind::Listen, capabilities)
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl fmt::Display for NetworkRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NetworkRequest [ {} id={}, {} ]",
            self.kind.as_str(),
            self.id,
            self.capabilities
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::capabilities::NetCapability;

    #[test]
    fn test_only_request_kinds_are_arbitrated() {
        assert!(RequestKind::Request.is_arbitrated());
        assert!(RequestKind::BackgroundRequest.is_arbitrated());
        assert!(!RequestKind::Listen.is_arbitrated());
        assert!(!RequestKind::TrackDefault.is_arbitrated());
    }

    #[test]
    fn test_display() {
        let r = NetworkRequest::request(
            7,
            Capabilities::new().with_capability(NetCapability::Internet),
        );
        assert_eq!(
            r.to_string(),
            "NetworkRequest [ REQUEST id=7, [ Capabilities: INTERNET ] ]"
        );
    }
}
