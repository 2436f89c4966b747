//! # Events emitted by the arbitration engine.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Admission events**: per-request transitions (admitted, evicted, cancelled, ignored)
//! - **Provider events**: provider score / capability filter changes
//! - **Link events**: the 0↔1 edges of the admitted-request count
//! - **Engine events**: start, stop, halt, predicate and subscriber failures
//!
//! The [`Event`] struct carries metadata such as timestamps, request id, score,
//! link count and reasons.
//!
//! Per-request admit/evict events are published *before* the ref-counted link
//! edge they may cause, so a consumer that wants per-request granularity sees
//! every transition.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use netarbiter::{Event, EventKind, RequestId};
//!
//! let ev = Event::new(EventKind::RequestAdmitted)
//!     .with_provider("wifi")
//!     .with_request(RequestId(7))
//!     .with_score(100)
//!     .with_count(1);
//!
//! assert_eq!(ev.kind, EventKind::RequestAdmitted);
//! assert_eq!(ev.request, Some(RequestId(7)));
//! assert_eq!(ev.provider.as_deref(), Some("wifi"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::request::RequestId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of engine events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Admission events ===
    /// Request went PENDING → ADMITTED.
    ///
    /// Sets:
    /// - `request`: request id
    /// - `score`: request score at admission
    /// - `count`: admitted count after the transition
    RequestAdmitted,

    /// Request went ADMITTED → PENDING.
    ///
    /// Sets:
    /// - `request`: request id
    /// - `score`: request score at eviction
    /// - `count`: admitted count after the transition
    RequestEvicted,

    /// Request record removed after a cancel.
    ///
    /// Sets:
    /// - `request`: request id
    RequestCancelled,

    /// Request of a non-arbitrated kind (listen, track-default) was ignored.
    ///
    /// Sets:
    /// - `request`: request id
    /// - `reason`: request kind
    RequestIgnored,

    // === Provider events ===
    /// Provider score changed; all records re-evaluated.
    ///
    /// Sets:
    /// - `score`: new provider score
    ProviderScoreChanged,

    /// Capability filter changed; all records re-evaluated.
    ///
    /// Sets:
    /// - `reason`: rendered filter
    CapabilityFilterChanged,

    // === Link events ===
    /// Admitted count went 0 → 1; link activated.
    LinkActivated,

    /// Admitted count went 1 → 0; link deactivated.
    LinkDeactivated,

    // === Engine events ===
    /// Acceptance policy panicked; the request was treated as rejected.
    ///
    /// Sets:
    /// - `request`: request id
    /// - `reason`: panic message
    PredicatePanicked,

    /// Engine loop started consuming events.
    EngineStarted,

    /// Engine loop stopped normally (cancelled, shut down, or all handles dropped).
    EngineStopped,

    /// Engine loop halted on an invariant violation.
    ///
    /// Sets:
    /// - `reason`: error message
    EngineHalted,

    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: `subscriber=<name> info=<panic>`
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: `subscriber=<name> reason=<full|closed>`
    SubscriberOverflow,
}

impl EventKind {
    /// Returns true for the last event a loop publishes.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, EventKind::EngineStopped | EventKind::EngineHalted)
    }
}

/// Engine event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Provider label of the emitting engine.
    pub provider: Option<Arc<str>>,
    /// Request the event is about, if any.
    pub request: Option<RequestId>,
    /// Request score or provider score, depending on the kind.
    pub score: Option<i32>,
    /// Admitted count after the transition.
    pub count: Option<usize>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            provider: None,
            request: None,
            score: None,
            count: None,
            reason: None,
        }
    }

    #[inline]
    pub fn with_provider(mut self, provider: impl Into<Arc<str>>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    #[inline]
    pub fn with_request(mut self, id: RequestId) -> Self {
        self.request = Some(id);
        self
    }

    #[inline]
    pub fn with_score(mut self, score: i32) -> Self {
        self.score = Some(score);
        self
    }

    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }
}
