//! Inbound events consumed by the arbitration loop.

use tokio::sync::oneshot;

use crate::request::{CapabilityFilter, NetworkRequest, RequestId};

/// Mutation applied by [`Arbiter::handle`](crate::Arbiter::handle).
#[derive(Clone, Debug)]
pub enum Command {
    /// New or updated request with the score of its best currently-known network.
    Request { request: NetworkRequest, score: i32 },
    /// Request no longer exists.
    Cancel { id: RequestId },
    /// Provider announces a new self-score.
    SetProviderScore { score: i32 },
    /// Provider announces a new capability filter.
    SetCapabilityFilter { filter: CapabilityFilter },
    /// Re-evaluate every record against current state (acceptance inputs changed).
    Reevaluate,
}

/// Read-only question answered in queue order.
#[derive(Debug)]
pub(crate) enum Query {
    OutstandingCount(oneshot::Sender<usize>),
    Dump(oneshot::Sender<String>),
}

/// Envelope carried by the engine queue.
#[derive(Debug)]
pub(crate) enum Message {
    Command(Command),
    Query(Query),
    Shutdown,
}
