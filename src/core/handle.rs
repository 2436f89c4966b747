//! # Producer-side handle to a running engine.
//!
//! [`ArbiterHandle`] is the only way code outside the loop talks to the engine.
//! It never touches engine state: every call enqueues a message on the bounded
//! FIFO queue and the loop applies it later, strictly in enqueue order.
//!
//! ```text
//! broker / provider code (any task)
//!     │  request / cancel / set_provider_score / set_capability_filter
//!     ▼
//! ArbiterHandle ──► [mpsc queue] ──► Engine::run ──► Arbiter::handle
//!     ▲                                   │
//!     └──── oneshot reply ◄───────────────┘  (outstanding_request_count / dump)
//! ```
//!
//! - `async` methods wait for queue capacity.
//! - [`ArbiterHandle::try_submit`] fails fast with [`SubmitError::Full`].
//! - Once the loop has exited every call fails with [`SubmitError::Closed`].

use tokio::sync::{mpsc, oneshot};

use crate::core::command::{Command, Message, Query};
use crate::error::SubmitError;
use crate::request::{CapabilityFilter, NetworkRequest, RequestId};

/// Cloneable handle for enqueueing events to an engine.
#[derive(Clone, Debug)]
pub struct ArbiterHandle {
    tx: mpsc::Sender<Message>,
}

impl ArbiterHandle {
    pub(crate) fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Enqueues a command (async, waits if the queue is full).
    pub async fn submit(&self, cmd: Command) -> Result<(), SubmitError> {
        self.send(Message::Command(cmd)).await
    }

    /// Enqueues a command without waiting (fails if the queue is full).
    pub fn try_submit(&self, cmd: Command) -> Result<(), SubmitError> {
        self.tx
            .try_send(Message::Command(cmd))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => SubmitError::Full,
                mpsc::error::TrySendError::Closed(_) => SubmitError::Closed,
            })
    }

    /// New or updated request with the score of its best currently-known network.
    pub async fn request(&self, request: NetworkRequest, score: i32) -> Result<(), SubmitError> {
        self.submit(Command::Request { request, score }).await
    }

    /// Request no longer exists.
    pub async fn cancel(&self, id: RequestId) -> Result<(), SubmitError> {
        self.submit(Command::Cancel { id }).await
    }

    /// Provider announces a new self-score.
    pub async fn set_provider_score(&self, score: i32) -> Result<(), SubmitError> {
        self.submit(Command::SetProviderScore { score }).await
    }

    /// Provider announces a new capability filter.
    pub async fn set_capability_filter(&self, filter: CapabilityFilter) -> Result<(), SubmitError> {
        self.submit(Command::SetCapabilityFilter { filter }).await
    }

    /// Asks the engine to re-evaluate every request (acceptance inputs changed).
    pub async fn reevaluate(&self) -> Result<(), SubmitError> {
        self.submit(Command::Reevaluate).await
    }

    /// Number of live requests, observed after every previously enqueued event.
    pub async fn outstanding_request_count(&self) -> Result<usize, SubmitError> {
        let (tx, rx) = oneshot::channel();
        self.send(Message::Query(Query::OutstandingCount(tx))).await?;
        rx.await.map_err(|_| SubmitError::Closed)
    }

    /// Human-readable dump, observed after every previously enqueued event.
    pub async fn dump(&self) -> Result<String, SubmitError> {
        let (tx, rx) = oneshot::channel();
        self.send(Message::Query(Query::Dump(tx))).await?;
        rx.await.map_err(|_| SubmitError::Closed)
    }

    /// Asks the loop to release every request and stop (provider unregisters).
    pub async fn shutdown(&self) -> Result<(), SubmitError> {
        self.send(Message::Shutdown).await
    }

    /// Returns true once the loop has stopped consuming.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send(&self, msg: Message) -> Result<(), SubmitError> {
        self.tx.send(msg).await.map_err(|_| SubmitError::Closed)
    }
}
