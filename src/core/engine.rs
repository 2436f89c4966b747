//! # Engine: single-consumer runtime around the [`Arbiter`].
//!
//! The [`Engine`] owns the arbiter, the inbound queue receiver and the event
//! bus. [`Engine::run`] is the only consumer of the queue: it takes one message
//! at a time and applies it to completion before taking the next, so the
//! arbiter needs no locking.
//!
//! ## High-level architecture
//! ```text
//! ArbiterHandle (many producers)
//!        │ Message::{Command, Query, Shutdown}
//!        ▼
//!   [mpsc queue, bounded, FIFO]
//!        ▼
//! Engine::run ──► Arbiter::handle(cmd) ──► LinkControl::activate / deactivate
//!        │                 │
//!        │                 └── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!        │
//!        └─ stop: token cancelled | Shutdown | all handles dropped
//!                 └─► Arbiter::release_all() ─► EngineStopped
//!           halt: ArbiterError from handle()
//!                 └─► EngineHalted ─► Err(RuntimeError::InvariantViolated)
//! ```
//!
//! ## Example
//! ```rust
//! use tokio_util::sync::CancellationToken;
//! use netarbiter::{Capabilities, CapabilityFilter, Engine, EngineConfig, NetworkRequest};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::builder(EngineConfig::named("wifi")).build();
//!     let handle = engine.handle();
//!     let join = engine.spawn(CancellationToken::new());
//!
//!     handle.set_capability_filter(CapabilityFilter::match_all()).await?;
//!     handle.set_provider_score(50).await?;
//!     handle.request(NetworkRequest::request(1, Capabilities::new()), 100).await?;
//!     assert_eq!(handle.outstanding_request_count().await?, 1);
//!
//!     handle.shutdown().await?;
//!     join.await??;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::arbiter::Arbiter;
use crate::core::builder::EngineBuilder;
use crate::core::command::{Message, Query};
use crate::core::config::EngineConfig;
use crate::core::handle::ArbiterHandle;
use crate::error::{ArbiterError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::policies::AcceptRef;
use crate::link::LinkRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Arbitration engine for one provider.
pub struct Engine {
    name: Arc<str>,
    arbiter: Arbiter,
    bus: Bus,
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl Engine {
    /// Starts building an engine with the given configuration.
    pub fn builder(cfg: EngineConfig) -> EngineBuilder {
        EngineBuilder::new(cfg)
    }

    pub(crate) fn new_internal(
        cfg: EngineConfig,
        accept: AcceptRef,
        link: LinkRef,
        subscribers: Vec<Arc<dyn Subscribe>>,
    ) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let (tx, rx) = mpsc::channel(cfg.queue_capacity_clamped());
        let arbiter = Arbiter::new(&cfg, accept, link, bus.clone());
        Self {
            name: cfg.name,
            arbiter,
            bus,
            tx,
            rx,
            subscribers,
        }
    }

    /// Returns a handle for enqueueing events.
    pub fn handle(&self) -> ArbiterHandle {
        ArbiterHandle::new(self.tx.clone())
    }

    /// Creates a receiver observing every event published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Runs the loop on a new tokio task.
    pub fn spawn(self, token: CancellationToken) -> JoinHandle<Result<(), RuntimeError>> {
        tokio::spawn(self.run(token))
    }

    /// Consumes events until the token is cancelled, a shutdown is requested,
    /// or every handle has been dropped; then releases all requests.
    ///
    /// Cancellation is checked before the queue on every turn. Messages still
    /// queued when the token fires are dropped unapplied, and their pending
    /// queries resolve to [`SubmitError::Closed`](crate::SubmitError::Closed).
    /// A [`Shutdown`](crate::ArbiterHandle::shutdown) message, in contrast, is
    /// ordered behind everything enqueued before it.
    ///
    /// Returns [`RuntimeError::InvariantViolated`] if the arbiter detected a bug;
    /// in that case the link is left as it was and nothing else is processed.
    pub async fn run(self, token: CancellationToken) -> Result<(), RuntimeError> {
        let Engine {
            name,
            mut arbiter,
            bus,
            tx,
            mut rx,
            subscribers,
        } = self;
        drop(tx);

        let listener = subscriber_listener(&bus, subscribers);
        info!(provider = %name, "engine started");
        bus.publish(Event::new(EventKind::EngineStarted).with_provider(name.clone()));

        let outcome = drive(&mut arbiter, &mut rx, &token)
            .await
            .and_then(|()| arbiter.release_all());
        rx.close();

        match &outcome {
            Ok(()) => {
                info!(provider = %name, "engine stopped");
                bus.publish(Event::new(EventKind::EngineStopped).with_provider(name.clone()));
            }
            Err(e) => {
                error!(provider = %name, label = e.as_label(), "engine halted: {e}");
                bus.publish(
                    Event::new(EventKind::EngineHalted)
                        .with_provider(name.clone())
                        .with_reason(e.to_string()),
                );
            }
        }

        if let Some(listener) = listener {
            let _ = listener.await;
        }
        outcome.map_err(RuntimeError::from)
    }
}

/// Applies queued messages until a stop condition; returns the first invariant violation.
async fn drive(
    arbiter: &mut Arbiter,
    rx: &mut mpsc::Receiver<Message>,
    token: &CancellationToken,
) -> Result<(), ArbiterError> {
    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => return Ok(()),
            msg = rx.recv() => match msg {
                Some(Message::Command(cmd)) => arbiter.handle(cmd)?,
                Some(Message::Query(query)) => answer(arbiter, query),
                Some(Message::Shutdown) | None => return Ok(()),
            }
        }
    }
}

fn answer(arbiter: &Arbiter, query: Query) {
    match query {
        Query::OutstandingCount(reply) => {
            let _ = reply.send(arbiter.outstanding_request_count());
        }
        Query::Dump(reply) => {
            let _ = reply.send(arbiter.dump());
        }
    }
}

/// Forwards bus events to the subscriber set until the loop's terminal event.
fn subscriber_listener(bus: &Bus, subscribers: Vec<Arc<dyn Subscribe>>) -> Option<JoinHandle<()>> {
    if subscribers.is_empty() {
        return None;
    }
    let mut rx = bus.subscribe();
    let set = SubscriberSet::new(subscribers, bus.clone());

    Some(tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(ev) => {
                    let terminal = ev.kind.is_terminal();
                    set.emit_arc(Arc::new(ev));
                    if terminal {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "subscriber listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        set.shutdown().await;
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::core::command::Command;
    use crate::error::SubmitError;
    use crate::link::LinkFn;
    use crate::request::{Capabilities, CapabilityFilter, NetworkRequest, RequestId};

    struct Counters {
        up: Arc<AtomicUsize>,
        down: Arc<AtomicUsize>,
    }

    fn recorded(cfg: EngineConfig) -> (Engine, Counters) {
        let up = Arc::new(AtomicUsize::new(0));
        let down = Arc::new(AtomicUsize::new(0));
        let (u, d) = (up.clone(), down.clone());
        let link = LinkFn::arc(
            "recorder",
            move || {
                u.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                d.fetch_add(1, Ordering::SeqCst);
            },
        );
        let cfg = EngineConfig {
            initial_filter: CapabilityFilter::match_all(),
            ..cfg
        };
        let engine = Engine::builder(cfg).with_link(link).build();
        (engine, Counters { up, down })
    }

    fn req(id: u64) -> NetworkRequest {
        NetworkRequest::request(id, Capabilities::new())
    }

    #[derive(Default)]
    struct Collect {
        kinds: Mutex<Vec<EventKind>>,
    }

    #[async_trait]
    impl Subscribe for Collect {
        async fn on_event(&self, event: &Event) {
            self.kinds.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "collect"
        }
    }

    #[tokio::test]
    async fn test_events_are_applied_in_enqueue_order() {
        let (engine, link) = recorded(EngineConfig::named("wifi"));
        let handle = engine.handle();
        let join = engine.spawn(CancellationToken::new());

        handle.set_provider_score(50).await.unwrap();
        handle.request(req(1), 100).await.unwrap();
        handle.request(req(2), 100).await.unwrap();
        handle.cancel(RequestId(1)).await.unwrap();
        assert_eq!(handle.outstanding_request_count().await.unwrap(), 1);
        assert_eq!(link.up.load(Ordering::SeqCst), 1);
        assert_eq!(link.down.load(Ordering::SeqCst), 0);

        handle.request(req(2), 10).await.unwrap();
        let dump = handle.dump().await.unwrap();
        assert!(dump.starts_with("Provider wifi score=50"), "{dump}");
        assert!(dump.contains("id=2, [ ] ] score=10 admitted=false"), "{dump}");
        assert_eq!(link.down.load(Ordering::SeqCst), 1);

        handle.shutdown().await.unwrap();
        join.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_releases_link_and_closes_handle() {
        let (engine, link) = recorded(EngineConfig::default());
        let handle = engine.handle();
        let join = engine.spawn(CancellationToken::new());

        handle.request(req(1), 10).await.unwrap();
        handle.request(req(2), 10).await.unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap().unwrap();

        assert_eq!(link.up.load(Ordering::SeqCst), 1);
        assert_eq!(link.down.load(Ordering::SeqCst), 1);
        assert!(handle.is_closed());
        assert_eq!(handle.cancel(RequestId(1)).await, Err(SubmitError::Closed));
        assert_eq!(
            handle.outstanding_request_count().await,
            Err(SubmitError::Closed)
        );
    }

    #[tokio::test]
    async fn test_dropping_all_handles_stops_loop() {
        let (engine, link) = recorded(EngineConfig::default());
        let handle = engine.handle();
        let join = engine.spawn(CancellationToken::new());

        handle.request(req(1), 10).await.unwrap();
        drop(handle);

        join.await.unwrap().unwrap();
        assert_eq!(link.down.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_token_cancellation_stops_loop() {
        let (engine, _link) = recorded(EngineConfig::default());
        let handle = engine.handle();
        let token = CancellationToken::new();
        let join = engine.spawn(token.clone());

        handle.request(req(1), 10).await.unwrap();
        assert_eq!(handle.outstanding_request_count().await.unwrap(), 1);
        token.cancel();

        join.await.unwrap().unwrap();
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_cancelled_token_drops_queued_commands() {
        let (engine, link) = recorded(EngineConfig::default());
        let handle = engine.handle();
        handle
            .try_submit(Command::Request {
                request: req(1),
                score: 10,
            })
            .unwrap();
        let token = CancellationToken::new();
        token.cancel();

        engine.run(token).await.unwrap();

        assert_eq!(link.up.load(Ordering::SeqCst), 0);
        assert_eq!(link.down.load(Ordering::SeqCst), 0);
        assert_eq!(
            handle.outstanding_request_count().await,
            Err(SubmitError::Closed)
        );
    }

    #[tokio::test]
    async fn test_try_submit_reports_back_pressure() {
        let (engine, _link) = recorded(EngineConfig {
            queue_capacity: 1,
            ..EngineConfig::default()
        });
        let handle = engine.handle();

        handle
            .try_submit(Command::SetProviderScore { score: 1 })
            .unwrap();
        assert_eq!(
            handle.try_submit(Command::SetProviderScore { score: 2 }),
            Err(SubmitError::Full)
        );

        drop(engine);
        assert_eq!(
            handle.try_submit(Command::Reevaluate),
            Err(SubmitError::Closed)
        );
    }

    #[tokio::test]
    async fn test_subscribers_see_full_lifecycle() {
        let collect = Arc::new(Collect::default());
        let engine = Engine::builder(EngineConfig {
            initial_filter: CapabilityFilter::match_all(),
            ..EngineConfig::default()
        })
        .with_subscribers(vec![collect.clone() as Arc<dyn Subscribe>])
        .build();
        let handle = engine.handle();
        let join = engine.spawn(CancellationToken::new());

        handle.request(req(1), 10).await.unwrap();
        handle.cancel(RequestId(1)).await.unwrap();
        handle.shutdown().await.unwrap();
        join.await.unwrap().unwrap();

        assert_eq!(
            *collect.kinds.lock().unwrap(),
            vec![
                EventKind::EngineStarted,
                EventKind::RequestAdmitted,
                EventKind::LinkActivated,
                EventKind::RequestEvicted,
                EventKind::LinkDeactivated,
                EventKind::RequestCancelled,
                EventKind::EngineStopped,
            ]
        );
    }

    #[tokio::test]
    async fn test_invariant_violation_halts_loop() {
        let (mut engine, link) = recorded(EngineConfig::default());
        engine.arbiter.on_request(req(1), -5).unwrap();
        engine.arbiter.force_admitted(RequestId(1), true);
        let mut events = engine.subscribe();
        let handle = engine.handle();
        let join = engine.spawn(CancellationToken::new());

        handle.reevaluate().await.unwrap();
        let err = join.await.unwrap().unwrap_err();

        assert!(matches!(
            err,
            RuntimeError::InvariantViolated(ArbiterError::CounterUnderflow)
        ));
        assert_eq!(link.down.load(Ordering::SeqCst), 0);
        assert!(handle.is_closed());

        let kinds: Vec<EventKind> = std::iter::from_fn(|| events.try_recv().ok())
            .map(|e| e.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::EngineStarted, EventKind::EngineHalted]);
    }
}
