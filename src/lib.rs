//! # netarbiter
//!
//! **netarbiter** decides, for one network provider, which outstanding network
//! requests it should serve, and keeps the provider's link up exactly while at
//! least one request is being served.
//!
//! Requests arrive with the score of the best network currently satisfying them.
//! The provider announces its own score and a capability filter. A request is
//! admitted when the provider would beat the current best network, the filter
//! accepts the request's capabilities, and the provider's acceptance predicate
//! agrees. The admitted-request count drives a link: `0 → 1` activates it,
//! `1 → 0` deactivates it.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  broker / provider code
//!     │ request · cancel · set_provider_score · set_capability_filter · reevaluate
//!     ▼
//! ┌──────────────────┐   bounded FIFO   ┌──────────────────────────────────────┐
//! │  ArbiterHandle   │ ───────────────► │ Engine::run (single consumer)        │
//! │  (clone freely)  │ ◄─── oneshot ─── │   └─► Arbiter                        │
//! └──────────────────┘   (queries)      │        - RequestStore (ascending ids) │
//!                                       │        - CapabilityFilter            │
//!                                       │        - Accept predicate            │
//!                                       │        - LinkCounter ──► LinkControl │
//!                                       └──────────────┬───────────────────────┘
//!                                                      │ publish
//!                                                      ▼
//!                                   ┌────────────────────────────────────┐
//!                                   │      Bus (broadcast channel)       │
//!                                   │ (capacity: EngineConfig::bus_cap.) │
//!                                   └───────┬───────────────────┬────────┘
//!                                           ▼                   ▼
//!                                 subscriber_listener   Engine::subscribe()
//!                                           ▼
//!                                     SubscriberSet
//!                                  ┌────────┼────────┐
//!                                  ▼        ▼        ▼
//!                               worker1  worker2  workerN
//! ```
//!
//! ### Admission rule
//! ```text
//! eligible(r) = r.score > provider_score
//!            && filter.matches(r.capabilities)
//!            && accept(r.request, r.score)
//!
//! pending  + eligible     ─► admit  (count += 1, 0→1 activates the link)
//! admitted + not eligible ─► evict  (count -= 1, 1→0 deactivates the link)
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                                |
//! |-------------------|----------------------------------------------------------|---------------------------------------------------|
//! | **Requests**      | Request descriptors, capabilities and filters.           | [`NetworkRequest`], [`Capabilities`], [`CapabilityFilter`] |
//! | **Arbitration**   | Admission state machine, usable without a runtime.       | [`Arbiter`], [`Command`]                          |
//! | **Runtime**       | Single-consumer loop with a bounded queue.               | [`Engine`], [`ArbiterHandle`], [`EngineBuilder`]  |
//! | **Policies**      | Provider acceptance predicate.                           | [`Accept`], [`AcceptFn`]                          |
//! | **Link**          | Reference-counted link activation.                       | [`LinkControl`], [`LinkFn`], [`LinkCounter`]      |
//! | **Subscriber API**| Hook into admission and link events.                     | [`Subscribe`], [`Event`]                          |
//! | **Errors**        | Typed errors for invariants, submission and the loop.    | [`ArbiterError`], [`SubmitError`], [`RuntimeError`] |
//! | **Configuration** | Centralize engine settings.                              | [`EngineConfig`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] subscriber that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use netarbiter::{
//!     Capabilities, CapabilityFilter, Engine, EngineConfig, LinkFn, NetCapability, NetworkRequest,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn netarbiter::Subscribe>> = vec![Arc::new(netarbiter::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn netarbiter::Subscribe>> = Vec::new();
//!
//!     let link = LinkFn::arc("wifi", || println!("link up"), || println!("link down"));
//!     let engine = Engine::builder(EngineConfig::named("wifi"))
//!         .with_link(link)
//!         .with_subscribers(subs)
//!         .build();
//!     let handle = engine.handle();
//!     let join = engine.spawn(CancellationToken::new());
//!
//!     let offer = Capabilities::new().with_capability(NetCapability::Internet);
//!     handle.set_capability_filter(CapabilityFilter::offering(offer)).await?;
//!     handle.set_provider_score(60).await?;
//!
//!     let wants = Capabilities::new().with_capability(NetCapability::Internet);
//!     handle.request(NetworkRequest::request(1, wants), 100).await?;
//!     assert_eq!(handle.outstanding_request_count().await?, 1);
//!
//!     handle.shutdown().await?;
//!     join.await??;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod link;
mod policies;
mod request;
mod subscribers;

// ---- Public re-exports ----

pub use core::{Arbiter, ArbiterHandle, Command, Engine, EngineBuilder, EngineConfig};
pub use error::{ArbiterError, RuntimeError, SubmitError};
pub use events::{Bus, Event, EventKind};
pub use link::{Edge, LinkControl, LinkCounter, LinkFn, LinkRef, NoopLink};
pub use policies::{Accept, AcceptAll, AcceptFn, AcceptRef};
pub use request::{
    Capabilities, CapabilityFilter, NetCapability, NetworkRequest, RequestId, RequestKind,
    RequestRecord, RequestStore, Transport, Upsert,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a built-in logging subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
