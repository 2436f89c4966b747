//! Engine events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the arbitration loop, the engine
//! runtime and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Arbiter` (admission, provider and link events),
//!   `Engine::run` (start/stop/halt), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by `Engine::run` (fans out to
//!   `SubscriberSet`), and any receiver from `Engine::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
