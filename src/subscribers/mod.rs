//! # Event subscribers for the arbitration engine.
//!
//! This module provides the [`Subscribe`] trait and the [`SubscriberSet`]
//! fan-out used to deliver events published on the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Arbiter ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                    ┌─────────┼─────────┐
//!                                                    ▼         ▼         ▼
//!                                                LogWriter  Metrics   Custom
//! ```
//!
//! ## Optional
//! - `logging` feature: exports [`LogWriter`], which renders events through `tracing`.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscriber;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscriber::Subscribe;
