//! Admission policies.
//!
//! This module groups the bearer-specific knob that decides **whether** a
//! request that already passed score and capability filtering is admitted.
//!
//! ## Contents
//! - [`Accept`]    the acceptance predicate trait
//! - [`AcceptAll`] default policy (always accept)
//! - [`AcceptFn`]  closure adapter
//!
//! ## Quick wiring
//! ```text
//! EngineBuilder::with_accept(AcceptRef)
//!      └─► core::Arbiter evaluates:
//!           score > provider_score && filter.matches(caps) && accept(request, score)
//! ```

mod accept;

pub use accept::{Accept, AcceptAll, AcceptFn, AcceptRef};
