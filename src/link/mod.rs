//! Link activation: the ref-counted start/stop side of the engine.
//!
//! ## Contents
//! - [`LinkControl`], [`LinkFn`], [`NoopLink`] outbound activate/deactivate contract
//! - [`LinkCounter`], [`Edge`] admitted-request count and its 0↔1 edges

mod control;
mod counter;

pub use control::{LinkControl, LinkFn, LinkRef, NoopLink};
pub use counter::{Edge, LinkCounter};
