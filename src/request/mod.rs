//! Request data model.
//!
//! ## Contents
//! - [`NetworkRequest`], [`RequestId`], [`RequestKind`] broker-announced requests
//! - [`Capabilities`], [`Transport`], [`NetCapability`] capability descriptors
//! - [`CapabilityFilter`] what a provider can possibly satisfy
//! - [`RequestStore`], [`RequestRecord`] per-request engine state

mod capabilities;
mod filter;
mod request;
mod store;

pub use capabilities::{Capabilities, NetCapability, Transport};
pub use filter::CapabilityFilter;
pub use request::{NetworkRequest, RequestId, RequestKind};
pub use store::{RequestRecord, RequestStore, Upsert};
