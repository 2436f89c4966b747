//! Runtime core: arbitration state and the loop that drives it.
//!
//! Internal modules:
//! - [`arbiter`]: admission state machine, one command at a time;
//! - [`engine`]: single-consumer loop, stop and halt handling;
//! - [`handle`]: producer side of the bounded event queue;
//! - [`builder`]: wires policy, link and subscribers into an engine;
//! - [`command`]: inbound events and queries;
//! - [`config`]: engine settings.

mod arbiter;
mod builder;
mod command;
mod config;
mod engine;
mod handle;

pub use arbiter::Arbiter;
pub use builder::EngineBuilder;
pub use command::Command;
pub use config::EngineConfig;
pub use engine::Engine;
pub use handle::ArbiterHandle;
