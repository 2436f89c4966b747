//! # Engine configuration.
//!
//! Provides [`EngineConfig`], centralized settings for one arbitration engine
//! (one provider).
//!
//! ## Sentinel values
//! - `queue_capacity = 0` → clamped to 1
//! - `bus_capacity = 0` → clamped to 1

use std::sync::Arc;

use crate::request::CapabilityFilter;

/// Configuration for one arbitration engine.
///
/// ## Field semantics
/// - `name`: provider label used in logs, events and `dump()`
/// - `queue_capacity`: bounded inbound event queue; `try_*` submissions fail with `Full` beyond it
/// - `bus_capacity`: event bus ring buffer size
/// - `initial_score`: provider score before the first `set_provider_score`
/// - `initial_filter`: capability filter before the first `set_capability_filter`
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Provider label.
    pub name: Arc<str>,

    /// Capacity of the inbound event queue.
    pub queue_capacity: usize,

    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging more than `bus_capacity` events skip the oldest ones.
    pub bus_capacity: usize,

    /// Provider score in effect until the provider announces one.
    pub initial_score: i32,

    /// Capability filter in effect until the provider announces one.
    pub initial_filter: CapabilityFilter,
}

impl EngineConfig {
    /// Creates a default configuration with the given provider label.
    pub fn named(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }

    /// Returns the bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for EngineConfig {
    /// Default configuration:
    ///
    /// - `name = "provider"`
    /// - `queue_capacity = 1024`
    /// - `bus_capacity = 1024`
    /// - `initial_score = 0`
    /// - `initial_filter = CapabilityFilter::default()` (offers nothing)
    fn default() -> Self {
        Self {
            name: Arc::from("provider"),
            queue_capacity: 1024,
            bus_capacity: 1024,
            initial_score: 0,
            initial_filter: CapabilityFilter::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamping() {
        let cfg = EngineConfig {
            queue_capacity: 0,
            bus_capacity: 0,
            ..EngineConfig::default()
        };
        assert_eq!(cfg.queue_capacity_clamped(), 1);
        assert_eq!(cfg.bus_capacity_clamped(), 1);
    }

    #[test]
    fn test_named_keeps_defaults() {
        let cfg = EngineConfig::named("cell");
        assert_eq!(&*cfg.name, "cell");
        assert_eq!(cfg.queue_capacity, 1024);
        assert_eq!(cfg.initial_filter, CapabilityFilter::default());
    }
}
