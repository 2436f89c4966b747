use std::sync::Arc;

use crate::{
    core::{EngineConfig, engine::Engine},
    link::{LinkRef, NoopLink},
    policies::{AcceptAll, AcceptRef},
    subscribers::Subscribe,
};

/// Builder for constructing an [`Engine`] with optional collaborators.
pub struct EngineBuilder {
    cfg: EngineConfig,
    accept: AcceptRef,
    link: LinkRef,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl EngineBuilder {
    /// Creates a new builder with [`AcceptAll`] and [`NoopLink`].
    pub fn new(cfg: EngineConfig) -> Self {
        Self {
            cfg,
            accept: Arc::new(AcceptAll),
            link: Arc::new(NoopLink),
            subscribers: Vec::new(),
        }
    }

    /// Sets the provider's acceptance predicate.
    pub fn with_accept(mut self, accept: AcceptRef) -> Self {
        self.accept = accept;
        self
    }

    /// Sets the link control that receives activate/deactivate edges.
    pub fn with_link(mut self, link: LinkRef) -> Self {
        self.link = link;
        self
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive engine events through dedicated workers with bounded
    /// queues; they are started when the engine starts running.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the engine. Nothing runs until [`Engine::run`] or [`Engine::spawn`].
    pub fn build(self) -> Engine {
        Engine::new_internal(self.cfg, self.accept, self.link, self.subscribers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::AcceptFn;
    use crate::request::NetworkRequest;

    #[test]
    fn test_build_outside_runtime() {
        let engine = EngineBuilder::new(EngineConfig::named("eth"))
            .with_accept(AcceptFn::arc("none", |_: &NetworkRequest, _: i32| false))
            .build();
        assert!(!engine.handle().is_closed());
    }
}
