//! # Link control collaborator.
//!
//! [`LinkControl`] is the outbound side of the engine: it is told to bring the
//! underlying link up when the first request is admitted and down when the
//! last admitted request goes away. Bring-up itself (radio, tunnel, ...) and
//! any timeouts belong to the implementation, not to the engine.
//!
//! The arbiter calls these methods from its event loop, so implementations
//! must return quickly (hand the work off to another task if needed).
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use netarbiter::{LinkControl, LinkFn, LinkRef};
//!
//! let up = Arc::new(AtomicBool::new(false));
//! let (a, d) = (up.clone(), up.clone());
//! let link: LinkRef = LinkFn::arc(
//!     "wifi",
//!     move || a.store(true, Ordering::SeqCst),
//!     move || d.store(false, Ordering::SeqCst),
//! );
//!
//! link.activate();
//! assert!(up.load(Ordering::SeqCst));
//! link.deactivate();
//! assert!(!up.load(Ordering::SeqCst));
//! ```

use std::borrow::Cow;
use std::sync::Arc;

/// Shared handle to a link controller.
pub type LinkRef = Arc<dyn LinkControl>;

/// Start/stop contract for the underlying network resource.
///
/// Called exactly on the 0→1 (`activate`) and 1→0 (`deactivate`) edges of the
/// admitted-request count, never otherwise.
pub trait LinkControl: Send + Sync + 'static {
    /// Bring the link up.
    fn activate(&self);

    /// Tear the link down.
    fn deactivate(&self);

    /// Returns the controller name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Controller that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopLink;

impl LinkControl for NoopLink {
    fn activate(&self) {}

    fn deactivate(&self) {}

    fn name(&self) -> &str {
        "noop"
    }
}

/// Closure-backed link controller.
#[derive(Debug)]
pub struct LinkFn<A, D> {
    name: Cow<'static, str>,
    activate: A,
    deactivate: D,
}

impl<A, D> LinkFn<A, D>
where
    A: Fn() + Send + Sync + 'static,
    D: Fn() + Send + Sync + 'static,
{
    /// Creates a new closure-backed controller.
    pub fn new(name: impl Into<Cow<'static, str>>, activate: A, deactivate: D) -> Self {
        Self {
            name: name.into(),
            activate,
            deactivate,
        }
    }

    /// Creates the controller and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, activate: A, deactivate: D) -> Arc<Self> {
        Arc::new(Self::new(name, activate, deactivate))
    }
}

impl<A, D> LinkControl for LinkFn<A, D>
where
    A: Fn() + Send + Sync + 'static,
    D: Fn() + Send + Sync + 'static,
{
    fn activate(&self) {
        (self.activate)()
    }

    fn deactivate(&self) {
        (self.deactivate)()
    }

    fn name(&self) -> &str {
        &self.name
    }
}
