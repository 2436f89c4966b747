//! # Provider capability filter.
//!
//! A [`CapabilityFilter`] describes which requests a provider could possibly
//! satisfy. It is either **match-all** or an **offer** (a [`Capabilities`]
//! descriptor checked with [`Capabilities::satisfies`]).
//!
//! ```text
//! CapabilityFilter::match_all()          → every request passes
//! CapabilityFilter::offering(caps)       → caps.satisfies(request.capabilities())
//! CapabilityFilter::default()            → offers nothing; only unconstrained requests pass
//! ```

use std::fmt;

use super::capabilities::Capabilities;

/// Which capability requirements a provider can possibly satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapabilityFilter {
    offer: Option<Capabilities>,
}

impl CapabilityFilter {
    /// Filter that every request passes.
    #[must_use]
    pub fn match_all() -> Self {
        Self { offer: None }
    }

    /// Filter that passes requests whose requirements `offer` satisfies.
    #[must_use]
    pub fn offering(offer: Capabilities) -> Self {
        Self { offer: Some(offer) }
    }

    /// Returns true if this filter accepts every request.
    #[inline]
    pub fn is_match_all(&self) -> bool {
        self.offer.is_none()
    }

    /// Returns the offered descriptor (`None` for match-all).
    pub fn offer(&self) -> Option<&Capabilities> {
        self.offer.as_ref()
    }

    /// Returns true if a request requiring `required` passes this filter.
    pub fn matches(&self, required: &Capabilities) -> bool {
        match &self.offer {
            None => true,
            Some(offer) => offer.satisfies(required),
        }
    }
}

impl Default for CapabilityFilter {
    /// Offers nothing: only requests without any requirement pass.
    fn default() -> Self {
        Self::offering(Capabilities::new())
    }
}

impl fmt::Display for CapabilityFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.offer {
            None => f.write_str("<match-all>"),
            Some(offer) => offer.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::capabilities::{NetCapability, Transport};

    #[test]
    fn test_match_all_passes_everything() {
        let f = CapabilityFilter::match_all();
        let want = Capabilities::new()
            .with_transport(Transport::Vpn)
            .with_capability(NetCapability::Ims)
            .with_specifier("x")
            .with_link_up_kbps(u32::MAX);
        assert!(f.is_match_all());
        assert!(f.matches(&want));
    }

    #[test]
    fn test_default_passes_only_unconstrained() {
        let f = CapabilityFilter::default();
        assert!(!f.is_match_all());
        assert!(f.matches(&Capabilities::new()));
        assert!(!f.matches(&Capabilities::new().with_capability(NetCapability::Internet)));
    }

    #[test]
    fn test_offering_delegates_to_satisfies() {
        let f = CapabilityFilter::offering(
            Capabilities::new()
                .with_transport(Transport::Cellular)
                .with_capability(NetCapability::Internet),
        );
        assert!(f.matches(&Capabilities::new().with_capability(NetCapability::Internet)));
        assert!(!f.matches(&Capabilities::new().with_transport(Transport::Wifi)));
        assert_eq!(f.to_string(), "[ Transports: CELLULAR Capabilities: INTERNET ]");
        assert_eq!(CapabilityFilter::match_all().to_string(), "<match-all>");
    }
}
