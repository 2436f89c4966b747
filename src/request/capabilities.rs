//! # Capability descriptors.
//!
//! [`Capabilities`] describes what a request requires (or, inside a
//! [`CapabilityFilter`](crate::CapabilityFilter), what a provider can offer):
//! - a set of [`Transport`]s,
//! - a set of [`NetCapability`] flags,
//! - optional minimum link bandwidths (kbps),
//! - an optional opaque network specifier.
//!
//! Transports and capabilities are stored as `bitflags` sets; the descriptor is
//! cheap to clone apart from the specifier, which is an `Arc<str>`.
//!
//! ## Example
//! ```rust
//! use netarbiter::{Capabilities, NetCapability, Transport};
//!
//! let caps = Capabilities::new()
//!     .with_transport(Transport::Wifi)
//!     .with_capability(NetCapability::Internet)
//!     .with_link_down_kbps(1_000);
//!
//! assert!(caps.has_transport(Transport::Wifi));
//! assert!(caps.has_capability(NetCapability::Internet));
//! assert!(!caps.has_capability(NetCapability::NotMetered));
//! ```

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;

/// Bearer technology a network runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Transport {
    Cellular = 0,
    Wifi = 1,
    Bluetooth = 2,
    Ethernet = 3,
    Vpn = 4,
    WifiAware = 5,
    Lowpan = 6,
}

impl Transport {
    /// Every transport, in bit order.
    pub const ALL: [Transport; 7] = [
        Transport::Cellular,
        Transport::Wifi,
        Transport::Bluetooth,
        Transport::Ethernet,
        Transport::Vpn,
        Transport::WifiAware,
        Transport::Lowpan,
    ];

    #[inline]
    fn bit(self) -> TransportSet {
        TransportSet::from_bits_retain(1 << (self as u8))
    }

    /// Returns a short stable name (upper snake case).
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::Cellular => "CELLULAR",
            Transport::Wifi => "WIFI",
            Transport::Bluetooth => "BLUETOOTH",
            Transport::Ethernet => "ETHERNET",
            Transport::Vpn => "VPN",
            Transport::WifiAware => "WIFI_AWARE",
            Transport::Lowpan => "LOWPAN",
        }
    }
}

/// Property a network offers or a request requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum NetCapability {
    Mms = 0,
    Supl = 1,
    Dun = 2,
    Fota = 3,
    Ims = 4,
    Cbs = 5,
    WifiP2p = 6,
    Ia = 7,
    Rcs = 8,
    Xcap = 9,
    Eims = 10,
    NotMetered = 11,
    Internet = 12,
    NotRestricted = 13,
    Trusted = 14,
    NotVpn = 15,
    Validated = 16,
    CaptivePortal = 17,
    NotRoaming = 18,
    Foreground = 19,
    NotCongested = 20,
    NotSuspended = 21,
}

impl NetCapability {
    /// Every capability, in bit order.
    pub const ALL: [NetCapability; 22] = [
        NetCapability::Mms,
        NetCapability::Supl,
        NetCapability::Dun,
        NetCapability::Fota,
        NetCapability::Ims,
        NetCapability::Cbs,
        NetCapability::WifiP2p,
        NetCapability::Ia,
        NetCapability::Rcs,
        NetCapability::Xcap,
        NetCapability::Eims,
        NetCapability::NotMetered,
        NetCapability::Internet,
        NetCapability::NotRestricted,
        NetCapability::Trusted,
        NetCapability::NotVpn,
        NetCapability::Validated,
        NetCapability::CaptivePortal,
        NetCapability::NotRoaming,
        NetCapability::Foreground,
        NetCapability::NotCongested,
        NetCapability::NotSuspended,
    ];

    #[inline]
    fn bit(self) -> CapabilitySet {
        CapabilitySet::from_bits_retain(1 << (self as u8))
    }

    /// Returns a short stable name (upper snake case).
    pub fn as_str(self) -> &'static str {
        match self {
            NetCapability::Mms => "MMS",
            NetCapability::Supl => "SUPL",
            NetCapability::Dun => "DUN",
            NetCapability::Fota => "FOTA",
            NetCapability::Ims => "IMS",
            NetCapability::Cbs => "CBS",
            NetCapability::WifiP2p => "WIFI_P2P",
            NetCapability::Ia => "IA",
            NetCapability::Rcs => "RCS",
            NetCapability::Xcap => "XCAP",
            NetCapability::Eims => "EIMS",
            NetCapability::NotMetered => "NOT_METERED",
            NetCapability::Internet => "INTERNET",
            NetCapability::NotRestricted => "NOT_RESTRICTED",
            NetCapability::Trusted => "TRUSTED",
            NetCapability::NotVpn => "NOT_VPN",
            NetCapability::Validated => "VALIDATED",
            NetCapability::CaptivePortal => "CAPTIVE_PORTAL",
            NetCapability::NotRoaming => "NOT_ROAMING",
            NetCapability::Foreground => "FOREGROUND",
            NetCapability::NotCongested => "NOT_CONGESTED",
            NetCapability::NotSuspended => "NOT_SUSPENDED",
        }
    }
}

bitflags! {
    /// Transport bits, indexed by [`Transport`] discriminant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    struct TransportSet: u32 {
        const CELLULAR   = 1 << 0;
        const WIFI       = 1 << 1;
        const BLUETOOTH  = 1 << 2;
        const ETHERNET   = 1 << 3;
        const VPN        = 1 << 4;
        const WIFI_AWARE = 1 << 5;
        const LOWPAN     = 1 << 6;
    }
}

bitflags! {
    /// Capability bits, indexed by [`NetCapability`] discriminant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    struct CapabilitySet: u64 {
        const MMS            = 1 << 0;
        const SUPL           = 1 << 1;
        const DUN            = 1 << 2;
        const FOTA           = 1 << 3;
        const IMS            = 1 << 4;
        const CBS            = 1 << 5;
        const WIFI_P2P       = 1 << 6;
        const IA             = 1 << 7;
        const RCS            = 1 << 8;
        const XCAP           = 1 << 9;
        const EIMS           = 1 << 10;
        const NOT_METERED    = 1 << 11;
        const INTERNET       = 1 << 12;
        const NOT_RESTRICTED = 1 << 13;
        const TRUSTED        = 1 << 14;
        const NOT_VPN        = 1 << 15;
        const VALIDATED      = 1 << 16;
        const CAPTIVE_PORTAL = 1 << 17;
        const NOT_ROAMING    = 1 << 18;
        const FOREGROUND     = 1 << 19;
        const NOT_CONGESTED  = 1 << 20;
        const NOT_SUSPENDED  = 1 << 21;
    }
}

/// Capability descriptor: transports, capability flags, bandwidth and specifier.
///
/// The empty descriptor (`Capabilities::new()` / `Default`) requires nothing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    transports: TransportSet,
    capabilities: CapabilitySet,
    link_up_kbps: u32,
    link_down_kbps: u32,
    specifier: Option<Arc<str>>,
}

impl Capabilities {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transport.
    #[inline]
    #[must_use]
    pub fn with_transport(mut self, t: Transport) -> Self {
        self.transports |= t.bit();
        self
    }

    /// Adds a capability flag.
    #[inline]
    #[must_use]
    pub fn with_capability(mut self, c: NetCapability) -> Self {
        self.capabilities |= c.bit();
        self
    }

    /// Sets the upstream bandwidth (kbps).
    #[inline]
    #[must_use]
    pub fn with_link_up_kbps(mut self, kbps: u32) -> Self {
        self.link_up_kbps = kbps;
        self
    }

    /// Sets the downstream bandwidth (kbps).
    #[inline]
    #[must_use]
    pub fn with_link_down_kbps(mut self, kbps: u32) -> Self {
        self.link_down_kbps = kbps;
        self
    }

    /// Attaches an opaque network specifier.
    #[inline]
    #[must_use]
    pub fn with_specifier(mut self, specifier: impl Into<Arc<str>>) -> Self {
        self.specifier = Some(specifier.into());
        self
    }

    #[inline]
    pub fn has_transport(&self, t: Transport) -> bool {
        self.transports.contains(t.bit())
    }

    #[inline]
    pub fn has_capability(&self, c: NetCapability) -> bool {
        self.capabilities.contains(c.bit())
    }

    /// Iterates over the transports present, in bit order.
    pub fn transports(&self) -> impl Iterator<Item = Transport> + '_ {
        Transport::ALL.into_iter().filter(|t| self.has_transport(*t))
    }

    /// Iterates over the capability flags present, in bit order.
    pub fn capabilities(&self) -> impl Iterator<Item = NetCapability> + '_ {
        NetCapability::ALL.into_iter().filter(|c| self.has_capability(*c))
    }

    pub fn link_up_kbps(&self) -> u32 {
        self.link_up_kbps
    }

    pub fn link_down_kbps(&self) -> u32 {
        self.link_down_kbps
    }

    pub fn specifier(&self) -> Option<&str> {
        self.specifier.as_deref()
    }

    /// Returns true if `self`, read as an offer, satisfies every requirement in `required`.
    ///
    /// - every required capability flag must be offered;
    /// - if `required` names transports, at least one must be offered;
    /// - required bandwidths must not exceed offered bandwidths;
    /// - a required specifier must be offered verbatim.
    pub fn satisfies(&self, required: &Capabilities) -> bool {
        let caps_ok = self.capabilities.contains(required.capabilities);
        let transports_ok =
            required.transports.is_empty() || required.transports.intersects(self.transports);
        let bandwidth_ok = required.link_up_kbps <= self.link_up_kbps
            && required.link_down_kbps <= self.link_down_kbps;
        let specifier_ok = match required.specifier.as_deref() {
            None => true,
            Some(want) => self.specifier.as_deref() == Some(want),
        };
        caps_ok && transports_ok && bandwidth_ok && specifier_ok
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if !self.transports.is_empty() {
            let names: Vec<&str> = self.transports().map(Transport::as_str).collect();
            write!(f, " Transports: {}", names.join("|"))?;
        }
        if !self.capabilities.is_empty() {
            let names: Vec<&str> = self.capabilities().map(NetCapability::as_str).collect();
            write!(f, " Capabilities: {}", names.join("&"))?;
        }
        if self.link_up_kbps > 0 {
            write!(f, " LinkUpBandwidth>={}Kbps", self.link_up_kbps)?;
        }
        if self.link_down_kbps > 0 {
            write!(f, " LinkDnBandwidth>={}Kbps", self.link_down_kbps)?;
        }
        if let Some(s) = &self.specifier {
            write!(f, " Specifier: <{s}>")?;
        }
        f.write_str(" ]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_requirement_is_satisfied_by_anything() {
        let offer = Capabilities::new();
        assert!(offer.satisfies(&Capabilities::new()));
    }

    #[test]
    fn test_missing_capability_rejects() {
        let offer = Capabilities::new().with_capability(NetCapability::Internet);
        let want = Capabilities::new()
            .with_capability(NetCapability::Internet)
            .with_capability(NetCapability::NotMetered);
        assert!(!offer.satisfies(&want));

        let offer = offer.with_capability(NetCapability::NotMetered);
        assert!(offer.satisfies(&want));
    }

    #[test]
    fn test_any_requested_transport_is_enough() {
        let offer = Capabilities::new().with_transport(Transport::Wifi);
        let want = Capabilities::new()
            .with_transport(Transport::Cellular)
            .with_transport(Transport::Wifi);
        assert!(offer.satisfies(&want));

        let cell_only = Capabilities::new().with_transport(Transport::Cellular);
        assert!(!offer.satisfies(&cell_only));
    }

    #[test]
    fn test_bandwidth_floor() {
        let offer = Capabilities::new().with_link_down_kbps(5_000);
        assert!(offer.satisfies(&Capabilities::new().with_link_down_kbps(5_000)));
        assert!(!offer.satisfies(&Capabilities::new().with_link_down_kbps(5_001)));
        assert!(!offer.satisfies(&Capabilities::new().with_link_up_kbps(1)));
    }

    #[test]
    fn test_specifier_must_match_exactly() {
        let want = Capabilities::new().with_specifier("slot-1");
        assert!(!Capabilities::new().satisfies(&want));
        assert!(!Capabilities::new().with_specifier("slot-2").satisfies(&want));
        assert!(Capabilities::new().with_specifier("slot-1").satisfies(&want));
        // An offer with a specifier still serves requests that name none.
        assert!(Capabilities::new().with_specifier("slot-1").satisfies(&Capabilities::new()));
    }

    #[test]
    fn test_display_lists_present_fields() {
        let caps = Capabilities::new()
            .with_transport(Transport::Wifi)
            .with_transport(Transport::Cellular)
            .with_capability(NetCapability::Internet)
            .with_capability(NetCapability::NotMetered)
            .with_link_down_kbps(100);
        assert_eq!(
            caps.to_string(),
            "[ Transports: CELLULAR|WIFI Capabilities: NOT_METERED&INTERNET LinkDnBandwidth>=100Kbps ]"
        );
        assert_eq!(Capabilities::new().to_string(), "[ ]");
    }
}
