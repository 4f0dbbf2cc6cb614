//! Type-safe enums shared across the inventory pipeline
//!
//! Device kinds, probe buckets and hotplug types are closed sets, so they are
//! modelled as enums with strum string conversions instead of bare strings.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Canonical device category assigned by classification.
///
/// There is no "unknown" variant: an unclassifiable record is represented
/// by `None` from the classifier and never reaches the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeviceKind {
    /// Ethernet
    Eth,
    /// Token ring
    Tr,
    Fddi,
    Atm,
    Isdn,
    /// InfiniBand
    Ib,
    /// Myrinet
    Myri,
    /// Wireless LAN
    Wlan,
    Xp,
    /// s390 QDIO ethernet
    Qeth,
    /// s390 HiperSockets
    Hsi,
    /// s390 channel-to-channel
    Ctc,
    /// s390 LAN channel station
    Lcs,
    Ficon,
    Escon,
    /// z/VM inter-user communication vehicle
    Iucv,
    Usb,
    Modem,
    Dsl,
    /// Loopback
    Lo,
    /// IPv6-in-IPv4 tunnel
    Sit,
}

impl DeviceKind {
    /// Returns true for wireless LAN devices.
    pub fn is_wireless(self) -> bool {
        matches!(self, Self::Wlan)
    }

    /// Returns true for kinds normalized as a generic network card
    /// (everything except modem, ISDN and DSL).
    pub fn is_netcard(self) -> bool {
        !matches!(self, Self::Modem | Self::Isdn | Self::Dsl)
    }
}

/// Probe category requested from the probe source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[derive(Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProbeBucket {
    Netcard,
    Modem,
    Isdn,
    Dsl,
    /// All four concrete buckets, read in order
    #[default]
    All,
}

impl ProbeBucket {
    /// Concrete buckets in the order they are read for `All`.
    pub const CONCRETE: [ProbeBucket; 4] = [Self::Netcard, Self::Modem, Self::Isdn, Self::Dsl];

    /// Expand into the concrete buckets this request covers.
    pub fn expand(self) -> Vec<ProbeBucket> {
        match self {
            Self::All => Self::CONCRETE.to_vec(),
            other => vec![other],
        }
    }
}

/// Hotplug type of a network card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[derive(Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Hotplug {
    Pcmcia,
    Usb,
}

impl Hotplug {
    /// Normalize the probe's hotplug string. CardBus slots count as PCMCIA.
    pub fn from_probe(value: &str) -> Option<Self> {
        match value {
            "pcmcia" | "cardbus" => Some(Self::Pcmcia),
            "usb" => Some(Self::Usb),
            _ => None,
        }
    }
}
