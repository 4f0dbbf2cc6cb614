//! Device classification
//!
//! Maps a raw probe record to a `DeviceKind`. The decision is layered:
//!
//! 1. The free-text subclass label ("Modem", "ISDN", "DSL") wins outright.
//! 2. Override rules for hardware known to misreport its class.
//! 3. Per-class subclass tables.
//!
//! | Class  | Meaning                      | Resolution                  |
//! |--------|------------------------------|-----------------------------|
//! | `2`    | Network controller           | `NETWORK_CONTROLLER_TABLE`  |
//! | `7`    | Communication controller     | subclass `3` is a modem     |
//! | `263`  | Network interface (legacy)   | `NETWORK_INTERFACE_TABLE`   |
//! | `258`  | Modem                        | modem                       |
//! | `259`  | ISDN adapter                 | isdn                        |
//! | `276`  | DSL adapter                  | dsl                         |
//!
//! Anything else is unknown. An unknown result is not an error: the record
//! is simply left out of the inventory.

use tracing::{error, info, trace};

use crate::probe::RawProbeRecord;
use crate::types::DeviceKind;

const NETWORK_CONTROLLER: i64 = 2;
const COMMUNICATION_CONTROLLER: i64 = 7;
const SERIAL_BUS_CONTROLLER: i64 = 12;
const NETWORK_INTERFACE: i64 = 263;
const MODEM: i64 = 258;
const ISDN_ADAPTER: i64 = 259;
const DSL_ADAPTER: i64 = 276;

/// Communication controller subclass for modems.
const COMM_SUBCLASS_MODEM: i64 = 3;
/// Serial bus subclass used by some InfiniBand adapters.
const SERIAL_SUBCLASS_INFINIBAND: i64 = 6;
/// "Other" network controller subclass.
const NET_SUBCLASS_OTHER: i64 = 128;

/// Mellanox, as tagged by the probe (0x15b3 on the PCI bus).
const MELLANOX_VENDOR_ID: i64 = 71_091;
/// ConnectX-3 family boards reporting subclass 128 instead of InfiniBand.
const CONNECTX3_DEVICE_IDS: [i64; 3] = [69_635, 69_636, 69_639];

/// Network controller (class 2) subclass table.
const NETWORK_CONTROLLER_TABLE: &[(i64, DeviceKind)] = &[
    (0, DeviceKind::Eth),
    (1, DeviceKind::Tr),
    (2, DeviceKind::Fddi),
    (3, DeviceKind::Atm),
    (4, DeviceKind::Isdn),
    (6, DeviceKind::Ib),
    (7, DeviceKind::Ib),
    (129, DeviceKind::Myri),
    (130, DeviceKind::Wlan),
    (131, DeviceKind::Xp),
    (134, DeviceKind::Qeth),
    (135, DeviceKind::Hsi),
    (136, DeviceKind::Ctc),
    (137, DeviceKind::Lcs),
    (142, DeviceKind::Ficon),
    (143, DeviceKind::Escon),
    (144, DeviceKind::Iucv),
    (145, DeviceKind::Usb),
];

/// Network interface (class 263) subclass table.
const NETWORK_INTERFACE_TABLE: &[(i64, DeviceKind)] = &[
    (0, DeviceKind::Lo),
    (1, DeviceKind::Eth),
    (2, DeviceKind::Tr),
    (3, DeviceKind::Fddi),
    (4, DeviceKind::Ctc),
    (5, DeviceKind::Iucv),
    (6, DeviceKind::Hsi),
    (7, DeviceKind::Qeth),
    (8, DeviceKind::Escon),
    (9, DeviceKind::Myri),
    (10, DeviceKind::Wlan),
    (11, DeviceKind::Xp),
    (12, DeviceKind::Usb),
    (129, DeviceKind::Sit),
];

/// A classification rule checked before the subclass tables.
struct Override {
    name: &'static str,
    matches: fn(&RawProbeRecord) -> bool,
    kind: DeviceKind,
}

const OVERRIDES: &[Override] = &[
    Override {
        name: "ConnectX-3 reporting subclass 128",
        matches: is_misreported_connectx3,
        kind: DeviceKind::Ib,
    },
    Override {
        name: "InfiniBand under serial bus class",
        matches: is_serial_bus_infiniband,
        kind: DeviceKind::Ib,
    },
];

fn is_misreported_connectx3(record: &RawProbeRecord) -> bool {
    record.class_id == NETWORK_CONTROLLER
        && record.sub_class_id == NET_SUBCLASS_OTHER
        && record.vendor_id == MELLANOX_VENDOR_ID
        && CONNECTX3_DEVICE_IDS.contains(&record.device_id)
}

fn is_serial_bus_infiniband(record: &RawProbeRecord) -> bool {
    record.class_id == SERIAL_BUS_CONTROLLER && record.sub_class_id == SERIAL_SUBCLASS_INFINIBAND
}

/// Classify a probe record. `None` means unknown.
pub fn classify(record: &RawProbeRecord) -> Option<DeviceKind> {
    if let Some(kind) = kind_from_label(&record.subclass) {
        return Some(kind);
    }

    if let Some(rule) = OVERRIDES.iter().find(|rule| (rule.matches)(record)) {
        trace!(rule = rule.name, kind = %rule.kind, "classification override");
        return Some(rule.kind);
    }

    let sub = record.sub_class_id;
    match record.class_id {
        NETWORK_CONTROLLER => {
            lookup(NETWORK_CONTROLLER_TABLE, sub).or_else(|| unknown(record, "network controller"))
        }
        COMMUNICATION_CONTROLLER if sub == COMM_SUBCLASS_MODEM => Some(DeviceKind::Modem),
        COMMUNICATION_CONTROLLER => unknown(record, "communication controller"),
        NETWORK_INTERFACE => {
            // The probe normally reports cards, not interfaces
            info!(sub_class_id = sub, "network interface class 0x107 in probe data");
            lookup(NETWORK_INTERFACE_TABLE, sub).or_else(|| unknown(record, "network interface"))
        }
        MODEM => Some(DeviceKind::Modem),
        ISDN_ADAPTER => Some(DeviceKind::Isdn),
        DSL_ADAPTER => Some(DeviceKind::Dsl),
        _ => unknown(record, "controller"),
    }
}

/// Kind named directly by the probe's subclass label.
fn kind_from_label(label: &str) -> Option<DeviceKind> {
    match label {
        "Modem" => Some(DeviceKind::Modem),
        "ISDN" => Some(DeviceKind::Isdn),
        "DSL" => Some(DeviceKind::Dsl),
        _ => None,
    }
}

fn lookup(table: &[(i64, DeviceKind)], sub_class_id: i64) -> Option<DeviceKind> {
    table
        .iter()
        .find(|(id, _)| *id == sub_class_id)
        .map(|(_, kind)| *kind)
}

fn unknown(record: &RawProbeRecord, what: &str) -> Option<DeviceKind> {
    error!(
        class_id = record.class_id,
        sub_class_id = record.sub_class_id,
        vendor_id = record.vendor_id,
        device_id = record.device_id,
        device = %record.device,
        "Unknown {} type",
        what
    );
    None
}

// ============================================================================
// Tests
// ============================================================================
