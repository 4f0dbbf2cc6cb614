//! Device normalization
//!
//! Turns a classified, driver-resolved probe record into the canonical
//! `DeviceDescriptor`. Fields shared by every device live on the descriptor
//! itself; everything that only makes sense for one family of devices lives
//! in a `KindPayload` variant, so a modem can never carry a MAC address and
//! a network card can never carry an init string.
//!
//! # Payload per kind
//!
//! | Kind             | Payload           | Derived fields                       |
//! |------------------|-------------------|--------------------------------------|
//! | `modem`          | `ModemFields`     | speed, init strings, pppd options    |
//! | `isdn`           | `IsdnFields`      | bus, io port, irq                    |
//! | `dsl`            | `DslFields`       | translated mode                      |
//! | everything else  | `NetcardFields`   | driver, bus, busid, MACs, link, wlan |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::driver::{DriverSelection, SelectedDrivers};
use crate::probe::{DriverVariant, RawProbeRecord};
use crate::types::{DeviceKind, Hotplug};

/// Modem speed used when the probe reports none.
pub const DEFAULT_MODEM_SPEED: i64 = 57_600;
/// Speed some serial probes report for modems that cannot actually do it.
const MISREPORTED_MODEM_SPEED: i64 = 12_000_000;

/// DSL driver modes that are renamed for the configuration layer.
const DSL_MODE_TABLE: &[(&str, &str)] = &[("capiadsl", "capi-adsl"), ("pppoe", "pppoe")];

// ============================================================================
// Descriptor types
// ============================================================================

/// Canonical description of one accepted network device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    pub name: String,
    pub kind: DeviceKind,
    pub udi: String,
    pub sysfs_id: String,
    pub dev_name: String,
    pub requires: Vec<String>,
    pub modalias: String,
    pub unique: String,
    /// Kernel driver bound at probe time
    pub driver: String,
    pub payload: KindPayload,
    /// Position among accepted devices, see `InventoryBuilder`
    pub num: usize,
}

/// Kind-specific part of a descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindPayload {
    Modem(ModemFields),
    Isdn(IsdnFields),
    Dsl(DslFields),
    Netcard(NetcardFields),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModemFields {
    pub device_name: String,
    pub drivers: Vec<DriverVariant>,
    pub speed: i64,
    pub init1: String,
    pub init2: String,
    pub pppd_options: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsdnFields {
    pub drivers: Vec<Value>,
    /// Index of the selected driver, always the first one
    pub sel_drv: usize,
    pub bus: String,
    pub io: i64,
    pub irq: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DslFields {
    pub mode: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetcardFields {
    /// Driver variants left after broken-module filtering
    pub drivers: Vec<DriverVariant>,
    /// Active driver, absent when no variant survived filtering
    pub active_driver: Option<DriverSelection>,
    pub hotplug: Option<Hotplug>,
    pub bus: String,
    pub busid: String,
    /// Original virtio bus id when `busid` was replaced by the parent device
    pub sub_device_busid: Option<String>,
    pub mac: String,
    pub permanent_mac: String,
    /// Cable state; `None` means unknown, not down
    pub link: Option<bool>,
    pub wl_channels: Option<Value>,
    pub wl_bitrates: Option<Value>,
    pub wl_auth_modes: Option<Value>,
    pub wl_enc_modes: Option<Value>,
}

impl DeviceDescriptor {
    pub fn netcard(&self) -> Option<&NetcardFields> {
        match &self.payload {
            KindPayload::Netcard(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn modem(&self) -> Option<&ModemFields> {
        match &self.payload {
            KindPayload::Modem(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn isdn(&self) -> Option<&IsdnFields> {
        match &self.payload {
            KindPayload::Isdn(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn dsl(&self) -> Option<&DslFields> {
        match &self.payload {
            KindPayload::Dsl(fields) => Some(fields),
            _ => None,
        }
    }
}

// ============================================================================
// Normalization
// ============================================================================

/// Normalization settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    /// Append the bus id to device names, as done on s390 where many
    /// identical channel devices would otherwise share one name
    pub distinguished_names: bool,
}

impl Normalizer {
    /// Build the descriptor for an accepted record. `num` is left at 0 for
    /// the inventory builder to assign.
    pub fn normalize(
        &self,
        record: &RawProbeRecord,
        kind: DeviceKind,
        drivers: &SelectedDrivers,
    ) -> DeviceDescriptor {
        let mut name = device_name(record);
        if self.distinguished_names {
            name = distinguished_name(name, record);
        }

        let payload = match kind {
            DeviceKind::Modem => KindPayload::Modem(modem_fields(record)),
            DeviceKind::Isdn => KindPayload::Isdn(isdn_fields(record)),
            DeviceKind::Dsl => KindPayload::Dsl(dsl_fields(record)),
            _ => KindPayload::Netcard(netcard_fields(record, drivers)),
        };

        DeviceDescriptor {
            name,
            kind,
            udi: record.udi.clone(),
            sysfs_id: record.sysfs_id.clone(),
            dev_name: record.dev_name.clone(),
            requires: record.requires.clone(),
            modalias: record.modalias.clone(),
            unique: record.unique_key.clone(),
            driver: record.driver.clone(),
            payload,
            num: 0,
        }
    }
}

/// Normalize with default settings.
pub fn normalize(
    record: &RawProbeRecord,
    kind: DeviceKind,
    drivers: &SelectedDrivers,
) -> DeviceDescriptor {
    Normalizer::default().normalize(record, kind, drivers)
}

/// Human readable device name.
///
/// Prefers the device name, then the model, then "subvendor subdevice",
/// then "vendor device".
pub fn device_name(record: &RawProbeRecord) -> String {
    if !record.device.is_empty() {
        return record.device.clone();
    }
    if !record.model.is_empty() {
        return record.model.clone();
    }

    let (vendor, device) = if record.sub_vendor.is_empty() || record.sub_device.is_empty() {
        (&record.vendor, &record.device)
    } else {
        (&record.sub_vendor, &record.sub_device)
    };

    format!("{} {}", vendor, device).trim().to_string()
}

fn distinguished_name(name: String, record: &RawProbeRecord) -> String {
    if record.sysfs_bus_id.is_empty() {
        name
    } else {
        format!("{} ({})", name, record.sysfs_bus_id)
    }
}

fn modem_fields(record: &RawProbeRecord) -> ModemFields {
    let resource = &record.resource;

    let speed = match resource.first_i64("baud", "speed") {
        Some(MISREPORTED_MODEM_SPEED) | None => DEFAULT_MODEM_SPEED,
        Some(speed) => speed,
    };

    ModemFields {
        device_name: record.dev_name.clone(),
        drivers: record.drivers.clone(),
        speed,
        init1: string_or_empty(resource.first_str("init_strings", "init1")),
        init2: string_or_empty(resource.first_str("init_strings", "init2")),
        pppd_options: string_or_empty(resource.first_str("pppd_option", "option")),
    }
}

fn isdn_fields(record: &RawProbeRecord) -> IsdnFields {
    IsdnFields {
        drivers: record.isdn.clone(),
        sel_drv: 0,
        bus: record.bus.clone(),
        io: record.resource.first_i64("io", "start").unwrap_or(0),
        irq: record.resource.first_i64("irq", "irq").unwrap_or(0),
    }
}

fn dsl_fields(record: &RawProbeRecord) -> DslFields {
    let mode = record.dsl.first().map(|d| d.mode.as_str()).unwrap_or_default();
    DslFields {
        mode: translate_dsl_mode(mode),
    }
}

/// Translate a probe DSL mode; unknown modes pass through unchanged.
pub fn translate_dsl_mode(mode: &str) -> String {
    DSL_MODE_TABLE
        .iter()
        .find(|(probe, _)| *probe == mode)
        .map(|(_, translated)| *translated)
        .unwrap_or(mode)
        .to_string()
}

fn netcard_fields(record: &RawProbeRecord, drivers: &SelectedDrivers) -> NetcardFields {
    let resource = &record.resource;

    let mut busid = record.sysfs_bus_id.clone();
    let mut sub_device_busid = None;
    if busid.starts_with("virtio") {
        // virtio bus ids are not usable; the parent device's id is
        busid = parent_segment(&record.sysfs_id).to_string();
        sub_device_busid = Some(record.sysfs_bus_id.clone());
    }

    NetcardFields {
        drivers: drivers.variants.clone(),
        active_driver: drivers.selection.clone(),
        hotplug: Hotplug::from_probe(&record.hotplug),
        bus: normalize_bus(record),
        busid,
        sub_device_busid,
        mac: string_or_empty(resource.first_str("hwaddr", "addr")),
        permanent_mac: string_or_empty(resource.first_str("phwaddr", "addr")),
        link: resource.first("link", "state").and_then(Value::as_bool),
        wl_channels: resource.first("wlan", "channels").cloned(),
        wl_bitrates: resource.first("wlan", "bitrates").cloned(),
        wl_auth_modes: resource.first("wlan", "auth_modes").cloned(),
        wl_enc_modes: resource.first("wlan", "enc_modes").cloned(),
    }
}

/// Short bus tag: `bus_hwcfg` if set, otherwise `bus`, with the common
/// probe spellings mapped to lowercase tags.
pub fn normalize_bus(record: &RawProbeRecord) -> String {
    let bus = if record.bus_hwcfg.is_empty() {
        record.bus.as_str()
    } else {
        record.bus_hwcfg.as_str()
    };

    match bus {
        "PCI" => "pci",
        "USB" => "usb",
        "Virtual IO" => "vio",
        other => other,
    }
    .to_string()
}

/// Second-to-last `/`-separated segment of a sysfs path.
fn parent_segment(sysfs_id: &str) -> &str {
    sysfs_id
        .trim_end_matches('/')
        .rsplit('/')
        .nth(1)
        .unwrap_or_default()
}

fn string_or_empty(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

// ============================================================================
// Tests
// ============================================================================
