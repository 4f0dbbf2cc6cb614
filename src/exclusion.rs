//! Device-level exclusion rules
//!
//! Some classified devices must not show up in the inventory at all, either
//! because they cannot do networking in the current setup or because the
//! probe reports them spuriously.

use strum::{Display, EnumIter, IntoEnumIterator};
use tracing::info;

use crate::probe::RawProbeRecord;

const CHELSIO_VENDOR_ID: i64 = 70_693;
/// Chelsio adapter without a usable network function.
const CHELSIO_STORAGE_DEVICE_ID: i64 = 82_178;

/// A reason for dropping a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum ExclusionRule {
    #[strum(serialize = "virtio device without device file")]
    VirtioWithoutDevice,
    #[strum(serialize = "Chelsio device without device file or networking")]
    ChelsioWithoutNetworking,
    #[strum(serialize = "iucv device different from netiucv")]
    NonNetIucv,
    #[strum(serialize = "device with storage only flag")]
    StorageOnly,
}

impl ExclusionRule {
    /// Whether this rule fires for the record and its resolved module.
    pub fn applies(self, record: &RawProbeRecord, module: &str) -> bool {
        match self {
            Self::VirtioWithoutDevice => module == "virtio_pci" && record.dev_name.is_empty(),
            Self::ChelsioWithoutNetworking => {
                module == "cxgb4"
                    && (record.dev_name.is_empty()
                        || (record.vendor_id == CHELSIO_VENDOR_ID
                            && record.device_id == CHELSIO_STORAGE_DEVICE_ID))
            }
            Self::NonNetIucv => record.device == "IUCV" && record.sysfs_bus_id != "netiucv",
            Self::StorageOnly => record.storageonly,
        }
    }
}

/// All rules that fire for the record.
pub fn matching_rules(record: &RawProbeRecord, module: &str) -> Vec<ExclusionRule> {
    ExclusionRule::iter()
        .filter(|rule| rule.applies(record, module))
        .collect()
}

/// Returns true if the device should be left out of the inventory.
pub fn is_excluded(record: &RawProbeRecord, module: &str) -> bool {
    let rules = matching_rules(record, module);
    for rule in &rules {
        info!(rule = %rule, device = %record.device, "Filtering out device");
    }
    !rules.is_empty()
}
