//! Inventory building
//!
//! Runs every probe record through classification, driver selection,
//! exclusion and normalization, then moves the first wireless device to
//! the front.
//!
//! # Numbering
//!
//! Each accepted device gets `num` = number of devices accepted before it,
//! so the values are contiguous from 0 in discovery order. Records that are
//! unknown or excluded do not consume a number. The wireless promotion pass
//! only renumbers the two devices it swaps.
//!
//! # Design
//!
//! - **Pure**: No I/O; probe data and the deny-list are passed in
//! - **Reentrant**: Each `build` call owns its accumulator
//! - **Soft failure**: A bucket that cannot be read yields an empty inventory;
//!   for `all`, one unreadable sub-bucket empties the whole result

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::broken_modules::BrokenModuleProvider;
use crate::classify::classify;
use crate::driver::select;
use crate::exclusion::is_excluded;
use crate::normalize::{DeviceDescriptor, Normalizer};
use crate::probe::{ProbeSource, RawProbeRecord};
use crate::types::ProbeBucket;

/// Ordered list of accepted network devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    devices: Vec<DeviceDescriptor>,
}

impl Inventory {
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DeviceDescriptor> {
        self.devices.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DeviceDescriptor> {
        self.devices.iter()
    }

    pub fn as_slice(&self) -> &[DeviceDescriptor] {
        &self.devices
    }

    pub fn into_vec(self) -> Vec<DeviceDescriptor> {
        self.devices
    }

    /// Device proposed as the primary interface (first in the list).
    pub fn primary(&self) -> Option<&DeviceDescriptor> {
        self.devices.first()
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a DeviceDescriptor;
    type IntoIter = std::slice::Iter<'a, DeviceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.iter()
    }
}

impl IntoIterator for Inventory {
    type Item = DeviceDescriptor;
    type IntoIter = std::vec::IntoIter<DeviceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.devices.into_iter()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builds an `Inventory` from raw probe records.
#[derive(Debug, Clone, Default)]
pub struct InventoryBuilder {
    broken_modules: Vec<String>,
    normalizer: Normalizer,
}

impl InventoryBuilder {
    pub fn new(broken_modules: Vec<String>) -> Self {
        Self {
            broken_modules,
            normalizer: Normalizer::default(),
        }
    }

    /// Take the deny-list from a provider.
    pub fn from_provider<P: BrokenModuleProvider + ?Sized>(provider: &P) -> Self {
        Self::new(provider.broken_modules())
    }

    /// Append bus ids to device names (s390 naming).
    pub fn distinguished_names(mut self, enabled: bool) -> Self {
        self.normalizer.distinguished_names = enabled;
        self
    }

    pub fn broken_modules(&self) -> &[String] {
        &self.broken_modules
    }

    /// Scan `records` in probe order and return the ordered inventory.
    pub fn build(&self, records: &[RawProbeRecord]) -> Inventory {
        let mut devices: Vec<DeviceDescriptor> = Vec::new();

        for record in records {
            let Some(kind) = classify(record) else {
                info!(device = %record.device, "Filtering out unclassified device");
                continue;
            };

            let drivers = select(&record.drivers, &self.broken_modules);

            if is_excluded(record, drivers.module()) {
                continue;
            }

            let mut descriptor = self.normalizer.normalize(record, kind, &drivers);
            descriptor.num = devices.len();
            debug!(
                name = %descriptor.name,
                kind = %descriptor.kind,
                num = descriptor.num,
                "found device"
            );
            devices.push(descriptor);
        }

        promote_wireless(&mut devices);

        Inventory { devices }
    }

    /// Read one probe bucket from `source` and build its inventory.
    ///
    /// A bucket the source cannot read yields an empty inventory. For
    /// `ProbeBucket::All` each concrete bucket is read in turn and a single
    /// unreadable one fails the whole request; partial results are never
    /// returned.
    pub fn read_hardware<S: ProbeSource + ?Sized>(
        &self,
        source: &S,
        bucket: ProbeBucket,
    ) -> Inventory {
        debug!(bucket = %bucket, "reading hardware");

        let mut records = Vec::new();
        for concrete in bucket.expand() {
            let Some(found) = source.read(concrete) else {
                error!(bucket = %bucket, unreadable = %concrete, "hardware detection failure");
                return Inventory::default();
            };
            records.extend(found);
        }

        self.build(&records)
    }
}

/// Build an inventory with default settings.
pub fn build(records: &[RawProbeRecord], broken_modules: &[String]) -> Inventory {
    InventoryBuilder::new(broken_modules.to_vec()).build(records)
}

/// Read a probe bucket with the deny-list from `broken`.
pub fn read_hardware<S, P>(source: &S, bucket: ProbeBucket, broken: &P) -> Inventory
where
    S: ProbeSource + ?Sized,
    P: BrokenModuleProvider + ?Sized,
{
    InventoryBuilder::from_provider(broken).read_hardware(source, bucket)
}

// ============================================================================
// Wireless promotion
// ============================================================================

/// Position of the first wireless device.
pub fn find_first_wireless(devices: &[DeviceDescriptor]) -> Option<usize> {
    devices.iter().position(|d| d.kind.is_wireless())
}

/// Swap the first wireless device with the first device and renumber the
/// two. Only one device can be proposed as primary interface downstream,
/// and wireless is preferred.
pub fn promote_wireless(devices: &mut [DeviceDescriptor]) {
    let Some(index) = find_first_wireless(devices) else {
        return;
    };
    if index == 0 {
        return;
    }

    devices.swap(0, index);
    devices[0].num = 0;
    devices[index].num = index;
    debug!(from = index, "promoted wireless device to front");
}

// ============================================================================
// Tests
// ============================================================================
