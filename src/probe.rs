//! Raw hardware probe records and the sources that supply them
//!
//! A `RawProbeRecord` is one device as reported by the hardware detection
//! subsystem. Every field is optional on the wire; absent or `null` values fall back
//! to empty strings, zero, `-1` for class ids, or an empty resource table.
//!
//! Probe data reaches the pipeline through the `ProbeSource` trait. The
//! bundled implementation, `ProbeSnapshot`, holds already-materialized
//! records per bucket and can be loaded from a JSON file.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{InventoryError, Result};
use crate::types::ProbeBucket;

/// Class/subclass id reported when the probe did not provide one.
pub const ABSENT_ID: i64 = -1;

/// A `null` field reads as the field's default.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_absent_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(ABSENT_ID))
}

// ============================================================================
// Records
// ============================================================================

/// One device as reported by the probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProbeRecord {
    #[serde(deserialize_with = "null_as_absent_id")]
    pub class_id: i64,
    #[serde(deserialize_with = "null_as_absent_id")]
    pub sub_class_id: i64,
    /// Free-text subclass label ("Modem", "ISDN", "DSL", ...)
    #[serde(deserialize_with = "null_as_default")]
    pub subclass: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vendor_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub device_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub device: String,
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
    #[serde(deserialize_with = "null_as_default")]
    pub vendor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_vendor: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sub_device: String,
    #[serde(deserialize_with = "null_as_default")]
    pub udi: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sysfs_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sysfs_bus_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub dev_name: String,
    /// Kernel driver currently bound to the device
    #[serde(deserialize_with = "null_as_default")]
    pub driver: String,
    /// Driver variants, exclusive alternatives in preference order
    #[serde(deserialize_with = "null_as_default")]
    pub drivers: Vec<DriverVariant>,
    #[serde(deserialize_with = "null_as_default")]
    pub bus: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bus_hwcfg: String,
    #[serde(deserialize_with = "null_as_default")]
    pub hotplug: String,
    /// Multifunction adapter with its network function disabled
    #[serde(deserialize_with = "null_as_default")]
    pub storageonly: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub resource: Resource,
    #[serde(deserialize_with = "null_as_default")]
    pub requires: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub modalias: String,
    #[serde(deserialize_with = "null_as_default")]
    pub unique_key: String,
    /// ISDN driver descriptions, passed through opaque
    #[serde(deserialize_with = "null_as_default")]
    pub isdn: Vec<Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub dsl: Vec<DslInfo>,
}

impl Default for RawProbeRecord {
    fn default() -> Self {
        Self {
            class_id: ABSENT_ID,
            sub_class_id: ABSENT_ID,
            subclass: String::new(),
            vendor_id: 0,
            device_id: 0,
            device: String::new(),
            model: String::new(),
            vendor: String::new(),
            sub_vendor: String::new(),
            sub_device: String::new(),
            udi: String::new(),
            sysfs_id: String::new(),
            sysfs_bus_id: String::new(),
            dev_name: String::new(),
            driver: String::new(),
            drivers: Vec::new(),
            bus: String::new(),
            bus_hwcfg: String::new(),
            hotplug: String::new(),
            storageonly: false,
            resource: Resource::default(),
            requires: Vec::new(),
            modalias: String::new(),
            unique_key: String::new(),
            isdn: Vec::new(),
            dsl: Vec::new(),
        }
    }
}

/// One driver variant: a set of kernel modules loaded together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverVariant {
    #[serde(deserialize_with = "null_as_default")]
    pub active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub modprobe: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub modules: Vec<ModuleSpec>,
}

impl DriverVariant {
    /// The first module of the variant, which names the variant.
    pub fn primary_module(&self) -> Option<&ModuleSpec> {
        self.modules.first()
    }
}

/// A `[name, options]` pair as emitted by the probe.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ModuleSpec {
    pub name: String,
    pub options: String,
}

impl ModuleSpec {
    pub fn new(name: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: options.into(),
        }
    }
}

impl From<Vec<String>> for ModuleSpec {
    fn from(pair: Vec<String>) -> Self {
        let mut parts = pair.into_iter();
        Self {
            name: parts.next().unwrap_or_default(),
            options: parts.next().unwrap_or_default(),
        }
    }
}

impl From<ModuleSpec> for Vec<String> {
    fn from(spec: ModuleSpec) -> Self {
        vec![spec.name, spec.options]
    }
}

/// DSL driver information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DslInfo {
    #[serde(deserialize_with = "null_as_default")]
    pub mode: String,
}

// ============================================================================
// Resource table
// ============================================================================

/// Grouped attribute table: category ("hwaddr", "baud", "wlan", ...) to a
/// list of entries, each a string-keyed map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(BTreeMap<String, Vec<Map<String, Value>>>);

impl Resource {
    /// Append an entry to a group. Mostly useful for building fixtures.
    pub fn push(&mut self, group: &str, entry: Map<String, Value>) {
        self.0.entry(group.to_string()).or_default().push(entry);
    }

    /// Field of the first entry in a group.
    pub fn first(&self, group: &str, key: &str) -> Option<&Value> {
        self.0.get(group)?.first()?.get(key)
    }

    /// Integer field of the first entry in a group.
    pub fn first_i64(&self, group: &str, key: &str) -> Option<i64> {
        self.first(group, key)?.as_i64()
    }

    /// String field of the first entry in a group.
    pub fn first_str(&self, group: &str, key: &str) -> Option<&str> {
        self.first(group, key)?.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Probe sources
// ============================================================================

/// Supplier of raw probe records.
///
/// `read` is only called with concrete buckets; expansion of
/// `ProbeBucket::All` is done by the caller. `None` signals that the
/// bucket could not be read.
pub trait ProbeSource {
    fn read(&self, bucket: ProbeBucket) -> Option<Vec<RawProbeRecord>>;
}

/// Already-materialized probe results keyed by bucket.
///
/// On disk this is a JSON object whose keys are bucket names and whose
/// values are arrays of records. A `null` value or a missing key means
/// the bucket could not be read.
#[derive(Debug, Clone, Default)]
pub struct ProbeSnapshot {
    buckets: HashMap<ProbeBucket, Vec<RawProbeRecord>>,
}

impl ProbeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert of a bucket's records.
    pub fn with_bucket(mut self, bucket: ProbeBucket, records: Vec<RawProbeRecord>) -> Self {
        self.insert(bucket, records);
        self
    }

    pub fn insert(&mut self, bucket: ProbeBucket, records: Vec<RawProbeRecord>) {
        self.buckets.insert(bucket, records);
    }

    /// Parse a snapshot from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        let Value::Object(map) = value else {
            return Err(InventoryError::snapshot(
                "top level must be an object keyed by bucket name",
            ));
        };

        let mut snapshot = Self::new();
        for (key, records) in map {
            let bucket = ProbeBucket::from_str(&key)
                .map_err(|_| InventoryError::unknown_bucket(key.clone()))?;
            if bucket == ProbeBucket::All {
                return Err(InventoryError::snapshot(
                    "\"all\" is not a concrete bucket",
                ));
            }
            if records.is_null() {
                continue;
            }
            let records: Vec<RawProbeRecord> = serde_json::from_value(records)?;
            snapshot.insert(bucket, records);
        }

        Ok(snapshot)
    }

    /// Load a snapshot from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }
}

impl ProbeSource for ProbeSnapshot {
    fn read(&self, bucket: ProbeBucket) -> Option<Vec<RawProbeRecord>> {
        self.buckets.get(&bucket).cloned()
    }
}

// ============================================================================
// Tests
// ============================================================================
