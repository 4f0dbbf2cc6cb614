//! netinventory library
//!
//! Turns raw hardware probe records into a canonical, ordered inventory of
//! network-capable devices: classification, driver selection under a
//! broken-module deny-list, exclusion rules, per-kind normalization and the
//! wireless promotion pass.

pub mod broken_modules;
pub mod classify;
pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod exclusion;
pub mod inventory;
pub mod normalize;
pub mod probe;
pub mod types;

// Re-export main types for convenience
pub use broken_modules::{BrokenModuleProvider, InstallInf};
pub use classify::classify;
pub use config::InventoryConfig;
pub use driver::{select, DriverSelection, SelectedDrivers};
pub use error::{InventoryError, Result};
pub use exclusion::{is_excluded, ExclusionRule};
pub use inventory::{
    build, find_first_wireless, promote_wireless, read_hardware, Inventory, InventoryBuilder,
};
pub use normalize::{
    device_name, normalize, DeviceDescriptor, DslFields, IsdnFields, KindPayload, ModemFields,
    NetcardFields, Normalizer,
};
pub use probe::{DriverVariant, ModuleSpec, ProbeSnapshot, ProbeSource, RawProbeRecord, Resource};
pub use types::{DeviceKind, Hotplug, ProbeBucket};
