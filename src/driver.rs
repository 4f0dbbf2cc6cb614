//! Driver selection under the broken-module deny-list
//!
//! A device may offer several mutually exclusive driver variants. Variants
//! whose first module is on the deny-list are dropped; the first survivor
//! becomes the active driver.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::probe::DriverVariant;

/// The resolved driver of a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverSelection {
    /// Whether the probe reported the variant as loaded
    pub active: bool,
    pub module: String,
    pub options: String,
}

/// Outcome of driver selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectedDrivers {
    /// Variants left after deny-list filtering, in probe order
    pub variants: Vec<DriverVariant>,
    /// First remaining variant, `None` if every variant was filtered out
    pub selection: Option<DriverSelection>,
}

impl SelectedDrivers {
    /// Module name of the active variant, empty when nothing was selected.
    pub fn module(&self) -> &str {
        self.selection
            .as_ref()
            .map(|s| s.module.as_str())
            .unwrap_or_default()
    }
}

/// Filter `variants` against `broken_modules` and pick the active one.
///
/// Only the first module of a variant is checked. A variant with no
/// modules at all is kept.
pub fn select(variants: &[DriverVariant], broken_modules: &[String]) -> SelectedDrivers {
    let variants: Vec<DriverVariant> = variants
        .iter()
        .filter(|variant| {
            let Some(module) = variant.primary_module() else {
                return true;
            };
            let broken = broken_modules.iter().any(|b| *b == module.name);
            if broken {
                info!(module = %module.name, options = %module.options, "In BrokenModules, skipping");
            }
            !broken
        })
        .cloned()
        .collect();

    let selection = match variants.first() {
        Some(first) => {
            let module = first.primary_module().cloned().unwrap_or_default();
            Some(DriverSelection {
                active: first.active,
                module: module.name,
                options: module.options,
            })
        }
        None => {
            info!("No good drivers found");
            None
        }
    };

    SelectedDrivers {
        variants,
        selection,
    }
}
