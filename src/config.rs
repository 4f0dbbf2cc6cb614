//! Configuration file handling for inventory runs.
//!
//! A run needs a probe snapshot, the bucket to read and the broken-module
//! deny-list. These can be kept in a JSON file and overridden from the
//! command line.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::broken_modules::{BrokenModuleProvider, InstallInf};
use crate::types::ProbeBucket;

/// Settings for one inventory run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Probe snapshot (JSON object keyed by bucket)
    pub probe_file: PathBuf,
    pub bucket: ProbeBucket,
    /// install.inf-style file with a `BrokenModules:` line
    pub install_inf: Option<PathBuf>,
    /// Extra broken module names, added to those from `install_inf`
    pub broken_modules: Vec<String>,
    /// Append bus ids to device names (s390)
    pub distinguished_names: bool,
}

impl InventoryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration to JSON")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read configuration from {:?}", path.as_ref()))?;

        let config: Self =
            serde_json::from_str(&content).context("Failed to parse configuration JSON")?;

        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.probe_file.as_os_str().is_empty() {
            anyhow::bail!("Probe file must be specified");
        }

        if let Some(name) = self
            .broken_modules
            .iter()
            .find(|m| m.is_empty() || m.contains(char::is_whitespace))
        {
            anyhow::bail!("Invalid broken module name: {:?}", name);
        }

        Ok(())
    }

    /// Full deny-list: install.inf entries followed by the configured extras.
    pub fn resolve_broken_modules(&self) -> Result<Vec<String>> {
        let mut modules = match &self.install_inf {
            Some(path) => InstallInf::load(path)
                .with_context(|| format!("Failed to read install.inf from {:?}", path))?
                .broken_modules(),
            None => Vec::new(),
        };

        for module in &self.broken_modules {
            if !modules.contains(module) {
                modules.push(module.clone());
            }
        }

        Ok(modules)
    }
}
