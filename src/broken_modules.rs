//! Broken kernel module deny-list
//!
//! The installer environment records driver modules known not to work in
//! an install.inf-style file (`Key: value` lines). The `BrokenModules`
//! key holds a whitespace-separated list of module names.

use std::fs;
use std::path::Path;

use crate::error::Result;

/// Supplier of disallowed driver module names.
pub trait BrokenModuleProvider {
    fn broken_modules(&self) -> Vec<String>;
}

impl BrokenModuleProvider for Vec<String> {
    fn broken_modules(&self) -> Vec<String> {
        self.clone()
    }
}

impl BrokenModuleProvider for [String] {
    fn broken_modules(&self) -> Vec<String> {
        self.to_vec()
    }
}

/// Parsed install.inf contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallInf {
    entries: Vec<(String, String)>,
}

impl InstallInf {
    const BROKEN_MODULES_KEY: &'static str = "BrokenModules";

    /// Parse `Key: value` lines. Lines without a colon and `#` comments
    /// are ignored.
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();

        Self { entries }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Value of the last occurrence of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

impl BrokenModuleProvider for InstallInf {
    fn broken_modules(&self) -> Vec<String> {
        self.get(Self::BROKEN_MODULES_KEY)
            .map(parse_module_list)
            .unwrap_or_default()
    }
}

/// Split a whitespace-separated module list, dropping empty entries.
pub fn parse_module_list(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}
