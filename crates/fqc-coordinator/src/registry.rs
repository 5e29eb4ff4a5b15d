//! Per-module coordination settings.

use std::collections::BTreeMap;

use fqc_model::normalize_module;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoordinatorError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleConfig {
    pub name: String,
    /// Gear triggered to validate each visit of this module.
    pub validation_gear: String,
    /// Module whose approved visit must exist before this module's visit may run.
    #[serde(default)]
    pub supplement: Option<String>,
    /// Configuration handed to the validation gear.
    #[serde(default)]
    pub config: Value,
}

impl ModuleConfig {
    pub fn new(name: impl Into<String>, validation_gear: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            validation_gear: validation_gear.into(),
            supplement: None,
            config: Value::Null,
        }
    }

    pub fn with_supplement(mut self, supplement: impl Into<String>) -> Self {
        self.supplement = Some(supplement.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }
}

/// Module configurations keyed by uppercase module name.
#[derive(Debug, Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, ModuleConfig>,
}

impl ModuleRegistry {
    pub fn new(modules: impl IntoIterator<Item = ModuleConfig>) -> Self {
        let mut registry = Self::default();
        for module in modules {
            registry.register(module);
        }
        registry
    }

    /// Add or replace a module's configuration.
    pub fn register(&mut self, module: ModuleConfig) {
        self.modules.insert(normalize_module(&module.name), module);
    }

    pub fn get(&self, module: &str) -> Result<&ModuleConfig> {
        self.modules
            .get(&normalize_module(module))
            .ok_or_else(|| CoordinatorError::UnknownModule {
                module: module.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let registry = ModuleRegistry::new([
            ModuleConfig::new("UDS", "form-qc-checker"),
            ModuleConfig::new("lbd", "form-qc-checker").with_supplement("UDS"),
        ]);
        assert_eq!(registry.get("uds").unwrap().name, "UDS");
        assert_eq!(
            registry.get("LBD").unwrap().supplement.as_deref(),
            Some("UDS")
        );
        assert!(matches!(
            registry.get("FTLD"),
            Err(CoordinatorError::UnknownModule { .. })
        ));
    }
}
