//! Pipeline configuration file.
//!
//! ```toml
//! [coordinator]
//! gear_name = "form-qc-coordinator"
//! poll_interval_secs = 10
//! max_wait_secs = 1800
//!
//! [trigger]
//! command = ["run-gear"]
//!
//! [[modules]]
//! name = "UDS"
//! validation_gear = "form-qc-checker"
//!
//! [[modules]]
//! name = "LBD"
//! validation_gear = "form-qc-checker"
//! supplement = "UDS"
//! config = { strict = true }
//!
//! [events]
//! gear_name = "form-scheduler"
//! project_label = "ingest-form"
//! center_label = "alpha"
//! pipeline_adcid = 42
//! ```
//!
//! Every section is optional.

use std::fs;
use std::path::{Path, PathBuf};

use fqc_coordinator::{DEFAULT_GEAR_NAME, ModuleConfig, ModuleRegistry, WaitPolicy};
use fqc_events::{DEFAULT_EVENT_GEAR, EventContext};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub coordinator: CoordinatorSection,
    pub trigger: TriggerSection,
    pub modules: Vec<ModuleConfig>,
    pub events: EventsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoordinatorSection {
    pub gear_name: String,
    pub poll_interval_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for CoordinatorSection {
    fn default() -> Self {
        Self {
            gear_name: DEFAULT_GEAR_NAME.to_string(),
            poll_interval_secs: 10,
            max_wait_secs: 1800,
        }
    }
}

/// External command run once per visit to validate it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TriggerSection {
    /// Program and leading arguments.
    pub command: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventsSection {
    pub gear_name: String,
    pub project_label: String,
    pub center_label: String,
    pub pipeline_adcid: i64,
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            gear_name: DEFAULT_EVENT_GEAR.to_string(),
            project_label: String::new(),
            center_label: String::new(),
            pipeline_adcid: 0,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml(path: &Path, text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &text)
    }

    /// Load the file when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn registry(&self) -> ModuleRegistry {
        ModuleRegistry::new(self.modules.iter().cloned())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy::from_secs(
            self.coordinator.poll_interval_secs,
            self.coordinator.max_wait_secs,
        )
    }

    pub fn event_context(&self) -> EventContext {
        EventContext::new(
            self.events.project_label.as_str(),
            self.events.center_label.as_str(),
            self.events.pipeline_adcid,
        )
        .with_gear_name(self.events.gear_name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = PipelineConfig::from_toml(Path::new("fqc.toml"), "").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.coordinator.gear_name, "form-qc-coordinator");
        assert_eq!(config.events.gear_name, "form-scheduler");
        assert_eq!(config.wait_policy(), WaitPolicy::from_secs(10, 1800));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = PipelineConfig::from_toml(Path::new("fqc.toml"), "[coordinator]\npoll = 3\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
