//! Visit identity.
//!
//! A [`VisitKey`] ties together signals about the same visit that come from
//! different artifacts: submission CSV rows, qc-status log files and JSON form
//! files. Upstream producers disagree on the case of the module field, so the
//! key uppercases it on construction and all comparisons go through that
//! single constructor.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::de;

/// Participant, visit date and module of one visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "VisitKeyWire")]
pub struct VisitKey {
    ptid: String,
    date: String,
    module: String,
}

#[derive(Deserialize)]
struct VisitKeyWire {
    ptid: String,
    date: String,
    module: String,
}

impl From<VisitKeyWire> for VisitKey {
    fn from(wire: VisitKeyWire) -> Self {
        Self::new(wire.ptid, wire.date, wire.module)
    }
}

impl VisitKey {
    pub fn new(ptid: impl Into<String>, date: impl Into<String>, module: impl AsRef<str>) -> Self {
        Self {
            ptid: ptid.into().trim().to_string(),
            date: date.into().trim().to_string(),
            module: normalize_module(module.as_ref()),
        }
    }

    pub fn ptid(&self) -> &str {
        &self.ptid
    }

    /// Visit date in `YYYY-MM-DD` form.
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Module, always uppercase.
    pub fn module(&self) -> &str {
        &self.module
    }
}

impl fmt::Display for VisitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.ptid, self.date, self.module)
    }
}

/// Canonical module spelling used for comparisons.
pub fn normalize_module(module: &str) -> String {
    module.trim().to_uppercase()
}

/// Visit identity plus the auxiliary fields carried on events and errors.
///
/// Forms name the visit date either `visitdate` or `date`. When both are
/// present and non-empty, `visitdate` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "VisitMetadataWire")]
pub struct VisitMetadata {
    pub ptid: Option<String>,
    pub date: Option<String>,
    pub module: Option<String>,
    pub visitnum: Option<String>,
    pub packet: Option<String>,
    pub adcid: Option<i64>,
    pub naccid: Option<String>,
}

#[derive(Deserialize)]
struct VisitMetadataWire {
    #[serde(default, deserialize_with = "de::opt_string")]
    ptid: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    date: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    visitdate: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    module: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    visitnum: Option<String>,
    #[serde(default, deserialize_with = "de::opt_string")]
    packet: Option<String>,
    #[serde(default, deserialize_with = "de::opt_int")]
    adcid: Option<i64>,
    #[serde(default, deserialize_with = "de::opt_string")]
    naccid: Option<String>,
}

impl From<VisitMetadataWire> for VisitMetadata {
    fn from(wire: VisitMetadataWire) -> Self {
        Self {
            ptid: wire.ptid,
            date: wire.visitdate.or(wire.date),
            module: wire.module,
            visitnum: wire.visitnum,
            packet: wire.packet,
            adcid: wire.adcid,
            naccid: wire.naccid,
        }
    }
}

impl VisitMetadata {
    pub fn new(
        ptid: impl Into<String>,
        date: impl Into<String>,
        module: impl Into<String>,
    ) -> Self {
        Self {
            ptid: Some(ptid.into()),
            date: Some(date.into()),
            module: Some(module.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_visitnum(mut self, visitnum: impl Into<String>) -> Self {
        self.visitnum = Some(visitnum.into());
        self
    }

    #[must_use]
    pub fn with_packet(mut self, packet: impl Into<String>) -> Self {
        self.packet = Some(packet.into());
        self
    }

    #[must_use]
    pub fn with_adcid(mut self, adcid: i64) -> Self {
        self.adcid = Some(adcid);
        self
    }

    #[must_use]
    pub fn with_naccid(mut self, naccid: impl Into<String>) -> Self {
        self.naccid = Some(naccid.into());
        self
    }

    pub fn is_valid_for_event(&self) -> bool {
        is_valid_for_event(self)
    }

    /// The visit key, when ptid, date and module are all present.
    pub fn visit_key(&self) -> Option<VisitKey> {
        match (
            non_empty(self.ptid.as_deref()),
            non_empty(self.date.as_deref()),
            non_empty(self.module.as_deref()),
        ) {
            (Some(ptid), Some(date), Some(module)) => Some(VisitKey::new(ptid, date, module)),
            _ => None,
        }
    }
}

/// True when ptid, date and module are all non-empty.
///
/// Visit number and packet are optional: milestone and neuropathology forms
/// have neither.
pub fn is_valid_for_event(metadata: &VisitMetadata) -> bool {
    metadata.visit_key().is_some()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_uppercases_module() {
        let key = VisitKey::new("P1", "2024-01-01", "uds");
        assert_eq!(key.module(), "UDS");
        assert_eq!(key, VisitKey::new("P1", "2024-01-01", "Uds"));
        assert_eq!(key.to_string(), "P1/2024-01-01/UDS");
    }

    #[test]
    fn deserialized_key_is_normalized() {
        let key: VisitKey =
            serde_json::from_value(json!({"ptid": "P1", "date": "2024-01-01", "module": "lbd"}))
                .unwrap();
        assert_eq!(key.module(), "LBD");
    }

    #[test]
    fn validity_requires_identity_fields_only() {
        let metadata = VisitMetadata::new("P1", "2024-01-01", "UDS");
        assert!(metadata.is_valid_for_event());

        let missing_ptid = VisitMetadata {
            ptid: None,
            ..metadata.clone()
        };
        assert!(!is_valid_for_event(&missing_ptid));

        let blank_module = VisitMetadata {
            module: Some("  ".to_string()),
            ..metadata
        };
        assert!(!blank_module.is_valid_for_event());
    }

    #[test]
    fn metadata_reads_form_fields() {
        let metadata: VisitMetadata = serde_json::from_value(json!({
            "ptid": "110001",
            "visitdate": "2024-02-02",
            "module": "UDS",
            "visitnum": 1,
            "adcid": "42",
            "packet": ""
        }))
        .unwrap();
        assert_eq!(metadata.date.as_deref(), Some("2024-02-02"));
        assert_eq!(metadata.visitnum.as_deref(), Some("1"));
        assert_eq!(metadata.adcid, Some(42));
        assert_eq!(metadata.packet, None);
    }

    #[test]
    fn visitdate_wins_over_date() {
        let metadata: VisitMetadata = serde_json::from_value(json!({
            "ptid": "110001",
            "date": "2024-01-01",
            "visitdate": "2024-02-02",
            "module": "UDS"
        }))
        .unwrap();
        assert_eq!(metadata.date.as_deref(), Some("2024-02-02"));

        let blank: VisitMetadata = serde_json::from_value(json!({
            "ptid": "110001",
            "date": "2024-01-01",
            "visitdate": "",
            "module": "UDS"
        }))
        .unwrap();
        assert_eq!(blank.date.as_deref(), Some("2024-01-01"));
        assert_eq!(
            serde_json::to_value(&blank).unwrap()["date"],
            json!("2024-01-01")
        );
    }
}
