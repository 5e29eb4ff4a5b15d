use serde::{Deserialize, Serialize};

/// One change to an alert's cleared flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertProvenance {
    pub user: String,
    #[serde(rename = "clearSetTo")]
    pub clear_set_to: bool,
    pub timestamp: String,
}

/// Reviewer decision on an alert, identified by the alert's hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearedAlert {
    pub clear: bool,
    #[serde(default)]
    pub finalized: bool,
    #[serde(default)]
    pub provenance: Vec<AlertProvenance>,
    #[serde(rename = "alertHash")]
    pub alert_hash: String,
}

impl ClearedAlert {
    /// Whether this record clears the alert with the given hash.
    pub fn clears(&self, alert_hash: &str) -> bool {
        self.clear && self.alert_hash == alert_hash
    }

    /// Most recent provenance entry.
    pub fn latest_change(&self) -> Option<&AlertProvenance> {
        self.provenance.last()
    }
}
