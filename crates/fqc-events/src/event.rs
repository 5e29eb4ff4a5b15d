use std::fmt;

use chrono::{DateTime, Utc};
use fqc_model::QcStatus;
use serde::{Deserialize, Serialize};

/// Datatype carried on every form event.
pub const FORM_DATATYPE: &str = "form";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventAction {
    #[serde(rename = "submit")]
    Submit,
    #[serde(rename = "pass-qc")]
    PassQc,
    #[serde(rename = "not-pass-qc")]
    NotPassQc,
}

impl EventAction {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::PassQc => "pass-qc",
            Self::NotPassQc => "not-pass-qc",
        }
    }

    /// Outcome action for a visit's overall QC status. Only PASS passes.
    pub const fn outcome(status: QcStatus) -> Self {
        match status {
            QcStatus::Pass => Self::PassQc,
            QcStatus::InReview | QcStatus::Fail => Self::NotPassQc,
        }
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One submission or QC outcome of a visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitEvent {
    pub action: EventAction,
    pub ptid: String,
    pub visit_date: String,
    pub visit_number: Option<String>,
    pub module: String,
    pub packet: Option<String>,
    pub pipeline_adcid: i64,
    pub project_label: String,
    pub center_label: String,
    pub gear_name: String,
    pub datatype: String,
    pub timestamp: DateTime<Utc>,
}
