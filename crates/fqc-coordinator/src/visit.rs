//! Visits flowing through a coordinator run and their outcomes.

use std::fmt;

use fqc_model::{FileError, VisitMetadata, normalize_module};
use serde::{Deserialize, Serialize};

/// One pending visit: the file holding it and its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitDescriptor {
    pub file: String,
    pub ptid: String,
    pub module: String,
    #[serde(alias = "visitdate", alias = "date")]
    pub visit_date: String,
    #[serde(default)]
    pub visitnum: Option<String>,
    #[serde(default)]
    pub packet: Option<String>,
}

impl VisitDescriptor {
    pub fn new(
        file: impl Into<String>,
        ptid: impl Into<String>,
        module: impl Into<String>,
        visit_date: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            ptid: ptid.into(),
            module: module.into(),
            visit_date: visit_date.into(),
            visitnum: None,
            packet: None,
        }
    }

    #[must_use]
    pub fn with_visitnum(mut self, visitnum: impl Into<String>) -> Self {
        self.visitnum = Some(visitnum.into());
        self
    }

    pub fn metadata(&self) -> VisitMetadata {
        let mut metadata = VisitMetadata::new(
            self.ptid.as_str(),
            self.visit_date.as_str(),
            normalize_module(&self.module),
        );
        metadata.visitnum.clone_from(&self.visitnum);
        metadata.packet.clone_from(&self.packet);
        metadata
    }
}

/// Lifecycle of a visit within one run.
///
/// `Pending -> Running -> Passed | Failed`, or `Pending -> Blocked` once an
/// earlier visit of the sequence failed. A visit whose supplement is missing
/// goes straight from `Pending` to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VisitState {
    Pending,
    Running,
    Passed,
    Failed,
    Blocked,
}

impl VisitState {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Passed => "PASSED",
            Self::Failed => "FAILED",
            Self::Blocked => "BLOCKED",
        }
    }

    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Blocked)
    }

    /// Whether `next` is a legal successor of this state.
    pub const fn can_transition_to(&self, next: VisitState) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Running | Self::Failed | Self::Blocked)
                | (Self::Running, Self::Passed | Self::Failed)
        )
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Terminal result of one visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitOutcome {
    pub visit: VisitDescriptor,
    pub state: VisitState,
    /// Errors the coordinator recorded for this visit.
    pub errors: Vec<FileError>,
}

/// Result of coordinating one participant/module sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinationReport {
    pub ptid: String,
    pub module: String,
    /// Outcomes in processing (date) order.
    pub outcomes: Vec<VisitOutcome>,
    /// Downstream validation jobs launched.
    pub triggered: usize,
}

impl CoordinationReport {
    pub fn state_of(&self, file: &str) -> Option<VisitState> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.visit.file == file)
            .map(|outcome| outcome.state)
    }

    pub fn count(&self, state: VisitState) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.state == state)
            .count()
    }

    /// The visit that stopped the sequence, if any.
    pub fn first_failure(&self) -> Option<&VisitOutcome> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.state == VisitState::Failed)
    }
}
