//! QC status values shared by every gear.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// Outcome a gear reports for one file.
///
/// Stored as `PASS`, `FAIL` or `IN REVIEW`. Parsing ignores case and also
/// accepts `IN_REVIEW`, since not every producer agreed on the spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QcStatus {
    Pass,
    InReview,
    Fail,
}

impl QcStatus {
    /// Parse a status string, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "PASS" => Some(Self::Pass),
            "FAIL" => Some(Self::Fail),
            "IN REVIEW" | "IN_REVIEW" => Some(Self::InReview),
            _ => None,
        }
    }

    /// Stored label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
            Self::InReview => "IN REVIEW",
        }
    }

    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Combine gear statuses into a file status.
    ///
    /// FAIL beats IN REVIEW beats PASS; an empty input is PASS.
    pub fn aggregate<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        statuses.into_iter().max().unwrap_or(Self::Pass)
    }
}

impl fmt::Display for QcStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for QcStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ModelError::UnknownStatus(s.to_string()))
    }
}

impl Serialize for QcStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for QcStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognized QC status '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(QcStatus::parse("pass"), Some(QcStatus::Pass));
        assert_eq!(QcStatus::parse(" Fail "), Some(QcStatus::Fail));
        assert_eq!(QcStatus::parse("in review"), Some(QcStatus::InReview));
        assert_eq!(QcStatus::parse("IN_REVIEW"), Some(QcStatus::InReview));
        assert_eq!(QcStatus::parse("blocked"), None);
    }

    #[test]
    fn aggregate_follows_priority() {
        assert_eq!(
            QcStatus::aggregate([QcStatus::Pass, QcStatus::InReview]),
            QcStatus::InReview
        );
        assert_eq!(
            QcStatus::aggregate([QcStatus::Fail, QcStatus::Pass, QcStatus::InReview]),
            QcStatus::Fail
        );
        assert_eq!(QcStatus::aggregate(std::iter::empty()), QcStatus::Pass);
    }

    #[test]
    fn serializes_stored_label() {
        let json = serde_json::to_string(&QcStatus::InReview).unwrap();
        assert_eq!(json, "\"IN REVIEW\"");
        let parsed: QcStatus = serde_json::from_str("\"fail\"").unwrap();
        assert_eq!(parsed, QcStatus::Fail);
        assert!(serde_json::from_str::<QcStatus>("\"maybe\"").is_err());
    }
}
