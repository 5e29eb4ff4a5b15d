//! Visitor protocol over QC status records.
//!
//! The record is a closed tree: file, gear, validation, then errors and
//! cleared alerts, then alert provenance. [`QcVisitor`] has one method per
//! node type and every node type implements [`QcNode::apply`], which calls
//! back the matching method. Default methods walk into children, leaf methods
//! do nothing, so a visitor overrides only the nodes it cares about.
//!
//! Errors and validations do not carry the gear that produced them. While
//! fanning out over a file's gears, [`walk_file_model`] calls
//! [`QcVisitor::enter_gear`] and [`QcVisitor::leave_gear`] around each gear so
//! visitors can track the active gear name (see [`GearContext`]).

use crate::cleared::{AlertProvenance, ClearedAlert};
use crate::error::{ModelError, Result};
use crate::file_error::FileError;
use crate::record::{FileQcModel, GearQcModel, ValidationModel};
use crate::status::QcStatus;
use crate::visit::VisitKey;

pub trait QcVisitor {
    /// Called before descending into a gear's outcome.
    fn enter_gear(&mut self, _gear_name: &str) {}

    /// Called after a gear's outcome has been visited, even on error.
    fn leave_gear(&mut self) {}

    fn visit_file_model(&mut self, file: &FileQcModel) -> Result<()> {
        walk_file_model(self, file)
    }

    fn visit_gear_model(&mut self, gear: &GearQcModel) -> Result<()> {
        gear.validation.apply(self)
    }

    fn visit_validation_model(&mut self, validation: &ValidationModel) -> Result<()> {
        walk_validation_model(self, validation)
    }

    fn visit_file_error(&mut self, _error: &FileError) -> Result<()> {
        Ok(())
    }

    fn visit_cleared_alert(&mut self, alert: &ClearedAlert) -> Result<()> {
        walk_cleared_alert(self, alert)
    }

    fn visit_alert_provenance(&mut self, _provenance: &AlertProvenance) -> Result<()> {
        Ok(())
    }
}

/// Visit every gear of a file with the gear name set as context.
pub fn walk_file_model<V: QcVisitor + ?Sized>(visitor: &mut V, file: &FileQcModel) -> Result<()> {
    for (gear_name, gear) in file.gears() {
        visitor.enter_gear(gear_name);
        let result = gear.apply(visitor);
        visitor.leave_gear();
        result?;
    }
    Ok(())
}

pub fn walk_validation_model<V: QcVisitor + ?Sized>(
    visitor: &mut V,
    validation: &ValidationModel,
) -> Result<()> {
    for error in &validation.errors {
        error.apply(visitor)?;
    }
    for alert in &validation.cleared_alerts {
        alert.apply(visitor)?;
    }
    Ok(())
}

pub fn walk_cleared_alert<V: QcVisitor + ?Sized>(
    visitor: &mut V,
    alert: &ClearedAlert,
) -> Result<()> {
    for provenance in &alert.provenance {
        provenance.apply(visitor)?;
    }
    Ok(())
}

mod sealed {
    pub trait Sealed {}
}

/// A node of the QC record tree.
pub trait QcNode: sealed::Sealed {
    fn apply<V: QcVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()>;
}

macro_rules! qc_node {
    ($ty:ty, $method:ident) => {
        impl sealed::Sealed for $ty {}

        impl QcNode for $ty {
            fn apply<V: QcVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
                visitor.$method(self)
            }
        }
    };
}

qc_node!(FileQcModel, visit_file_model);
qc_node!(GearQcModel, visit_gear_model);
qc_node!(ValidationModel, visit_validation_model);
qc_node!(FileError, visit_file_error);
qc_node!(ClearedAlert, visit_cleared_alert);
qc_node!(AlertProvenance, visit_alert_provenance);

/// Tracks which gear a visitor is currently inside.
#[derive(Debug, Default, Clone)]
pub struct GearContext {
    active: Option<String>,
}

impl GearContext {
    pub fn enter(&mut self, gear_name: &str) {
        self.active = Some(gear_name.to_string());
    }

    pub fn leave(&mut self) {
        self.active = None;
    }

    /// The active gear, or an error naming the node that needed it.
    pub fn active(&self, node: &'static str) -> Result<&str> {
        self.active
            .as_deref()
            .ok_or(ModelError::MissingGearContext { node })
    }
}

/// Builds one report row per finished gear of a file.
///
/// Gears whose state is `None` never finished and are skipped.
pub struct StatusReportVisitor<'a, R, F> {
    visit: &'a VisitKey,
    transform: F,
    gear: GearContext,
    rows: Vec<R>,
}

impl<'a, R, F> StatusReportVisitor<'a, R, F>
where
    F: FnMut(&str, &VisitKey, &ValidationModel) -> Result<R>,
{
    pub fn new(visit: &'a VisitKey, transform: F) -> Self {
        Self {
            visit,
            transform,
            gear: GearContext::default(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

impl<R, F> QcVisitor for StatusReportVisitor<'_, R, F>
where
    F: FnMut(&str, &VisitKey, &ValidationModel) -> Result<R>,
{
    fn enter_gear(&mut self, gear_name: &str) {
        self.gear.enter(gear_name);
    }

    fn leave_gear(&mut self) {
        self.gear.leave();
    }

    fn visit_validation_model(&mut self, validation: &ValidationModel) -> Result<()> {
        if validation.state.is_none() {
            return Ok(());
        }
        let gear_name = self.gear.active("validation")?;
        let row = (self.transform)(gear_name, self.visit, validation)?;
        self.rows.push(row);
        Ok(())
    }
}

/// Builds one report row per error of every gear that did not pass.
pub struct ErrorReportVisitor<'a, R, F> {
    visit: &'a VisitKey,
    transform: F,
    gear: GearContext,
    rows: Vec<R>,
}

impl<'a, R, F> ErrorReportVisitor<'a, R, F>
where
    F: FnMut(&str, &VisitKey, &FileError) -> Result<R>,
{
    pub fn new(visit: &'a VisitKey, transform: F) -> Self {
        Self {
            visit,
            transform,
            gear: GearContext::default(),
            rows: Vec::new(),
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<R> {
        self.rows
    }
}

impl<R, F> QcVisitor for ErrorReportVisitor<'_, R, F>
where
    F: FnMut(&str, &VisitKey, &FileError) -> Result<R>,
{
    fn enter_gear(&mut self, gear_name: &str) {
        self.gear.enter(gear_name);
    }

    fn leave_gear(&mut self) {
        self.gear.leave();
    }

    fn visit_validation_model(&mut self, validation: &ValidationModel) -> Result<()> {
        if validation.state == Some(QcStatus::Pass) {
            return Ok(());
        }
        for error in &validation.errors {
            error.apply(self)?;
        }
        Ok(())
    }

    fn visit_file_error(&mut self, error: &FileError) -> Result<()> {
        let gear_name = self.gear.active("file error")?;
        let row = (self.transform)(gear_name, self.visit, error)?;
        self.rows.push(row);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_error::ErrorType;

    #[derive(Default)]
    struct Counter {
        errors: usize,
        provenance: usize,
    }

    impl QcVisitor for Counter {
        fn visit_file_error(&mut self, _error: &FileError) -> Result<()> {
            self.errors += 1;
            Ok(())
        }

        fn visit_alert_provenance(&mut self, _provenance: &AlertProvenance) -> Result<()> {
            self.provenance += 1;
            Ok(())
        }
    }

    #[test]
    fn default_methods_walk_whole_tree() {
        let mut file = FileQcModel::default();
        let mut validation = ValidationModel::failed(vec![
            FileError::new(ErrorType::Error, "e1", "bad"),
            FileError::new(ErrorType::Alert, "a1", "check"),
        ]);
        validation.cleared_alerts.push(ClearedAlert {
            clear: false,
            finalized: false,
            provenance: vec![AlertProvenance {
                user: "u".to_string(),
                clear_set_to: false,
                timestamp: "t".to_string(),
            }],
            alert_hash: "h".to_string(),
        });
        file.set_gear("checker", GearQcModel::new(validation));
        file.set_gear("transformer", GearQcModel::new(ValidationModel::passed()));

        let mut counter = Counter::default();
        file.apply(&mut counter).unwrap();
        assert_eq!(counter.errors, 2);
        assert_eq!(counter.provenance, 1);
    }

    #[test]
    fn error_outside_gear_has_no_context() {
        let key = VisitKey::new("P1", "2024-01-01", "UDS");
        let mut visitor = ErrorReportVisitor::new(&key, |gear: &str, _: &VisitKey, _: &FileError| {
            Ok(gear.to_string())
        });
        let error = FileError::new(ErrorType::Error, "e1", "bad");
        assert!(matches!(
            error.apply(&mut visitor),
            Err(ModelError::MissingGearContext { .. })
        ));
    }

    #[test]
    fn gear_context_cleared_after_failure() {
        let key = VisitKey::new("P1", "2024-01-01", "UDS");
        let mut file = FileQcModel::default();
        file.set_gear(
            "checker",
            GearQcModel::new(ValidationModel::failed(vec![FileError::new(
                ErrorType::Error,
                "e1",
                "bad",
            )])),
        );
        let mut visitor = ErrorReportVisitor::new(&key, |gear: &str, _: &VisitKey, _: &FileError| {
            Err::<String, _>(ModelError::transform(gear, "boom"))
        });
        assert!(file.apply(&mut visitor).is_err());
        assert!(visitor.gear.active("file error").is_err());
    }
}
