//! Project-wide scan of QC records.
//!
//! Every file document carrying a `qc` record is a candidate. One unreadable
//! or malformed file is logged and skipped; the scan goes on.

use fqc_ingest::{VisitSources, extract};
use fqc_model::{
    ErrorReportVisitor, FileError, FileQcModel, QC_KEY, QcNode, StatusReportVisitor,
    ValidationModel, VisitKey,
};
use fqc_store::{DocumentKind, DocumentRef, MetadataStore};
use serde_json::Value;
use tracing::{debug, info, info_span, warn};

use crate::error::Result;
use crate::rows::{ErrorReportRow, StatusReportRow};

/// Counts of one scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Files with a QC record.
    pub scanned: usize,
    /// Files that contributed rows.
    pub reported: usize,
    /// Files skipped because they could not be read or traversed.
    pub skipped: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOutcome<R> {
    pub rows: Vec<R>,
    pub summary: ScanSummary,
}

/// One row per finished gear of every visit.
pub fn status_report(store: &dyn MetadataStore) -> Result<ScanOutcome<StatusReportRow>> {
    scan(store, "status", |visit, record| {
        let mut visitor = StatusReportVisitor::new(
            visit,
            |gear: &str, visit: &VisitKey, validation: &ValidationModel| {
                Ok(StatusReportRow::new(gear, visit, validation))
            },
        );
        record.apply(&mut visitor)?;
        Ok(visitor.into_rows())
    })
}

/// One row per error of every gear that did not pass.
pub fn error_report(store: &dyn MetadataStore) -> Result<ScanOutcome<ErrorReportRow>> {
    scan(store, "error", |visit, record| {
        let mut visitor =
            ErrorReportVisitor::new(visit, |gear: &str, visit: &VisitKey, error: &FileError| {
                Ok(ErrorReportRow::new(gear, visit, error))
            });
        record.apply(&mut visitor)?;
        Ok(visitor.into_rows())
    })
}

/// Scan every file document with a QC record, collecting rows from `build`.
pub fn scan<R, F>(
    store: &dyn MetadataStore,
    report: &str,
    mut build: F,
) -> Result<ScanOutcome<R>>
where
    F: FnMut(&VisitKey, &FileQcModel) -> fqc_model::Result<Vec<R>>,
{
    let span = info_span!("report", kind = report);
    let _guard = span.enter();

    let mut summary = ScanSummary::default();
    let mut rows = Vec::new();

    for doc in store.list_documents(DocumentKind::File)? {
        let document = match store.get_document(&doc) {
            Ok(document) => document,
            Err(error) => {
                warn!(document = %doc, %error, "skipping unreadable document");
                summary.skipped += 1;
                continue;
            }
        };
        if document.get(QC_KEY).is_none() {
            continue;
        }
        summary.scanned += 1;

        match file_rows(&doc, &document, &mut build) {
            Ok(file_rows) => {
                if !file_rows.is_empty() {
                    summary.reported += 1;
                }
                rows.extend(file_rows);
            }
            Err(reason) => {
                warn!(document = %doc, %reason, "skipping file");
                summary.skipped += 1;
            }
        }
    }

    summary.rows = rows.len();
    info!(
        scanned = summary.scanned,
        reported = summary.reported,
        skipped = summary.skipped,
        rows = summary.rows,
        "report scan finished"
    );
    Ok(ScanOutcome { rows, summary })
}

fn file_rows<R, F>(
    doc: &DocumentRef,
    document: &Value,
    build: &mut F,
) -> std::result::Result<Vec<R>, String>
where
    F: FnMut(&VisitKey, &FileQcModel) -> fqc_model::Result<Vec<R>>,
{
    let sources = VisitSources::new()
        .with_inline(document)
        .with_log_filename(doc.name());
    let visit = extract(&sources)
        .and_then(|metadata| metadata.visit_key())
        .ok_or_else(|| "no visit identity".to_string())?;
    let record = FileQcModel::from_document(document).map_err(|e| e.to_string())?;
    debug!(document = %doc, %visit, gears = record.qc.len(), "scanning QC record");
    build(&visit, &record).map_err(|e| e.to_string())
}
