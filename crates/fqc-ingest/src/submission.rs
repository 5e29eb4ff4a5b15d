//! Submission CSV reading.
//!
//! Each row of an uploaded CSV is one visit. Rows missing ptid, visit date or
//! module are reported as errors and left out; they never abort the batch.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use fqc_model::{ErrorLocation, ErrorType, FileError, VisitMetadata};
use serde_json::Value;

use crate::error::{IngestError, Result};

/// Error code for a row without a required identity field.
pub const MISSING_VISIT_FIELD: &str = "missing-visit-field";

const PTID: &str = "ptid";
const MODULE: &str = "module";
const DATE_COLUMNS: &[&str] = &["visitdate", "date"];

/// One usable row of a submission CSV.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    /// Line number of the row in the file (the header is line 1).
    pub line: u64,
    pub visit: VisitMetadata,
}

/// Parsed submission CSV.
#[derive(Debug, Clone, Default)]
pub struct SubmissionBatch {
    pub rows: Vec<SubmissionRow>,
    pub errors: Vec<FileError>,
}

#[derive(Debug)]
struct Columns {
    ptid: usize,
    date: usize,
    date_name: String,
    module: usize,
    visitnum: Option<usize>,
    packet: Option<usize>,
    adcid: Option<usize>,
    naccid: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let find = |name: &str| normalized.iter().position(|h| h == name);
        let required = |name: &str| {
            find(name).ok_or_else(|| IngestError::MissingColumn {
                column: name.to_string(),
            })
        };

        let (date, date_name) = DATE_COLUMNS
            .iter()
            .find_map(|name| find(name).map(|idx| (idx, (*name).to_string())))
            .ok_or_else(|| IngestError::MissingColumn {
                column: DATE_COLUMNS[0].to_string(),
            })?;

        Ok(Self {
            ptid: required(PTID)?,
            date,
            date_name,
            module: required(MODULE)?,
            visitnum: find("visitnum"),
            packet: find("packet"),
            adcid: find("adcid"),
            naccid: find("naccid"),
        })
    }
}

fn cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<String> {
    let value = record.get(idx?)?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Read a submission CSV from any reader.
pub fn read_submission_csv<R: Read>(reader: R) -> Result<SubmissionBatch> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let columns = Columns::from_headers(csv_reader.headers()?)?;

    let mut batch = SubmissionBatch::default();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, csv::Position::line);
        let visit = VisitMetadata {
            ptid: cell(&record, Some(columns.ptid)),
            date: cell(&record, Some(columns.date)),
            module: cell(&record, Some(columns.module)),
            visitnum: cell(&record, columns.visitnum),
            packet: cell(&record, columns.packet),
            adcid: cell(&record, columns.adcid).and_then(|value| value.parse().ok()),
            naccid: cell(&record, columns.naccid),
        };

        let missing = [
            (PTID, visit.ptid.is_none()),
            (columns.date_name.as_str(), visit.date.is_none()),
            (MODULE, visit.module.is_none()),
        ]
        .into_iter()
        .find_map(|(name, absent)| absent.then_some(name));

        match missing {
            None => batch.rows.push(SubmissionRow { line, visit }),
            Some(column) => batch.errors.push(
                FileError::new(
                    ErrorType::Error,
                    MISSING_VISIT_FIELD,
                    format!("Row is missing required field {column}"),
                )
                .with_location(ErrorLocation::csv(line, column))
                .with_visit(&visit),
            ),
        }
    }
    Ok(batch)
}

/// Read a submission CSV from disk.
pub fn read_submission_file(path: &Path) -> Result<SubmissionBatch> {
    let file = File::open(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    read_submission_csv(file)
}

/// Load a JSON document from disk.
pub fn load_json_document(path: &Path) -> Result<Value> {
    let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| IngestError::JsonParse {
        path: path.to_path_buf(),
        source: e,
    })
}
