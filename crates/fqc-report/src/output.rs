//! CSV report output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{ReportError, Result};
use crate::rows::ReportRow;

/// Write rows as CSV with a header line, even when there are no rows.
pub fn write_csv<W: Write, R: ReportRow>(writer: W, rows: &[R]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(R::HEADERS)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_csv_file<R: ReportRow>(path: &Path, rows: &[R]) -> Result<()> {
    let file = File::create(path).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, rows)
}
