//! qc-status.log naming.
//!
//! Every visit gets a QC log artifact named
//! `<ptid>_<YYYY-MM-DD>_<module>_qc-status.log`. Stages find each other's
//! logs by this name, so generation and parsing must stay exact inverses.

use std::sync::LazyLock;

use regex::Regex;

use fqc_model::{VisitKey, VisitMetadata, normalize_module};

/// Suffix shared by all QC log file names.
pub const QC_LOG_SUFFIX: &str = "qc-status.log";

/// PTID: 1-10 printable non-space ASCII; date: strict `YYYY-MM-DD`; module: word characters.
static QC_LOG_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([!-~]{1,10})_(\d{4}-\d{2}-\d{2})_(\w+)_qc-status\.log$")
        .expect("Invalid qc-status log regex")
});

/// `<ptid>_<date>_<module>` with the module in lowercase.
pub fn qc_log_prefix(ptid: &str, date: &str, module: &str) -> String {
    format!("{ptid}_{date}_{}", module.trim().to_lowercase())
}

/// QC log file name for a visit.
pub fn qc_log_filename(ptid: &str, date: &str, module: &str) -> String {
    format!("{}_{QC_LOG_SUFFIX}", qc_log_prefix(ptid, date, module))
}

/// QC log file name for a visit key.
pub fn qc_log_filename_for(key: &VisitKey) -> String {
    qc_log_filename(key.ptid(), key.date(), key.module())
}

pub fn is_qc_log_filename(name: &str) -> bool {
    QC_LOG_NAME.is_match(name)
}

/// Recover ptid, date and uppercase module from a QC log file name.
pub fn parse_qc_log_filename(name: &str) -> Option<VisitMetadata> {
    let captures = QC_LOG_NAME.captures(name)?;
    Some(VisitMetadata::new(
        &captures[1],
        &captures[2],
        normalize_module(&captures[3]),
    ))
}
