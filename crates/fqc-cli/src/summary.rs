use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use fqc_cli::logging::redact_value;
use fqc_coordinator::{CoordinationReport, VisitState};
use fqc_report::ScanSummary;

use crate::cli::ReportKindArg;
use crate::commands::EventsResult;

pub fn print_coordination(report: &CoordinationReport) {
    println!(
        "Participant: {}  Module: {}",
        redact_value(&report.ptid),
        report.module
    );
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Visit date"),
        header_cell("Visit"),
        header_cell("State"),
        header_cell("Errors"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 4, CellAlignment::Right);
    for outcome in &report.outcomes {
        table.add_row(vec![
            Cell::new(&outcome.visit.file),
            Cell::new(&outcome.visit.visit_date),
            outcome
                .visit
                .visitnum
                .as_deref()
                .map_or_else(|| dim_cell("-"), Cell::new),
            state_cell(outcome.state),
            count_cell(Some(outcome.errors.len()), Color::Red),
        ]);
    }
    println!("{table}");
    println!(
        "Triggered: {}  Passed: {}  Failed: {}  Blocked: {}",
        report.triggered,
        report.count(VisitState::Passed),
        report.count(VisitState::Failed),
        report.count(VisitState::Blocked)
    );
    if let Some(failure) = report.first_failure() {
        for error in &failure.errors {
            eprintln!("- {}: [{}] {}", failure.visit.file, error.code(), error.message());
        }
    }
}

pub fn print_report(kind: ReportKindArg, summary: &ScanSummary) {
    let label = match kind {
        ReportKindArg::Status => "status",
        ReportKindArg::Error => "error",
    };
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Report"),
        header_cell("Scanned"),
        header_cell("Reported"),
        header_cell("Skipped"),
        header_cell("Rows"),
    ]);
    apply_table_style(&mut table);
    for index in 1..5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new(label).add_attribute(Attribute::Bold),
        Cell::new(summary.scanned),
        Cell::new(summary.reported),
        count_cell(Some(summary.skipped), Color::Yellow),
        Cell::new(summary.rows),
    ]);
    // Rows may have gone to stdout; keep the summary off it.
    eprintln!("{table}");
}

pub fn print_events(result: &EventsResult) {
    let stats = &result.stats;
    let mut table = Table::new();
    table.set_header(vec![header_cell("Counter"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows = [
        ("Submission rows", Some(result.submission_rows), None),
        ("Rejected rows", Some(result.submission_errors), Some(Color::Yellow)),
        ("Visits finalized", Some(stats.finalized), None),
        ("Unchanged outcomes", Some(result.scan.unchanged), None),
        ("Unfinished logs", Some(result.scan.unfinished), None),
        ("Skipped logs", Some(result.scan.skipped), Some(Color::Yellow)),
        ("Submit events", Some(stats.submit_events), None),
        ("Outcome events", Some(stats.outcome_events), None),
        ("Events written", Some(result.written), None),
        ("Sink failures", Some(stats.sink_failures), Some(Color::Red)),
        ("Unidentified", Some(stats.unidentified), Some(Color::Yellow)),
        ("Unmatched submissions", Some(result.unmatched.len()), Some(Color::Yellow)),
    ];
    for (label, count, color) in rows {
        let value = match color {
            Some(color) => count_cell(count, color),
            None => count.map_or_else(|| dim_cell("-"), Cell::new),
        };
        table.add_row(vec![Cell::new(label), value]);
    }
    println!("{table}");
    for pending in &result.unmatched {
        eprintln!(
            "- no QC outcome for {} ({})",
            pending.visit_key, pending.raw_source_filename
        );
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn state_cell(state: VisitState) -> Cell {
    let color = match state {
        VisitState::Passed => Color::Green,
        VisitState::Failed => Color::Red,
        VisitState::Blocked => Color::Yellow,
        VisitState::Pending | VisitState::Running => Color::DarkGrey,
    };
    Cell::new(state.label())
        .fg(color)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: Option<usize>, color: Color) -> Cell {
    match count {
        Some(value) if value > 0 => Cell::new(value).fg(color).add_attribute(Attribute::Bold),
        Some(value) => dim_cell(value),
        None => dim_cell("-"),
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
