//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use fqc_coordinator::{CoordinationReport, QcCoordinator, VisitDescriptor, VisitLookupCache};
use fqc_events::{AccumulatorStats, DirectoryEventSink, EventAccumulator, PendingVisit};
use fqc_ingest::read_submission_file;
use fqc_report::{ReportRow, ScanSummary, error_report, status_report, write_csv};
use fqc_store::DirectoryStore;
use tracing::{info, info_span, warn};

use fqc_cli::config::PipelineConfig;
use fqc_cli::logging::redact_value;
use fqc_cli::outcomes::{OutcomeScan, finalize_store_outcomes};
use fqc_cli::trigger::ProcessTrigger;

use crate::cli::{Cli, CoordinateArgs, EventsArgs, ReportArgs, ReportKindArg};

/// Environment variable carrying the store root to triggered gears.
pub const STORE_ROOT_ENV: &str = "FQC_STORE_ROOT";

/// Result of an `events` run.
pub struct EventsResult {
    pub submission_rows: usize,
    pub submission_errors: usize,
    pub stats: AccumulatorStats,
    pub scan: OutcomeScan,
    pub unmatched: Vec<PendingVisit>,
    pub written: usize,
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let config = PipelineConfig::load_or_default(cli.config.as_deref())?;
    Ok(config)
}

pub fn run_coordinate(cli: &Cli, args: &CoordinateArgs) -> Result<CoordinationReport> {
    let config = load_config(cli)?;
    let store = DirectoryStore::new(&cli.store);
    let visits = load_visits(&args.visits)?;
    let registry = config.registry();

    let Some(trigger) = ProcessTrigger::from_command(&config.trigger.command) else {
        bail!("no validation gear command configured ([trigger] command)");
    };
    let mut trigger = trigger.with_env(STORE_ROOT_ENV, cli.store.display().to_string());

    let span = info_span!("coordinate", ptid = %redact_value(&args.ptid));
    let _guard = span.enter();
    info!(visits = visits.len(), "starting coordination");

    let mut coordinator =
        QcCoordinator::new(&store, &mut trigger, &registry, VisitLookupCache::new())
            .with_gear_name(config.coordinator.gear_name.as_str())
            .with_wait_policy(config.wait_policy());
    let report = coordinator
        .run(&args.ptid, &args.module, visits)
        .with_context(|| format!("coordinate module {}", args.module))?;
    Ok(report)
}

fn load_visits(path: &Path) -> Result<Vec<VisitDescriptor>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let visits = serde_json::from_reader(io::BufReader::new(file))
        .with_context(|| format!("parse visits from {}", path.display()))?;
    Ok(visits)
}

pub fn run_report(cli: &Cli, args: &ReportArgs) -> Result<ScanSummary> {
    let store = DirectoryStore::new(&cli.store);
    match args.kind {
        ReportKindArg::Status => {
            let outcome = status_report(&store).context("build status report")?;
            emit_rows(args.output.as_deref(), &outcome.rows)?;
            Ok(outcome.summary)
        }
        ReportKindArg::Error => {
            let outcome = error_report(&store).context("build error report")?;
            emit_rows(args.output.as_deref(), &outcome.rows)?;
            Ok(outcome.summary)
        }
    }
}

fn emit_rows<R: ReportRow>(output: Option<&Path>, rows: &[R]) -> Result<()> {
    match output {
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_csv(&mut writer, rows)?;
            writer
                .flush()
                .with_context(|| format!("write {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_csv(&mut writer, rows)?;
            writer.flush().context("write report to stdout")?;
        }
    }
    Ok(())
}

pub fn run_events(cli: &Cli, args: &EventsArgs) -> Result<EventsResult> {
    let config = load_config(cli)?;
    let store = DirectoryStore::new(&cli.store);
    let uploaded_at = parse_uploaded_at(args.uploaded_at.as_deref())?;

    let mut sink = DirectoryEventSink::new(&args.events_dir);
    let mut accumulator = EventAccumulator::new(&mut sink, config.event_context());

    let mut submission_rows = 0;
    let mut submission_errors = 0;
    if let Some(path) = &args.submission {
        let batch = read_submission_file(path)
            .with_context(|| format!("read submission {}", path.display()))?;
        submission_errors = batch.errors.len();
        let raw_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        for row in &batch.rows {
            if accumulator.record_submission(&row.visit, uploaded_at, &raw_name) {
                submission_rows += 1;
            }
        }
        for error in &batch.errors {
            let location = error.location().map(ToString::to_string);
            warn!(
                location = location.as_deref().unwrap_or("-"),
                code = error.code(),
                "submission row skipped"
            );
        }
    }

    let scan = finalize_store_outcomes(&store, &mut accumulator)
        .context("finalize QC outcomes")?;

    let (unmatched, stats) = accumulator.finish();
    Ok(EventsResult {
        submission_rows,
        submission_errors,
        stats,
        scan,
        unmatched,
        written: sink.written(),
    })
}

fn parse_uploaded_at(value: Option<&str>) -> Result<DateTime<Utc>> {
    match value {
        None => Ok(Utc::now()),
        Some(text) => {
            let parsed = DateTime::parse_from_rfc3339(text)
                .with_context(|| format!("invalid --uploaded-at timestamp: {text}"))?;
            Ok(parsed.with_timezone(&Utc))
        }
    }
}
