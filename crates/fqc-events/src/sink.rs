//! Event sinks.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, SinkError};
use crate::event::VisitEvent;

/// Destination for visit events. May fail; callers decide what a failure means.
pub trait EventSink {
    fn log_event(&mut self, event: &VisitEvent) -> Result<()>;
}

/// Keeps events in memory.
#[derive(Debug, Default)]
pub struct MemoryEventSink {
    events: Vec<VisitEvent>,
}

impl MemoryEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[VisitEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<VisitEvent> {
        self.events
    }
}

impl EventSink for MemoryEventSink {
    fn log_event(&mut self, event: &VisitEvent) -> Result<()> {
        self.events.push(event.clone());
        Ok(())
    }
}

/// Writes one JSON file per event into a directory.
#[derive(Debug, Clone)]
pub struct DirectoryEventSink {
    root: PathBuf,
    written: usize,
}

impl DirectoryEventSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            written: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn written(&self) -> usize {
        self.written
    }
}

impl EventSink for DirectoryEventSink {
    fn log_event(&mut self, event: &VisitEvent) -> Result<()> {
        fs::create_dir_all(&self.root).map_err(|source| SinkError::Io {
            path: self.root.clone(),
            source,
        })?;
        let path = self.root.join(event_filename(event));
        let bytes = serde_json::to_vec_pretty(event)?;
        fs::write(&path, bytes).map_err(|source| SinkError::Io {
            path: path.clone(),
            source,
        })?;
        self.written += 1;
        debug!(path = %path.display(), action = %event.action, "wrote event");
        Ok(())
    }
}

/// `log-<action>-<YYYYMMDD-HHMMSS>-<adcid>-<project>-<ptid>[-<visitnum>].json`
pub fn event_filename(event: &VisitEvent) -> String {
    let mut name = format!(
        "log-{}-{}-{}-{}-{}",
        event.action,
        event.timestamp.format("%Y%m%d-%H%M%S"),
        event.pipeline_adcid,
        path_segment(&event.project_label),
        path_segment(&event.ptid),
    );
    if let Some(visitnum) = &event.visit_number {
        name.push('-');
        name.push_str(&path_segment(visitnum));
    }
    name.push_str(".json");
    name
}

fn path_segment(value: &str) -> String {
    value.replace(['/', '\\'], "_")
}
