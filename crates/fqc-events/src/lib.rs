//! Visit events.
//!
//! [`EventAccumulator`] turns submissions and QC outcomes, observed in any
//! order, into exactly one submit event and one outcome event per visit, and
//! hands them to an [`EventSink`].

pub mod accumulator;
pub mod clock;
pub mod error;
pub mod event;
pub mod pending;
pub mod sink;

pub use accumulator::{
    AccumulatorStats, DEFAULT_EVENT_GEAR, EventAccumulator, EventContext, Finalized,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Result, SinkError};
pub use event::{EventAction, FORM_DATATYPE, VisitEvent};
pub use pending::{PendingVisit, PendingVisits};
pub use sink::{DirectoryEventSink, EventSink, MemoryEventSink, event_filename};
