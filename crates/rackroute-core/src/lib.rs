//! Catalog, routing table, and sequencer core for the rackroute engine.
//!
//! This crate holds the document-derived lookup views and the two-state
//! sequencer that turns a source or rack trigger into an ordered, bounded
//! run of MIDI steps. Documents are parsed and validated by
//! `rackroute-schema`; step encoding and transport live in
//! `rackroute-midi`.

pub(crate) mod catalog;
pub use catalog::{Choice, Rack, RackCatalog, SourceCatalog};

pub(crate) mod routing;
pub use routing::RoutingTable;

pub(crate) mod state;
pub use state::{NullSink, RunSnapshot, StateSink};

pub(crate) mod sequencer;
pub use sequencer::{Router, DEFAULT_SEQUENCE_TIMEOUT};
