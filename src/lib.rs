//! # RackRoute - MIDI Routing Control Engine
//!
//! Control engine for console-to-rack audio routing over MIDI, built from
//! modular subsystems.
//!
//! ## Architecture
//!
//! RackRoute is an umbrella crate that coordinates:
//! - **rackroute-schema** - Configuration documents (source catalog,
//!   routing matrix, rack map) and their validators
//! - **rackroute-core** - Catalogs, routing table, and the sequencer state
//!   machine
//! - **rackroute-midi** - MIDI step type, wire encoding, and the step
//!   transport capability (hardware output via feature `midi-hardware`)
//!
//! ## Quick Start
//!
//! ```ignore
//! use rackroute::prelude::*;
//! use std::sync::Arc;
//!
//! let transport = Arc::new(VariableTransport::default());
//! let engine = RackRouteEngine::builder()
//!     .routing_json(r#"{"matrix":{"3":[1,2]}}"#)
//!     .racks_json(racks_text)
//!     .transport(transport.clone())
//!     .build()?;
//!
//! // Selecting source 3 runs racks 1 and 2 in order.
//! engine.route_source(3);
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - In-process engine, no hardware I/O
//! - `midi-hardware` - midir-backed device output

/// Re-export of rackroute-core for direct access
pub use rackroute_core as core;

pub use rackroute_core::{
    Choice, NullSink, Rack, RackCatalog, Router, RoutingTable, RunSnapshot, SourceCatalog,
    StateSink, DEFAULT_SEQUENCE_TIMEOUT,
};

/// Re-export of rackroute-schema for direct access
pub use rackroute_schema as schema;

pub use rackroute_schema::{SchemaError, ValidationMode, DEFAULT_MAX_RACKS, MAX_STEPS_PER_RACK};

/// Re-export of rackroute-midi for direct access
pub use rackroute_midi as midi;

pub use rackroute_midi::{
    LastDispatched, MidiStep, RawStepBytes, StepKind, StepTransport, TransportError,
    VariableTransport,
};

#[cfg(feature = "midi-hardware")]
pub use rackroute_midi::{MidiOutputDevice, MidiOutputManager};

mod builder;
mod engine;
mod error;

pub use builder::RackRouteEngineBuilder;
pub use engine::{DocumentKind, RackRouteEngine};
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{DocumentKind, RackRouteEngine, RackRouteEngineBuilder};

    pub use crate::{Choice, MidiStep, RunSnapshot, StateSink, StepTransport, VariableTransport};

    #[cfg(feature = "midi-hardware")]
    pub use crate::MidiOutputManager;
}
