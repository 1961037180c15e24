//! Configuration documents for the rackroute engine.
//!
//! Three JSON documents drive the router: the source catalog, the
//! source-to-rack routing matrix, and the per-rack MIDI step programs.
//! This crate owns their typed wire representations and the validators that
//! gate every load, reload, and apply.

pub(crate) mod document;
pub use document::{
    RackDef, RackMapDoc, RoutingMatrixDoc, SourceCatalogDoc, SourceCategory, SourceEntry,
};

pub(crate) mod validate;
pub use validate::{
    parse_rack_map, parse_routing_matrix, parse_source_catalog, validate_rack_map,
    validate_routing_matrix, validate_source_catalog, SchemaError, ValidationMode,
    DEFAULT_MAX_RACKS, MAX_STEPS_PER_RACK, STRICT_LIST_LENGTHS,
};
