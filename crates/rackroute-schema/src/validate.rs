//! Validators for the three configuration documents.
//!
//! Each validator is a total, side-effect-free check over an already parsed
//! document. Any failure rejects the whole document; callers keep the
//! previously accepted one (or the empty default) in effect.

use crate::document::{RackMapDoc, RoutingMatrixDoc, SourceCatalogDoc, SourceCategory};
use rackroute_midi::MidiStep;
use std::collections::BTreeSet;
use thiserror::Error;

/// Upper bound on steps per rack.
pub const MAX_STEPS_PER_RACK: usize = 1000;

/// Default rack id limit when none is configured.
pub const DEFAULT_MAX_RACKS: u32 = 64;

/// Fixed list lengths required by [`ValidationMode::Strict`], in the order
/// channels, buses, mains, matrices.
pub const STRICT_LIST_LENGTHS: [usize; 4] = [48, 16, 4, 8];

/// How strictly the source catalog is checked.
///
/// `Relaxed` accepts any list lengths and optional category tags; `Strict`
/// requires the fixed console layout (48/16/4/8) and a matching `type` tag
/// on every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    #[default]
    Relaxed,
    Strict,
}

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("source index {0} appears more than once")]
    DuplicateSourceIndex(u32),

    #[error("{list} must contain exactly {expected} entries, found {found}")]
    ListLength {
        list: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{list} entry with index {index} is missing or has a mismatched type tag")]
    CategoryMismatch { list: &'static str, index: u32 },

    #[error("routing key {0:?} is not a valid u32 source index")]
    BadSourceKey(String),

    #[error("source {source_index}: rack id {id} out of range 1..={max}")]
    RackIdOutOfRange {
        source_index: u32,
        id: u32,
        max: u32,
    },

    #[error("source {source_index}: rack id {id} listed more than once")]
    DuplicateRackId { source_index: u32, id: u32 },

    #[error("rack key {0:?} is not a valid u32 rack id")]
    BadRackKey(String),

    #[error("rack id {id} out of range 1..={max}")]
    RackKeyOutOfRange { id: u32, max: u32 },

    #[error("rack {id}: {found} steps exceeds the limit of {limit}")]
    TooManySteps {
        id: u32,
        found: usize,
        limit: usize,
    },

    #[error("rack {id} step {step}: channel {channel} out of range 1..=16")]
    ChannelOutOfRange { id: u32, step: usize, channel: u8 },

    #[error("rack {id} step {step}: {field} {value} exceeds 127")]
    DataOutOfRange {
        id: u32,
        step: usize,
        field: &'static str,
        value: u8,
    },
}

pub fn parse_source_catalog(text: &str) -> Result<SourceCatalogDoc, SchemaError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_routing_matrix(text: &str) -> Result<RoutingMatrixDoc, SchemaError> {
    Ok(serde_json::from_str(text)?)
}

pub fn parse_rack_map(text: &str) -> Result<RackMapDoc, SchemaError> {
    Ok(serde_json::from_str(text)?)
}

/// All-digit keys that overflow u32 are rejected the same way as
/// non-numeric ones; the error text covers both.
fn decimal_key(key: &str) -> Option<u32> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

/// Validate the source catalog document.
///
/// Indices must be pairwise distinct across the union of all four lists;
/// the check fails on the first repeated index.
pub fn validate_source_catalog(
    doc: &SourceCatalogDoc,
    mode: ValidationMode,
) -> Result<(), SchemaError> {
    if mode == ValidationMode::Strict {
        for ((list, entries), expected) in doc.lists().into_iter().zip(STRICT_LIST_LENGTHS) {
            if entries.len() != expected {
                return Err(SchemaError::ListLength {
                    list,
                    expected,
                    found: entries.len(),
                });
            }
        }
        for ((list, entries), category) in doc.lists().into_iter().zip([
            SourceCategory::Channel,
            SourceCategory::Bus,
            SourceCategory::Main,
            SourceCategory::Matrix,
        ]) {
            for entry in entries {
                if entry.category != Some(category) {
                    return Err(SchemaError::CategoryMismatch {
                        list,
                        index: entry.index,
                    });
                }
            }
        }
    }

    let mut used = BTreeSet::new();
    for (_, entries) in doc.lists() {
        for entry in entries {
            if !used.insert(entry.index) {
                return Err(SchemaError::DuplicateSourceIndex(entry.index));
            }
        }
    }
    Ok(())
}

/// Validate the routing matrix against the configured rack limit.
///
/// Duplicate rack ids within one source's list are rejected regardless of
/// mode.
pub fn validate_routing_matrix(doc: &RoutingMatrixDoc, max_racks: u32) -> Result<(), SchemaError> {
    for (key, rack_ids) in &doc.matrix {
        let source = decimal_key(key).ok_or_else(|| SchemaError::BadSourceKey(key.clone()))?;
        let mut seen = BTreeSet::new();
        for &id in rack_ids {
            if id < 1 || id > max_racks {
                return Err(SchemaError::RackIdOutOfRange {
                    source_index: source,
                    id,
                    max: max_racks,
                });
            }
            if !seen.insert(id) {
                return Err(SchemaError::DuplicateRackId {
                    source_index: source,
                    id,
                });
            }
        }
    }
    Ok(())
}

fn validate_step(rack_id: u32, step_no: usize, step: &MidiStep) -> Result<(), SchemaError> {
    let channel = step.channel();
    if !(1..=16).contains(&channel) {
        return Err(SchemaError::ChannelOutOfRange {
            id: rack_id,
            step: step_no,
            channel,
        });
    }
    let check = |field: &'static str, value: u8| {
        if value > 127 {
            Err(SchemaError::DataOutOfRange {
                id: rack_id,
                step: step_no,
                field,
                value,
            })
        } else {
            Ok(())
        }
    };
    match step {
        MidiStep::ControlChange {
            controller, value, ..
        } => {
            check("controller", *controller)?;
            check("value", *value)
        }
        MidiStep::NoteOn { note, value, .. } => {
            check("note", *note)?;
            check("value", *value)
        }
        MidiStep::ProgramChange { program, .. } => check("program", *program),
    }
}

/// Validate the rack map against the configured rack limit.
pub fn validate_rack_map(doc: &RackMapDoc, max_racks: u32) -> Result<(), SchemaError> {
    for (key, rack) in &doc.racks {
        let id = decimal_key(key).ok_or_else(|| SchemaError::BadRackKey(key.clone()))?;
        if id < 1 || id > max_racks {
            return Err(SchemaError::RackKeyOutOfRange { id, max: max_racks });
        }
        if rack.midi_steps.len() > MAX_STEPS_PER_RACK {
            return Err(SchemaError::TooManySteps {
                id,
                found: rack.midi_steps.len(),
                limit: MAX_STEPS_PER_RACK,
            });
        }
        for (step_no, step) in rack.midi_steps.iter().enumerate() {
            validate_step(id, step_no, step)?;
        }
    }
    Ok(())
}
