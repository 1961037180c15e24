//! Typed representations of the three JSON configuration documents.
//!
//! Field names and nesting are part of the wire contract; the documents are
//! hand-edited text, so parsing stays tolerant of unknown fields and range
//! checks live in [`crate::validate`] rather than in serde.

use rackroute_midi::MidiStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Category of a source entry; also the precedence order for label lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceCategory {
    Channel,
    Bus,
    Main,
    Matrix,
}

/// One selectable source (console channel, bus, main, or matrix).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceEntry {
    pub index: u32,
    pub label: String,
    /// Required and checked against the containing list in strict mode.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SourceCategory>,
}

/// The source catalog document (`channels`/`buses`/`mains`/`matrices`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCatalogDoc {
    #[serde(default)]
    pub channels: Vec<SourceEntry>,
    #[serde(default)]
    pub buses: Vec<SourceEntry>,
    #[serde(default)]
    pub mains: Vec<SourceEntry>,
    #[serde(default)]
    pub matrices: Vec<SourceEntry>,
}

impl SourceCatalogDoc {
    /// The four lists in fixed flattening order with their wire names.
    pub fn lists(&self) -> [(&'static str, &[SourceEntry]); 4] {
        [
            ("channels", &self.channels),
            ("buses", &self.buses),
            ("mains", &self.mains),
            ("matrices", &self.matrices),
        ]
    }
}

/// The routing matrix document: source index (decimal string) to rack ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingMatrixDoc {
    pub matrix: BTreeMap<String, Vec<u32>>,
}

/// One rack definition inside the rack map document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackDef {
    pub name: String,
    pub enabled: bool,
    #[serde(rename = "midiSteps")]
    pub midi_steps: Vec<MidiStep>,
}

/// The rack map document: rack id (decimal string) to rack definition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RackMapDoc {
    pub racks: BTreeMap<String, RackDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_catalog_lists_are_optional_on_the_wire() {
        // Missing lists default to empty; the strict validator rejects them later.
        let doc: SourceCatalogDoc = serde_json::from_str(r#"{"channels":[]}"#).unwrap();
        assert!(doc.buses.is_empty());
        assert!(doc.matrices.is_empty());
    }

    #[test]
    fn source_entry_type_tag_round_trips() {
        let entry: SourceEntry =
            serde_json::from_str(r#"{"index":3,"label":"Vox","type":"channel"}"#).unwrap();
        assert_eq!(entry.category, Some(SourceCategory::Channel));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "channel");
    }

    #[test]
    fn rack_def_uses_midi_steps_wire_name() {
        let doc: RackMapDoc = serde_json::from_str(
            r#"{"racks":{"1":{"name":"FX","enabled":true,"midiSteps":[]}}}"#,
        )
        .unwrap();
        assert_eq!(doc.racks["1"].name, "FX");
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["racks"]["1"].get("midiSteps").is_some());
    }
}
