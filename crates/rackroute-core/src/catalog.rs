//! Read-only lookup views derived from validated documents.
//!
//! Catalogs are rebuilt wholesale and installed with an atomic swap; a view
//! handed out before a reload stays consistent for the rest of its use.

use rackroute_midi::MidiStep;
use rackroute_schema::{RackDef, RackMapDoc, SourceCatalogDoc};
use std::collections::BTreeMap;

/// One entry of a UI choice list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: u32,
    pub label: String,
}

/// Flattened source choice list with label lookup.
///
/// Entries keep the fixed flattening order channels, buses, mains, matrices;
/// label lookup walks the same order, so a channel shadows a bus carrying
/// the same index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceCatalog {
    choices: Vec<Choice>,
}

impl SourceCatalog {
    pub fn from_doc(doc: &SourceCatalogDoc) -> Self {
        let mut choices = Vec::new();
        for (_, entries) in doc.lists() {
            for entry in entries {
                choices.push(Choice {
                    id: entry.index,
                    label: entry.label.clone(),
                });
            }
        }
        Self { choices }
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    /// Label for a source index; empty string when the index is unknown.
    pub fn label(&self, index: u32) -> &str {
        self.choices
            .iter()
            .find(|c| c.id == index)
            .map(|c| c.label.as_str())
            .unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// One addressable rack: enable flag plus its ordered step program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rack {
    pub name: String,
    pub enabled: bool,
    pub steps: Vec<MidiStep>,
}

/// Rack id to rack definition, derived from a validated rack map document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RackCatalog {
    racks: BTreeMap<u32, Rack>,
}

impl RackCatalog {
    pub fn from_doc(doc: &RackMapDoc) -> Self {
        let racks = doc
            .racks
            .iter()
            .filter_map(|(key, rack)| {
                let id: u32 = key.parse().ok()?;
                Some((
                    id,
                    Rack {
                        name: rack.name.clone(),
                        enabled: rack.enabled,
                        steps: rack.midi_steps.clone(),
                    },
                ))
            })
            .collect();
        Self { racks }
    }

    pub fn get(&self, id: u32) -> Option<&Rack> {
        self.racks.get(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.racks.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.racks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.racks.is_empty()
    }

    /// Choice list in ascending id order, labelled the way the control
    /// surface renders racks.
    pub fn choices(&self) -> Vec<Choice> {
        self.racks
            .keys()
            .map(|&id| Choice {
                id,
                label: format!("Rack {id}"),
            })
            .collect()
    }

    /// A copy of this catalog with the given rack's step list cleared.
    /// Returns `None` when the rack is unknown.
    pub fn with_cleared_steps(&self, id: u32) -> Option<Self> {
        if !self.racks.contains_key(&id) {
            return None;
        }
        let mut next = self.clone();
        if let Some(rack) = next.racks.get_mut(&id) {
            rack.steps.clear();
        }
        Some(next)
    }

    /// Back to the wire document, for re-serializing after in-place edits.
    pub fn to_doc(&self) -> RackMapDoc {
        let racks = self
            .racks
            .iter()
            .map(|(id, rack)| {
                (
                    id.to_string(),
                    RackDef {
                        name: rack.name.clone(),
                        enabled: rack.enabled,
                        midi_steps: rack.steps.clone(),
                    },
                )
            })
            .collect();
        RackMapDoc { racks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackroute_schema::{validate_rack_map, SourceEntry};

    fn entry(index: u32, label: &str) -> SourceEntry {
        SourceEntry {
            index,
            label: label.to_string(),
            category: None,
        }
    }

    fn catalog_doc() -> SourceCatalogDoc {
        SourceCatalogDoc {
            channels: vec![entry(1, "Vox"), entry(2, "Git")],
            buses: vec![entry(10, "Mon"), entry(2, "Bus Git")],
            mains: vec![entry(20, "Main L/R")],
            matrices: vec![entry(30, "Mtx A")],
        }
    }

    #[test]
    fn choices_keep_flattening_order() {
        let catalog = SourceCatalog::from_doc(&catalog_doc());
        let ids: Vec<u32> = catalog.choices().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 10, 2, 20, 30]);
    }

    #[test]
    fn label_lookup_prefers_channels() {
        // Index 2 exists both as channel and bus; channels win.
        let catalog = SourceCatalog::from_doc(&catalog_doc());
        assert_eq!(catalog.label(2), "Git");
        assert_eq!(catalog.label(10), "Mon");
        assert_eq!(catalog.label(30), "Mtx A");
    }

    #[test]
    fn label_lookup_misses_as_empty_string() {
        let catalog = SourceCatalog::from_doc(&catalog_doc());
        assert_eq!(catalog.label(99), "");
        assert_eq!(SourceCatalog::default().label(1), "");
    }

    fn rack_doc() -> RackMapDoc {
        let mut doc = RackMapDoc::default();
        doc.racks.insert(
            "7".into(),
            RackDef {
                name: "FX".into(),
                enabled: true,
                midi_steps: vec![MidiStep::cc(1, 10, 64)],
            },
        );
        doc.racks.insert(
            "2".into(),
            RackDef {
                name: "Dyn".into(),
                enabled: false,
                midi_steps: vec![],
            },
        );
        doc
    }

    #[test]
    fn rack_catalog_lookup_and_choices() {
        let catalog = RackCatalog::from_doc(&rack_doc());
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get(7).map(|r| r.name.as_str()), Some("FX"));
        assert!(catalog.get(3).is_none());

        let choices = catalog.choices();
        assert_eq!(choices[0].id, 2);
        assert_eq!(choices[1].label, "Rack 7");
    }

    #[test]
    fn cleared_steps_keeps_rack_enabled() {
        let catalog = RackCatalog::from_doc(&rack_doc());
        let next = catalog.with_cleared_steps(7).unwrap();
        let rack = next.get(7).unwrap();
        assert!(rack.steps.is_empty());
        assert!(rack.enabled);
        // The original view is untouched.
        assert_eq!(catalog.get(7).unwrap().steps.len(), 1);
    }

    #[test]
    fn cleared_steps_on_unknown_rack_is_none() {
        let catalog = RackCatalog::from_doc(&rack_doc());
        assert!(catalog.with_cleared_steps(99).is_none());
    }

    #[test]
    fn to_doc_round_trip_revalidates() {
        let doc = rack_doc();
        let catalog = RackCatalog::from_doc(&doc);
        let back = catalog.to_doc();
        assert_eq!(back, doc);
        assert!(validate_rack_map(&back, 64).is_ok());
    }
}
