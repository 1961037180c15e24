//! Source-to-rack routing table.

use rackroute_schema::RoutingMatrixDoc;
use std::collections::BTreeMap;

/// Mapping from source index to the ordered rack ids it activates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoutingTable {
    map: BTreeMap<u32, Vec<u32>>,
}

impl RoutingTable {
    pub fn from_doc(doc: &RoutingMatrixDoc) -> Self {
        let map = doc
            .matrix
            .iter()
            .filter_map(|(key, rack_ids)| Some((key.parse().ok()?, rack_ids.clone())))
            .collect();
        Self { map }
    }

    /// Rack ids for a source, in document order. An unrouted source yields
    /// the empty slice; that is a legal no-op sequence, not an error.
    pub fn racks_for(&self, source: u32) -> &[u32] {
        self.map.get(&source).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn to_doc(&self) -> RoutingMatrixDoc {
        RoutingMatrixDoc {
            matrix: self
                .map
                .iter()
                .map(|(source, ids)| (source.to_string(), ids.clone()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rackroute_schema::validate_routing_matrix;

    #[test]
    fn racks_for_preserves_document_order() {
        let doc: RoutingMatrixDoc =
            serde_json::from_str(r#"{"matrix":{"3":[4,1,2],"5":[7]}}"#).unwrap();
        let table = RoutingTable::from_doc(&doc);
        assert_eq!(table.racks_for(3), &[4, 1, 2]);
        assert_eq!(table.racks_for(5), &[7]);
    }

    #[test]
    fn unrouted_source_is_empty() {
        let table = RoutingTable::default();
        assert_eq!(table.racks_for(42), &[] as &[u32]);
        assert!(table.is_empty());
    }

    #[test]
    fn to_doc_round_trip_revalidates() {
        let doc: RoutingMatrixDoc = serde_json::from_str(r#"{"matrix":{"3":[1,2]}}"#).unwrap();
        let table = RoutingTable::from_doc(&doc);
        let back = table.to_doc();
        assert_eq!(back, doc);
        assert!(validate_routing_matrix(&back, 64).is_ok());
    }
}
