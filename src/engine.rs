//! RackRouteEngine that coordinates the schema, catalog, and sequencer
//! subsystems.

use crate::{Result, Router};
use parking_lot::Mutex;
use rackroute_core::{Choice, RackCatalog, RoutingTable, RunSnapshot, SourceCatalog};
use rackroute_schema::{
    parse_rack_map, parse_routing_matrix, parse_source_catalog, validate_rack_map,
    validate_routing_matrix, validate_source_catalog, RoutingMatrixDoc, ValidationMode,
};
use tracing::{info, warn};

/// Which of the three configuration documents an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Sources,
    Routing,
    Racks,
}

#[derive(Debug, Default)]
struct DocumentTexts {
    sources: String,
    routing: String,
    racks: String,
}

/// Main routing engine.
///
/// Triggers (`route_source`, `route_rack`) run the sequence synchronously
/// on the calling thread and never fail to the caller; document operations
/// (`apply_document`, `reload_all`) validate first and leave the previous
/// state untouched when validation rejects the input.
///
/// # Example
///
/// ```ignore
/// use rackroute::prelude::*;
///
/// let engine = RackRouteEngine::builder()
///     .routing_json(r#"{"matrix":{"3":[1,2]}}"#)
///     .transport(transport)
///     .build()?;
///
/// engine.route_source(3);
/// let state = engine.snapshot();
/// ```
pub struct RackRouteEngine {
    router: Router,
    max_racks: u32,
    mode: ValidationMode,
    /// Last accepted raw text per document, for display and re-export.
    texts: Mutex<DocumentTexts>,
}

impl std::fmt::Debug for RackRouteEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RackRouteEngine")
            .field("max_racks", &self.max_racks)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl RackRouteEngine {
    pub fn builder() -> crate::RackRouteEngineBuilder {
        crate::RackRouteEngineBuilder::default()
    }

    pub(crate) fn from_parts(router: Router, max_racks: u32, mode: ValidationMode) -> Self {
        Self {
            router,
            max_racks,
            mode,
            texts: Mutex::new(DocumentTexts::default()),
        }
    }

    pub fn max_racks(&self) -> u32 {
        self.max_racks
    }

    pub fn is_running(&self) -> bool {
        self.router.is_running()
    }

    pub fn snapshot(&self) -> RunSnapshot {
        self.router.snapshot()
    }

    // ---- triggers -------------------------------------------------------

    /// Route a source: runs every rack the routing matrix lists for it.
    pub fn route_source(&self, source: u32) {
        self.router.route_source(source);
    }

    /// Route a single rack, bypassing the matrix.
    pub fn route_rack(&self, rack_id: u32) {
        self.router.route_rack(rack_id);
    }

    // ---- documents ------------------------------------------------------

    /// Validate and install one document from raw JSON text.
    ///
    /// On any parse or validation error the previously accepted document
    /// stays in effect and the error is returned.
    pub fn apply_document(&self, kind: DocumentKind, text: &str) -> Result<()> {
        match kind {
            DocumentKind::Sources => {
                let doc = parse_source_catalog(text)?;
                validate_source_catalog(&doc, self.mode)?;
                self.router.install_sources(SourceCatalog::from_doc(&doc));
            }
            DocumentKind::Routing => {
                let doc = parse_routing_matrix(text)?;
                validate_routing_matrix(&doc, self.max_racks)?;
                self.router.install_routing(RoutingTable::from_doc(&doc));
            }
            DocumentKind::Racks => {
                let doc = parse_rack_map(text)?;
                validate_rack_map(&doc, self.max_racks)?;
                self.router.install_racks(RackCatalog::from_doc(&doc));
            }
        }
        let mut texts = self.texts.lock();
        match kind {
            DocumentKind::Sources => texts.sources = text.to_string(),
            DocumentKind::Routing => texts.routing = text.to_string(),
            DocumentKind::Racks => texts.racks = text.to_string(),
        }
        info!(?kind, "document applied");
        Ok(())
    }

    /// Re-validate and re-install all three documents from their cached
    /// text.
    ///
    /// Each document is handled independently: one failing document keeps
    /// its previous derived view while the others still reload. Documents
    /// that were never applied are skipped. The first error is returned.
    pub fn reload_all(&self) -> Result<()> {
        let (sources, routing, racks) = {
            let texts = self.texts.lock();
            (
                texts.sources.clone(),
                texts.routing.clone(),
                texts.racks.clone(),
            )
        };

        let mut first_error = None;
        for (kind, text) in [
            (DocumentKind::Sources, sources),
            (DocumentKind::Routing, routing),
            (DocumentKind::Racks, racks),
        ] {
            if text.is_empty() {
                continue;
            }
            if let Err(e) = self.apply_document(kind, &text) {
                warn!(?kind, error = %e, "reload rejected, previous view kept");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            None => {
                info!("all documents reloaded");
                Ok(())
            }
            Some(e) => Err(e),
        }
    }

    /// The last accepted raw text of a document. Empty until one is applied.
    pub fn document_text(&self, kind: DocumentKind) -> String {
        let texts = self.texts.lock();
        match kind {
            DocumentKind::Sources => texts.sources.clone(),
            DocumentKind::Routing => texts.routing.clone(),
            DocumentKind::Racks => texts.racks.clone(),
        }
    }

    /// Replace the routing matrix with an empty one and return its text.
    /// Every source trigger becomes a no-op sequence until a new matrix is
    /// applied.
    pub fn empty_routing(&self) -> String {
        let text = serde_json::to_string_pretty(&RoutingMatrixDoc::default())
            .unwrap_or_else(|_| String::from(r#"{"matrix":{}}"#));
        self.router.install_routing(RoutingTable::default());
        self.texts.lock().routing = text.clone();
        info!("routing matrix cleared");
        text
    }

    /// Clear one rack's step program, keeping its enable flag, and refresh
    /// the stored rack map text to match.
    pub fn reset_rack_steps(&self, rack_id: u32) -> bool {
        if !self.router.reset_rack_steps(rack_id) {
            return false;
        }
        let doc = self.router.racks().to_doc();
        if let Ok(text) = serde_json::to_string_pretty(&doc) {
            self.texts.lock().racks = text;
        }
        true
    }

    // ---- choice lists ---------------------------------------------------

    /// Source choices in catalog order (channels, buses, mains, matrices).
    pub fn source_choices(&self) -> Vec<Choice> {
        self.router.sources().choices().to_vec()
    }

    /// Rack choices in ascending id order.
    pub fn rack_choices(&self) -> Vec<Choice> {
        self.router.racks().choices()
    }

    /// Display label for a source index; empty string when unknown.
    pub fn source_label(&self, index: u32) -> String {
        self.router.sources().label(index).to_string()
    }
}
