//! Builder for configuring and constructing a `RackRouteEngine`.

use crate::engine::DocumentKind;
use crate::{Error, RackRouteEngine, Result, Router};
use rackroute_core::{NullSink, StateSink, DEFAULT_SEQUENCE_TIMEOUT};
use rackroute_midi::StepTransport;
use rackroute_schema::{ValidationMode, DEFAULT_MAX_RACKS};
use std::sync::Arc;
use std::time::Duration;

/// Initial documents are optional; a bare `build()` yields an engine with
/// empty catalogs where every trigger is a clean no-op. Initial documents
/// that fail validation abort the build.
///
/// # Example
///
/// ```ignore
/// use rackroute::prelude::*;
///
/// let engine = RackRouteEngine::builder()
///     .max_racks(16)
///     .timeout_ms(1000)
///     .transport(transport)
///     .racks_json(&std::fs::read_to_string("racks.json")?)
///     .build()?;
/// ```
pub struct RackRouteEngineBuilder {
    max_racks: u32,
    mode: ValidationMode,
    timeout: Duration,
    transport: Option<Arc<dyn StepTransport>>,
    sink: Option<Arc<dyn StateSink>>,
    sources_json: Option<String>,
    routing_json: Option<String>,
    racks_json: Option<String>,
}

impl Default for RackRouteEngineBuilder {
    fn default() -> Self {
        Self {
            max_racks: DEFAULT_MAX_RACKS,
            mode: ValidationMode::Relaxed,
            timeout: DEFAULT_SEQUENCE_TIMEOUT,
            transport: None,
            sink: None,
            sources_json: None,
            routing_json: None,
            racks_json: None,
        }
    }
}

impl RackRouteEngineBuilder {
    /// Default: 64
    pub fn max_racks(mut self, count: u32) -> Self {
        self.max_racks = count;
        self
    }

    /// Require the fixed console layout in the source catalog.
    pub fn strict(mut self) -> Self {
        self.mode = ValidationMode::Strict;
        self
    }

    /// Wall-clock budget for one sequence. Default: 1000 ms.
    pub fn timeout_ms(mut self, ms: u64) -> Self {
        self.timeout = Duration::from_millis(ms);
        self
    }

    /// Where steps are dispatched. Without one, steps are logged and
    /// skipped.
    pub fn transport(mut self, transport: Arc<dyn StepTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Where run state snapshots are published. Default: discarded.
    pub fn state_sink(mut self, sink: Arc<dyn StateSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn sources_json(mut self, text: &str) -> Self {
        self.sources_json = Some(text.to_string());
        self
    }

    pub fn routing_json(mut self, text: &str) -> Self {
        self.routing_json = Some(text.to_string());
        self
    }

    pub fn racks_json(mut self, text: &str) -> Self {
        self.racks_json = Some(text.to_string());
        self
    }

    pub fn build(self) -> Result<RackRouteEngine> {
        if self.max_racks == 0 {
            return Err(Error::InvalidConfig("max_racks must be at least 1".into()));
        }

        let sink = self.sink.unwrap_or_else(|| Arc::new(NullSink));
        let router = Router::new(self.transport, sink, self.timeout);
        let engine = RackRouteEngine::from_parts(router, self.max_racks, self.mode);

        if let Some(text) = self.sources_json {
            engine.apply_document(DocumentKind::Sources, &text)?;
        }
        if let Some(text) = self.routing_json {
            engine.apply_document(DocumentKind::Routing, &text)?;
        }
        if let Some(text) = self.racks_json {
            engine.apply_document(DocumentKind::Racks, &text)?;
        }

        Ok(engine)
    }
}
