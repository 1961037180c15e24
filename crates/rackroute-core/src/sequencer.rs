//! The sequencer state machine.
//!
//! Two states only, Idle and Running, guarded by an atomic flag: a trigger
//! arriving while a sequence is in flight is rejected synchronously and
//! never queued. One sequence walks the routing table and rack catalog under
//! a wall-clock deadline; per-step dispatch failures are counted and
//! tolerated, exceeding the deadline is fatal to the remainder of the
//! sequence.

use crate::catalog::{RackCatalog, SourceCatalog};
use crate::routing::RoutingTable;
use crate::state::{epoch_millis, RunSnapshot, StateSink};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use rackroute_midi::{MidiStep, StepTransport};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default wall-clock budget for one sequence.
pub const DEFAULT_SEQUENCE_TIMEOUT: Duration = Duration::from_millis(1000);

#[derive(Debug, Default)]
struct RunFields {
    active_source_index: Option<u32>,
    active_source_label: String,
    last_routed_racks: Vec<u32>,
    last_action_timestamp_ms: u64,
    failed_steps_total: u64,
}

#[derive(PartialEq)]
enum RackOutcome {
    Completed,
    TimedOut,
}

/// The routing/sequencing core.
///
/// Owns the derived document views (installed wholesale via atomic swap)
/// and the single-run state. Trigger methods block the calling thread for
/// the duration of the sequence; the inter-step delays are the only
/// suspension points.
pub struct Router {
    sources: ArcSwap<SourceCatalog>,
    routing: ArcSwap<RoutingTable>,
    racks: ArcSwap<RackCatalog>,
    running: AtomicBool,
    fields: Mutex<RunFields>,
    transport: Option<Arc<dyn StepTransport>>,
    sink: Arc<dyn StateSink>,
    timeout: Duration,
}

impl Router {
    pub fn new(
        transport: Option<Arc<dyn StepTransport>>,
        sink: Arc<dyn StateSink>,
        timeout: Duration,
    ) -> Self {
        Self {
            sources: ArcSwap::from_pointee(SourceCatalog::default()),
            routing: ArcSwap::from_pointee(RoutingTable::default()),
            racks: ArcSwap::from_pointee(RackCatalog::default()),
            running: AtomicBool::new(false),
            fields: Mutex::new(RunFields::default()),
            transport,
            sink,
            timeout,
        }
    }

    // ---- document views -------------------------------------------------

    pub fn install_sources(&self, catalog: SourceCatalog) {
        self.sources.store(Arc::new(catalog));
    }

    pub fn install_routing(&self, table: RoutingTable) {
        self.routing.store(Arc::new(table));
    }

    pub fn install_racks(&self, catalog: RackCatalog) {
        self.racks.store(Arc::new(catalog));
    }

    pub fn sources(&self) -> Arc<SourceCatalog> {
        self.sources.load_full()
    }

    pub fn routing(&self) -> Arc<RoutingTable> {
        self.routing.load_full()
    }

    pub fn racks(&self) -> Arc<RackCatalog> {
        self.racks.load_full()
    }

    /// Clears a rack's step program, leaving its enable flag untouched.
    /// Installed as a fresh catalog so in-flight readers keep their view.
    pub fn reset_rack_steps(&self, rack_id: u32) -> bool {
        let current = self.racks.load_full();
        match current.with_cleared_steps(rack_id) {
            Some(next) => {
                self.racks.store(Arc::new(next));
                info!(rack_id, "rack steps cleared");
                true
            }
            None => {
                warn!(rack_id, "reset requested for unknown rack");
                false
            }
        }
    }

    // ---- run state ------------------------------------------------------

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> RunSnapshot {
        let fields = self.fields.lock();
        self.snapshot_of(&fields, self.is_running())
    }

    fn snapshot_of(&self, fields: &RunFields, running: bool) -> RunSnapshot {
        RunSnapshot {
            running,
            active_source_index: fields.active_source_index,
            active_source_label: fields.active_source_label.clone(),
            last_routed_racks: fields.last_routed_racks.clone(),
            last_action_timestamp_ms: fields.last_action_timestamp_ms,
            failed_steps_total: fields.failed_steps_total,
        }
    }

    fn record_failure(&self) {
        let mut fields = self.fields.lock();
        fields.failed_steps_total += 1;
        self.sink.publish(&self.snapshot_of(&fields, true));
    }

    fn publish_idle(&self) {
        let fields = self.fields.lock();
        self.sink.publish(&self.snapshot_of(&fields, false));
    }

    /// Idle -> Running, or `false` when a sequence is already in flight.
    fn try_begin(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    // ---- triggers -------------------------------------------------------

    /// Runs the multi-rack sequence for a source selection.
    ///
    /// Failures are absorbed into logs and the published counter; the
    /// trigger caller has no synchronous result channel.
    pub fn route_source(&self, source: u32) {
        if !self.try_begin() {
            warn!(source, "sequence already running, source trigger dropped");
            return;
        }

        let sources = self.sources.load_full();
        let routing = self.routing.load_full();
        let racks = self.racks.load_full();
        let rack_ids: Vec<u32> = routing.racks_for(source).to_vec();

        let start = Instant::now();
        {
            let mut fields = self.fields.lock();
            fields.active_source_index = Some(source);
            fields.active_source_label = sources.label(source).to_string();
            fields.last_routed_racks = rack_ids.clone();
            fields.last_action_timestamp_ms = epoch_millis();
            self.sink.publish(&self.snapshot_of(&fields, true));
        }
        info!(source, racks = ?rack_ids, "route source started");

        let mut aborted = false;
        for &rack_id in &rack_ids {
            if start.elapsed() > self.timeout {
                error!(source, rack_id, "sequence timeout, remaining racks aborted");
                self.record_failure();
                aborted = true;
                break;
            }
            if self.execute_rack(&racks, rack_id, start) == RackOutcome::TimedOut {
                aborted = true;
                break;
            }
        }

        self.running.store(false, Ordering::Release);
        self.publish_idle();
        if !aborted {
            info!(source, "route source finished");
        }
    }

    /// Runs the sequence of a single rack. Active-source fields are left
    /// untouched; only the routed-rack list and timestamp change.
    pub fn route_rack(&self, rack_id: u32) {
        if !self.try_begin() {
            warn!(rack_id, "sequence already running, rack trigger dropped");
            return;
        }

        let racks = self.racks.load_full();
        let start = Instant::now();
        {
            let mut fields = self.fields.lock();
            fields.last_routed_racks = vec![rack_id];
            fields.last_action_timestamp_ms = epoch_millis();
            self.sink.publish(&self.snapshot_of(&fields, true));
        }

        self.execute_rack(&racks, rack_id, start);

        self.running.store(false, Ordering::Release);
        self.publish_idle();
        debug!(rack_id, "route rack finished");
    }

    // ---- per-rack execution ---------------------------------------------

    fn execute_rack(&self, racks: &RackCatalog, rack_id: u32, start: Instant) -> RackOutcome {
        let Some(rack) = racks.get(rack_id) else {
            warn!(rack_id, "rack not found");
            return RackOutcome::Completed;
        };
        if !rack.enabled {
            debug!(rack_id, "rack disabled, skipped");
            return RackOutcome::Completed;
        }

        info!(rack_id, steps = rack.steps.len(), "rack sequence started");
        for step in &rack.steps {
            if start.elapsed() > self.timeout {
                // Sequence-fatal: counted once, the outer loop stops too.
                error!(rack_id, "timeout during rack sequence");
                self.record_failure();
                return RackOutcome::TimedOut;
            }
            self.dispatch_step(rack_id, step);
            let delay = step.delay_ms();
            if delay > 0 {
                thread::sleep(Duration::from_millis(delay));
            }
        }
        debug!(rack_id, "rack sequence finished");
        RackOutcome::Completed
    }

    fn dispatch_step(&self, rack_id: u32, step: &MidiStep) {
        let Some(transport) = self.transport.as_ref() else {
            // Configuration absence, not a runtime failure: no counter change.
            warn!(rack_id, "no step transport configured, step skipped");
            return;
        };
        let raw = step.encode();
        match transport.dispatch(step) {
            Ok(()) => debug!(rack_id, bytes = ?raw.as_bytes(), "step dispatched"),
            Err(e) => {
                error!(rack_id, error = %e, "step dispatch failed");
                self.record_failure();
            }
        }
    }
}
