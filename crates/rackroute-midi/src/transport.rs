//! The step transport capability.
//!
//! The sequencer never talks to a device directly; it hands each step to a
//! [`StepTransport`] injected at engine construction time. A missing
//! transport is a documented absent-case (warn and skip), never probed ad hoc.

use crate::step::{MidiStep, StepKind};
use parking_lot::Mutex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no MIDI output connected")]
    NotConnected,

    #[error("MIDI send failed: {0}")]
    Send(String),

    #[error("MIDI device error: {0}")]
    Device(String),
}

/// Capability to deliver one encoded step to a device or sink.
pub trait StepTransport: Send + Sync {
    fn dispatch(&self, step: &MidiStep) -> Result<(), TransportError>;
}

/// Fields of the most recently dispatched step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastDispatched {
    pub kind: StepKind,
    /// 1-based channel as written in the document.
    pub channel: u8,
    /// Controller, note, or program number depending on `kind`.
    pub data: u8,
    /// Second data byte; `None` for program change.
    pub value: Option<u8>,
}

/// Transport for hosts whose "device" is a variable layer rather than MIDI
/// hardware: every dispatch succeeds and the step fields are retained for
/// the host to publish as `midi_last_*` variables.
#[derive(Default)]
pub struct VariableTransport {
    last: Mutex<Option<LastDispatched>>,
}

impl VariableTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<LastDispatched> {
        *self.last.lock()
    }
}

impl StepTransport for VariableTransport {
    fn dispatch(&self, step: &MidiStep) -> Result<(), TransportError> {
        *self.last.lock() = Some(LastDispatched {
            kind: step.kind(),
            channel: step.channel(),
            data: step.data(),
            value: step.value(),
        });
        Ok(())
    }
}
