//! MIDI step subsystem for the rackroute engine.
//!
//! Provides the step type shared by the schema and sequencer crates, the raw
//! wire encoding, and the [`StepTransport`] capability with two shipped
//! implementations:
//!
//! - [`VariableTransport`] - records the last dispatched step for hosts that
//!   publish it through a variable layer instead of a device
//! - `MidiOutputManager` - midir-backed device output (feature: `midi-io`)

pub(crate) mod step;
pub use step::{MidiStep, RawStepBytes, StepKind};

pub(crate) mod transport;
pub use transport::{LastDispatched, StepTransport, TransportError, VariableTransport};

#[cfg(feature = "midi-io")]
pub(crate) mod output;

#[cfg(feature = "midi-io")]
pub use output::{MidiOutputDevice, MidiOutputManager};
