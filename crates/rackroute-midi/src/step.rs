//! MIDI step types with the JSON wire format used by rack programs.

use serde::{Deserialize, Serialize};

/// One control-message instruction in a rack program.
///
/// The serde representation is part of the wire contract for hand-edited
/// configuration documents: a `type` tag selects the variant, `channel` is
/// the 1-based MIDI channel, and `delay` (alias `delayMs`) is the pause in
/// milliseconds after the step has been dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MidiStep {
    #[serde(rename = "cc")]
    ControlChange {
        channel: u8,
        controller: u8,
        value: u8,
        #[serde(rename = "delay", alias = "delayMs")]
        delay_ms: u64,
    },
    #[serde(rename = "noteon")]
    NoteOn {
        channel: u8,
        note: u8,
        value: u8,
        #[serde(rename = "delay", alias = "delayMs")]
        delay_ms: u64,
    },
    #[serde(rename = "program")]
    ProgramChange {
        channel: u8,
        program: u8,
        #[serde(rename = "delay", alias = "delayMs")]
        delay_ms: u64,
    },
}

/// Discriminant of a [`MidiStep`], used for observability and variable sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Cc,
    NoteOn,
    Program,
}

impl StepKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::Cc => "cc",
            StepKind::NoteOn => "noteon",
            StepKind::Program => "program",
        }
    }
}

impl MidiStep {
    #[inline]
    pub fn cc(channel: u8, controller: u8, value: u8) -> Self {
        MidiStep::ControlChange {
            channel,
            controller,
            value,
            delay_ms: 0,
        }
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, value: u8) -> Self {
        MidiStep::NoteOn {
            channel,
            note,
            value,
            delay_ms: 0,
        }
    }

    #[inline]
    pub fn program(channel: u8, program: u8) -> Self {
        MidiStep::ProgramChange {
            channel,
            program,
            delay_ms: 0,
        }
    }

    /// Returns the same step with `delay_ms` replaced.
    pub fn with_delay(mut self, ms: u64) -> Self {
        match &mut self {
            MidiStep::ControlChange { delay_ms, .. }
            | MidiStep::NoteOn { delay_ms, .. }
            | MidiStep::ProgramChange { delay_ms, .. } => *delay_ms = ms,
        }
        self
    }

    #[inline]
    pub fn kind(&self) -> StepKind {
        match self {
            MidiStep::ControlChange { .. } => StepKind::Cc,
            MidiStep::NoteOn { .. } => StepKind::NoteOn,
            MidiStep::ProgramChange { .. } => StepKind::Program,
        }
    }

    /// 1-based MIDI channel as written in the document.
    #[inline]
    pub fn channel(&self) -> u8 {
        match self {
            MidiStep::ControlChange { channel, .. }
            | MidiStep::NoteOn { channel, .. }
            | MidiStep::ProgramChange { channel, .. } => *channel,
        }
    }

    /// Post-dispatch pause in milliseconds.
    #[inline]
    pub fn delay_ms(&self) -> u64 {
        match self {
            MidiStep::ControlChange { delay_ms, .. }
            | MidiStep::NoteOn { delay_ms, .. }
            | MidiStep::ProgramChange { delay_ms, .. } => *delay_ms,
        }
    }

    /// First data byte (controller, note, or program number).
    #[inline]
    pub fn data(&self) -> u8 {
        match self {
            MidiStep::ControlChange { controller, .. } => *controller,
            MidiStep::NoteOn { note, .. } => *note,
            MidiStep::ProgramChange { program, .. } => *program,
        }
    }

    /// Second data byte; program change has none.
    #[inline]
    pub fn value(&self) -> Option<u8> {
        match self {
            MidiStep::ControlChange { value, .. } | MidiStep::NoteOn { value, .. } => Some(*value),
            MidiStep::ProgramChange { .. } => None,
        }
    }

    /// Encode to the raw wire bytes.
    ///
    /// Status byte is `0xB0 + ch` for cc, `0x90 + ch` for noteon and
    /// `0xC0 + ch` for program change, with `ch` the 0-based channel.
    pub fn encode(&self) -> RawStepBytes {
        let ch = self.channel().saturating_sub(1).min(15);
        match self {
            MidiStep::ControlChange {
                controller, value, ..
            } => RawStepBytes::new([0xB0 + ch, controller & 0x7F, value & 0x7F], 3),
            MidiStep::NoteOn { note, value, .. } => {
                RawStepBytes::new([0x90 + ch, note & 0x7F, value & 0x7F], 3)
            }
            MidiStep::ProgramChange { program, .. } => {
                RawStepBytes::new([0xC0 + ch, program & 0x7F, 0], 2)
            }
        }
    }
}

/// Raw 2-3 byte wire encoding of a step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawStepBytes {
    data: [u8; 3],
    /// Valid bytes in `data` (2-3).
    len: u8,
}

impl RawStepBytes {
    #[inline]
    pub fn new(data: [u8; 3], len: u8) -> Self {
        Self { data, len }
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data[0] & 0xF0
    }

    /// 0-based channel nibble of the status byte.
    #[inline]
    pub fn channel(&self) -> u8 {
        self.data[0] & 0x0F
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }
}
