//! Errors raised at the caller boundary
//!
//! The per-sample path never fails; these only come back from
//! configuration and control calls made by background code.
//!
//! Author: Moroya Sakamoto

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SynthError {
    #[error("unknown sound preset id {0}")]
    UnknownPreset(u8),
    #[error("tempo must be at least 1 BPM")]
    InvalidTempo,
    #[error("sample rate {0} Hz is outside the supported range")]
    InvalidSampleRate(u32),
    #[error("echo buffer capacity must be non-zero")]
    EmptyEchoBuffer,
    #[error("no sequencer attached to the synth")]
    NoSequencer,
}
