//! Low-level DSP primitives used by the higher level graph nodes.
//!
//! These components are realtime-safe once constructed, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math so graph nodes can layer on orchestration and
//! modulation.

/// Timestamped parameter automation (set / exponential ramp / cancel).
pub mod automation;
/// Exponential attack/decay/sustain/release envelope on the audio clock.
pub mod envelope;
/// Oscillator waveforms.
pub mod oscillator;

pub use envelope::{EnvelopeConfig, EnvelopeStage, EnvelopeState};
pub use oscillator::OscillatorWaveform;
