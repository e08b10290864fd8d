//! Composable building blocks for constructing voice signal graphs.
//!
//! Graph nodes wrap the low-level DSP primitives with what voices need: note
//! events stamped with audio-clock time, scheduled stops, live parameter
//! pushes, and block-based rendering. The `extensions` module adds fluent
//! helpers so voice topologies read as a chain.

/// Multiply two signals together (gain stage or amplitude modulation).
pub mod amplify;
/// Pooled scratch buffers, handed out and returned by the voice registry.
pub mod buffer;
/// Envelope generator node exposing ADSR state.
pub mod envelope;
/// Fluent combinators (`.amplify()`, `.frequency_modulated()`).
pub mod extensions;
/// Carrier/modulator frequency modulation pair.
pub mod fm;
/// Free-running modulation oscillators (tremolo, AM).
pub mod lfo;
/// Core traits shared by all graph nodes.
pub mod node;
/// Audio-band oscillators with scheduled stop.
pub mod oscillator;

pub use node::{GraphNode, Modulatable, RenderCtx};
