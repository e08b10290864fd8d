pub mod config;
pub mod dsp;
pub mod engine; // Event dispatch, audio clock, block rendering
pub mod error;
pub mod graph; // Composable audio graph nodes
pub mod io;
pub mod synth; // Keys, voices, arpeggiator, modulation

pub use config::{EngineConfig, TremoloConfig};
pub use engine::{InputPort, SynthEngine};
pub use error::{ConfigError, SinkError, SynthError};

pub const MAX_BLOCK_SIZE: usize = 2048;
