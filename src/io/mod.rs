// Purpose - the boundary to the audio device

pub mod sink;

pub use sink::{MemorySink, OutputSink, SinkState};
