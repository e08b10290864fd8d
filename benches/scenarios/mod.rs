//! Real-world scenario benchmarks.
//!
//! Complete voices for each synthesis mode, and the whole engine playing
//! chords and arpeggios.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
