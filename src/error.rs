//! Error types for the synth engine.
//!
//! Key events never fail: unknown keys, repeated note-ons and redundant
//! note-offs all degrade to silent no-ops. Errors only surface where a value
//! arrives as text from a UI collaborator ([`SynthError`]), where
//! configuration is validated ([`ConfigError`]), or where the output sink
//! refuses to resume ([`SinkError`]).

use thiserror::Error;

/// Errors raised while interpreting UI notifications.
#[derive(Debug, Error)]
pub enum SynthError {
    /// Waveform name not one of sine/square/sawtooth/triangle
    #[error("unknown waveform: {0}")]
    UnknownWaveform(String),

    /// Synthesis mode name not one of basic/additive/am/fm
    #[error("unknown synth mode: {0}")]
    UnknownSynthMode(String),

    /// Parameter name not one of the live modulation parameters
    #[error("unknown modulation parameter: {0}")]
    UnknownParameter(String),
}

/// Errors raised by [`EngineConfig::validate`](crate::config::EngineConfig::validate).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Sample rate must be positive and finite
    #[error("sample rate must be positive, got {0}")]
    SampleRate(f32),

    /// An envelope time was negative or not finite
    #[error("envelope {stage} time must be non-negative, got {value}")]
    EnvelopeTime {
        /// Stage name (attack, decay, release).
        stage: &'static str,
        /// Offending value in seconds.
        value: f32,
    },

    /// An envelope level left its allowed range
    #[error("envelope {name} out of range: {value}")]
    EnvelopeLevel {
        /// Level name (peak, sustain, floor).
        name: &'static str,
        /// Offending value.
        value: f32,
    },

    /// Arpeggiator step must last at least one sample
    #[error("arpeggiator rate must span at least one sample, got {0} ms")]
    ArpeggiatorRate(f64),

    /// Key table entry with a non-positive frequency
    #[error("key {key} maps to invalid frequency {frequency}")]
    KeyFrequency {
        /// Key code.
        key: u32,
        /// Offending frequency in Hz.
        frequency: f32,
    },

    /// Key table lists the same key twice
    #[error("key {0} appears more than once in the key table")]
    DuplicateKey(u32),

    /// Key table had no entries
    #[error("key table is empty")]
    EmptyKeyTable,

    /// Failed to parse TOML
    #[cfg(feature = "serde")]
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Errors reported by an [`OutputSink`](crate::io::OutputSink).
#[derive(Debug, Error)]
pub enum SinkError {
    /// The device refused to resume
    #[error("output sink failed to resume: {0}")]
    Resume(String),
}
