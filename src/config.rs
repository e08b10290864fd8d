//! Engine configuration.
//!
//! Every field has a default, so a TOML file only needs the values it wants
//! to change:
//!
//! ```toml
//! master_gain = 0.5
//! arpeggiator_rate_ms = 120.0
//!
//! [envelope]
//! release = 0.5
//!
//! [modulation]
//! fm_ratio = 3.0
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{envelope::EnvelopeConfig, oscillator::OscillatorWaveform},
    error::ConfigError,
    synth::{keymap::FrequencyTable, modulation::ModulationParams, voice::SynthMode},
};

/// Shared tremolo LFO applied to the voice bus.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TremoloConfig {
    /// LFO rate in Hz
    pub rate: f32,
    /// Gain swing around unity
    pub depth: f32,
}

impl Default for TremoloConfig {
    fn default() -> Self {
        Self {
            rate: 5.0,
            depth: 0.05,
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    /// Gain between the voice bus and the output sink
    pub master_gain: f32,
    pub envelope: EnvelopeConfig,
    pub tremolo: TremoloConfig,
    pub arpeggiator_rate_ms: f64,
    /// Waveform of basic-mode voices at startup
    pub waveform: OscillatorWaveform,
    pub mode: SynthMode,
    pub modulation: ModulationParams,
    pub keymap: FrequencyTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            master_gain: 0.35,
            envelope: EnvelopeConfig::default(),
            tremolo: TremoloConfig::default(),
            arpeggiator_rate_ms: 150.0,
            waveform: OscillatorWaveform::Sine,
            mode: SynthMode::Basic,
            modulation: ModulationParams::default(),
            keymap: FrequencyTable::default(),
        }
    }
}

impl EngineConfig {
    /// Arpeggiator step length in seconds.
    pub fn arpeggiator_period(&self) -> f64 {
        self.arpeggiator_rate_ms / 1000.0
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::SampleRate(self.sample_rate));
        }

        let env = &self.envelope;
        for (stage, value) in [
            ("attack", env.attack),
            ("decay", env.decay),
            ("release", env.release),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::EnvelopeTime { stage, value });
            }
        }
        // Exponential ramps need strictly positive endpoints
        if !(env.floor.is_finite() && env.floor > 0.0) {
            return Err(ConfigError::EnvelopeLevel {
                name: "floor",
                value: env.floor,
            });
        }
        if !(env.peak.is_finite() && env.peak > env.floor) {
            return Err(ConfigError::EnvelopeLevel {
                name: "peak",
                value: env.peak,
            });
        }
        if !(env.sustain > 0.0 && env.sustain <= 1.0) {
            return Err(ConfigError::EnvelopeLevel {
                name: "sustain",
                value: env.sustain,
            });
        }

        // A step shorter than one sample would tick more than once per frame
        let step_frames = self.arpeggiator_period() * self.sample_rate as f64;
        if !(step_frames.is_finite() && step_frames >= 1.0) {
            return Err(ConfigError::ArpeggiatorRate(self.arpeggiator_rate_ms));
        }

        if self.keymap.is_empty() {
            return Err(ConfigError::EmptyKeyTable);
        }
        if let Some(key) = self.keymap.duplicate_key() {
            return Err(ConfigError::DuplicateKey(key));
        }
        if let Some(bad) = self
            .keymap
            .entries()
            .into_iter()
            .find(|e| !(e.frequency.is_finite() && e.frequency > 0.0))
        {
            return Err(ConfigError::KeyFrequency {
                key: bad.code,
                frequency: bad.frequency,
            });
        }

        Ok(())
    }

    /// Parse and validate a TOML document layered over the defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
