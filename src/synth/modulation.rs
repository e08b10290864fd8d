//! Live modulation parameters and their routing to sounding voices.
//!
//! Slider changes arrive as `(parameter, value)` pairs. The router records
//! the value for voices created later and pushes it into every active voice
//! whose topology uses it. Envelopes are not retriggered and oscillators keep
//! their phase.
//!
//! The router also owns the shared tremolo LFO. Every voice passes through
//! the same tremolo stage; since the LFO and its depth are common to all of
//! them, the stage is applied once to the summed voice bus.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    config::TremoloConfig,
    error::SynthError,
    graph::{
        lfo::LfoNode,
        node::{GraphNode, RenderCtx},
    },
    synth::registry::VoiceRegistry,
    MAX_BLOCK_SIZE,
};

/// A live-adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModParam {
    /// FM peak deviation in Hz
    FmDepth,
    /// FM modulator frequency as a multiple of the note
    FmRatio,
    /// AM modulator rate in Hz
    AmFreq,
    /// AM modulator depth (gain swing around unity)
    AmDepth,
    /// Additive upper-partial multiplier
    Brightness,
}

impl ModParam {
    pub const ALL: [ModParam; 5] = [
        ModParam::FmDepth,
        ModParam::FmRatio,
        ModParam::AmFreq,
        ModParam::AmDepth,
        ModParam::Brightness,
    ];

    /// Name as sent by the UI.
    pub fn name(self) -> &'static str {
        match self {
            ModParam::FmDepth => "fmDepth",
            ModParam::FmRatio => "fmRatio",
            ModParam::AmFreq => "amFreq",
            ModParam::AmDepth => "amDepth",
            ModParam::Brightness => "brightness",
        }
    }
}

impl fmt::Display for ModParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModParam {
    type Err = SynthError;

    /// Accepts the UI's camelCase names and snake_case / kebab-case spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "fmdepth" => Ok(ModParam::FmDepth),
            "fmratio" => Ok(ModParam::FmRatio),
            "amfreq" => Ok(ModParam::AmFreq),
            "amdepth" => Ok(ModParam::AmDepth),
            "brightness" | "addbrightness" => Ok(ModParam::Brightness),
            _ => Err(SynthError::UnknownParameter(s.to_string())),
        }
    }
}

/// Current slider-derived values, read by voices at creation.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationParams {
    pub fm_depth: f32,
    pub fm_ratio: f32,
    pub am_freq: f32,
    pub am_depth: f32,
    pub brightness: f32,
}

impl Default for ModulationParams {
    fn default() -> Self {
        Self {
            fm_depth: 100.0,
            fm_ratio: 2.0,
            am_freq: 30.0,
            am_depth: 0.5,
            brightness: 1.0,
        }
    }
}

impl ModulationParams {
    pub fn get(&self, param: ModParam) -> f32 {
        match param {
            ModParam::FmDepth => self.fm_depth,
            ModParam::FmRatio => self.fm_ratio,
            ModParam::AmFreq => self.am_freq,
            ModParam::AmDepth => self.am_depth,
            ModParam::Brightness => self.brightness,
        }
    }

    pub fn set(&mut self, param: ModParam, value: f32) {
        let slot = match param {
            ModParam::FmDepth => &mut self.fm_depth,
            ModParam::FmRatio => &mut self.fm_ratio,
            ModParam::AmFreq => &mut self.am_freq,
            ModParam::AmDepth => &mut self.am_depth,
            ModParam::Brightness => &mut self.brightness,
        };
        *slot = value;
    }
}

pub struct ModulationRouter {
    params: ModulationParams,
    tremolo: LfoNode,
    tremolo_buffer: Vec<f32>,
}

impl ModulationRouter {
    pub fn new(params: ModulationParams, tremolo: TremoloConfig) -> Self {
        Self {
            params,
            tremolo: LfoNode::tremolo(tremolo.rate, tremolo.depth),
            tremolo_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn params(&self) -> &ModulationParams {
        &self.params
    }

    /// Record `value` and push it into every active voice that uses `param`.
    ///
    /// Non-finite values are dropped. Returns the number of voices updated.
    pub fn route(&mut self, param: ModParam, value: f32, registry: &mut VoiceRegistry) -> usize {
        if !value.is_finite() {
            tracing::warn!(%param, value, "ignoring non-finite parameter value");
            return 0;
        }
        self.params.set(param, value);

        let updated = registry
            .active_voices_mut()
            .map(|voice| voice.update_live_parameter(param, value))
            .filter(|&applied| applied)
            .count();

        tracing::debug!(%param, value, updated, "modulation routed");
        updated
    }

    /// Multiply the summed voice bus by the shared tremolo.
    ///
    /// The LFO is free-running and advances even when the bus is silent.
    pub fn apply_tremolo(&mut self, bus: &mut [f32], ctx: &RenderCtx) {
        let lfo = &mut self.tremolo_buffer[..bus.len()];
        self.tremolo.render_block(lfo, ctx);
        for (sample, gain) in bus.iter_mut().zip(lfo.iter()) {
            *sample *= *gain;
        }
    }
}
