use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        envelope::{EnvelopeConfig, EnvelopeStage, EnvelopeState},
        oscillator::OscillatorWaveform,
    },
    error::SynthError,
    graph::{
        amplify::Amplify,
        buffer::BufferPool,
        envelope::EnvNode,
        extensions::{NodeExt, OscExt},
        fm::FmNode,
        lfo::LfoNode,
        node::{GraphNode, Modulatable, RenderCtx},
        oscillator::OscNode,
    },
    synth::{
        keymap::KeyId,
        modulation::{ModParam, ModulationParams},
    },
};

/// Partial ratios and base amplitudes of the additive timbre.
pub const ADDITIVE_PARTIALS: [(f32, f32); 3] = [(1.0, 0.6), (2.0, 0.25), (3.0, 0.15)];

/// Signal topology of a voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SynthMode {
    /// One oscillator with the selected waveform
    #[default]
    Basic,
    /// Three sine partials at 1×, 2×, 3× with brightness on the upper two
    Additive,
    /// Sine carrier whose amplitude follows a modulator
    Am,
    /// Sine carrier whose frequency follows a modulator
    Fm,
}

impl SynthMode {
    pub const ALL: [SynthMode; 4] = [
        SynthMode::Basic,
        SynthMode::Additive,
        SynthMode::Am,
        SynthMode::Fm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SynthMode::Basic => "basic",
            SynthMode::Additive => "additive",
            SynthMode::Am => "am",
            SynthMode::Fm => "fm",
        }
    }
}

impl fmt::Display for SynthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SynthMode {
    type Err = SynthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" | "plain" => Ok(SynthMode::Basic),
            "additive" => Ok(SynthMode::Additive),
            "am" => Ok(SynthMode::Am),
            "fm" => Ok(SynthMode::Fm),
            _ => Err(SynthError::UnknownSynthMode(s.to_string())),
        }
    }
}

/// Everything a new voice reads from the engine at creation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Patch {
    pub mode: SynthMode,
    pub waveform: OscillatorWaveform,
    pub modulation: ModulationParams,
}

/// Private handle of one voice instance; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoiceId(pub(crate) u64);

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// One additive partial: oscillator plus the amplitude brightness scales.
pub struct Partial {
    pub ratio: f32,
    pub base_amp: f32,
    pub osc: OscNode,
}

impl Partial {
    fn level_for(&self, brightness: f32) -> f32 {
        // Fundamental is never scaled by brightness
        if self.ratio == 1.0 {
            self.base_amp
        } else {
            self.base_amp * brightness
        }
    }
}

/// Bank of partials summed into one signal.
pub struct AdditiveBank {
    pub partials: [Partial; 3],
    brightness: f32,
    temp_buffer: Vec<f32>,
}

impl AdditiveBank {
    /// `buffer` must hold at least `MAX_BLOCK_SIZE` samples.
    pub fn new(frequency: f32, brightness: f32, buffer: Vec<f32>) -> Self {
        let partials = ADDITIVE_PARTIALS.map(|(ratio, base_amp)| {
            let mut partial = Partial {
                ratio,
                base_amp,
                osc: OscNode::sine(frequency * ratio),
            };
            partial.osc.set_level(partial.level_for(brightness));
            partial
        });

        Self {
            partials,
            brightness,
            temp_buffer: buffer,
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
        for partial in &mut self.partials {
            let level = partial.level_for(brightness);
            partial.osc.set_level(level);
        }
    }

    fn stop(&mut self, when: f64) {
        for partial in &mut self.partials {
            partial.osc.stop(when);
        }
    }
}

impl GraphNode for AdditiveBank {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        let frames = &mut self.temp_buffer[..out.len()];
        for partial in &mut self.partials {
            partial.osc.render_block(frames, ctx);
            for (o, p) in out.iter_mut().zip(frames.iter()) {
                *o += *p;
            }
        }
    }

    fn is_active(&self) -> bool {
        self.partials.iter().any(|p| p.osc.is_active())
    }
}

/// Mode-specific oscillator topology, before the envelope stage.
pub enum Timbre {
    Basic(OscNode),
    Additive(AdditiveBank),
    Am(Amplify<OscNode, LfoNode>),
    Fm(FmNode),
}

impl Timbre {
    /// Build the topology for `patch`, taking scratch buffers from `pool`.
    pub fn build(patch: &Patch, frequency: f32, pool: &mut BufferPool) -> Self {
        let params = &patch.modulation;
        match patch.mode {
            SynthMode::Basic => Timbre::Basic(OscNode::new(patch.waveform, frequency)),
            SynthMode::Additive => Timbre::Additive(AdditiveBank::new(
                frequency,
                params.brightness,
                pool.take(),
            )),
            SynthMode::Am => Timbre::Am(
                OscNode::sine(frequency)
                    .amplify(LfoNode::tremolo(params.am_freq, params.am_depth), pool),
            ),
            SynthMode::Fm => Timbre::Fm(OscNode::sine(frequency).frequency_modulated(
                OscNode::sine(0.0).with_level(params.fm_depth),
                params.fm_ratio,
                pool,
            )),
        }
    }

    /// Hand the scratch buffer (if any) back to `pool`.
    fn recycle(self, pool: &mut BufferPool) {
        match self {
            Timbre::Basic(_) => {}
            Timbre::Additive(bank) => pool.put(bank.temp_buffer),
            Timbre::Am(am) => pool.put(am.into_parts().2),
            Timbre::Fm(fm) => pool.put(fm.into_buffer()),
        }
    }

    pub fn mode(&self) -> SynthMode {
        match self {
            Timbre::Basic(_) => SynthMode::Basic,
            Timbre::Additive(_) => SynthMode::Additive,
            Timbre::Am(_) => SynthMode::Am,
            Timbre::Fm(_) => SynthMode::Fm,
        }
    }

    /// Schedule every oscillator in the topology to stop at `when`.
    pub fn stop(&mut self, when: f64) {
        match self {
            Timbre::Basic(osc) => osc.stop(when),
            Timbre::Additive(bank) => bank.stop(when),
            Timbre::Am(am) => am.signal.stop(when),
            Timbre::Fm(fm) => fm.stop(when),
        }
    }
}

impl GraphNode for Timbre {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        match self {
            Timbre::Basic(osc) => osc.render_block(out, ctx),
            Timbre::Additive(bank) => bank.render_block(out, ctx),
            Timbre::Am(am) => am.render_block(out, ctx),
            Timbre::Fm(fm) => fm.render_block(out, ctx),
        }
    }

    fn is_active(&self) -> bool {
        match self {
            Timbre::Basic(osc) => osc.is_active(),
            Timbre::Additive(bank) => bank.is_active(),
            Timbre::Am(am) => am.signal.is_active(),
            Timbre::Fm(fm) => fm.is_active(),
        }
    }
}

impl Modulatable for Timbre {
    type Param = ModParam;

    fn get_param(&self, param: ModParam) -> Option<f32> {
        match (self, param) {
            (Timbre::Additive(bank), ModParam::Brightness) => Some(bank.brightness()),
            (Timbre::Am(am), ModParam::AmFreq) => Some(am.modulator.rate()),
            (Timbre::Am(am), ModParam::AmDepth) => Some(am.modulator.depth()),
            (Timbre::Fm(fm), ModParam::FmRatio) => Some(fm.ratio()),
            (Timbre::Fm(fm), ModParam::FmDepth) => Some(fm.depth()),
            _ => None,
        }
    }

    fn set_param(&mut self, param: ModParam, value: f32) -> bool {
        match (self, param) {
            (Timbre::Additive(bank), ModParam::Brightness) => bank.set_brightness(value),
            (Timbre::Am(am), ModParam::AmFreq) => am.modulator.set_rate(value),
            (Timbre::Am(am), ModParam::AmDepth) => am.modulator.set_depth(value),
            (Timbre::Fm(fm), ModParam::FmRatio) => fm.set_ratio(value),
            (Timbre::Fm(fm), ModParam::FmDepth) => fm.set_depth(value),
            _ => return false,
        }
        true
    }
}

/// A single sounding note: timbre → envelope gain stage.
///
/// The voice is owned by the registry from creation until its oscillators
/// have stopped; the shared tremolo and master gain are applied to the
/// summed bus, not here.
pub struct Voice {
    id: VoiceId,
    key: KeyId,
    base_frequency: f32,
    started_at: f64,
    graph: Amplify<Timbre, EnvNode>,
}

impl Voice {
    /// Build the topology for `patch` and start the attack at `now`.
    ///
    /// Scratch buffers come from `pool`; [`Voice::recycle`] returns them.
    #[allow(clippy::too_many_arguments)]
    pub fn create(
        id: VoiceId,
        key: KeyId,
        frequency: f32,
        patch: &Patch,
        envelope: EnvelopeConfig,
        now: f64,
        sample_rate: f32,
        pool: &mut BufferPool,
    ) -> Self {
        let mut graph = Timbre::build(patch, frequency, pool).amplify(EnvNode::new(envelope), pool);
        graph.note_on(&RenderCtx::new(sample_rate, now));

        Self {
            id,
            key,
            base_frequency: frequency,
            started_at: now,
            graph,
        }
    }

    /// Release at `now`; oscillators stop when the ramp lands on the floor.
    ///
    /// Returns the scheduled stop time.
    pub fn release(&mut self, now: f64) -> f64 {
        let stop_at = self.graph.modulator.release(now);
        self.graph.signal.stop(stop_at);
        stop_at
    }

    /// Tear the voice down, returning its scratch buffers to `pool`.
    pub fn recycle(self, pool: &mut BufferPool) {
        let (timbre, _, buffer) = self.graph.into_parts();
        pool.put(buffer);
        timbre.recycle(pool);
    }

    /// Push a live parameter into this voice's nodes, if its mode uses it.
    pub fn update_live_parameter(&mut self, param: ModParam, value: f32) -> bool {
        self.graph.signal.set_param(param, value)
    }

    pub fn live_parameter(&self, param: ModParam) -> Option<f32> {
        self.graph.signal.get_param(param)
    }

    pub fn id(&self) -> VoiceId {
        self.id
    }

    pub fn key(&self) -> KeyId {
        self.key
    }

    pub fn base_frequency(&self) -> f32 {
        self.base_frequency
    }

    pub fn mode(&self) -> SynthMode {
        self.graph.signal.mode()
    }

    pub fn started_at(&self) -> f64 {
        self.started_at
    }

    pub fn timbre(&self) -> &Timbre {
        &self.graph.signal
    }

    pub fn gain_at(&self, time: f64) -> f32 {
        self.graph.modulator.envelope().gain_at(time)
    }

    pub fn stage_at(&self, time: f64) -> EnvelopeStage {
        self.graph.modulator.stage_at(time)
    }

    pub fn envelope_state(&self, time: f64) -> EnvelopeState {
        self.graph.modulator.envelope().state_at(time)
    }

    pub fn is_released(&self) -> bool {
        self.graph.modulator.envelope().is_released()
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.graph.modulator.envelope().release_end()
    }

    /// True once every oscillator has reached its stop time.
    pub fn is_finished(&self, time: f64) -> bool {
        self.stop_time().is_some_and(|stop| time >= stop)
    }
}

impl GraphNode for Voice {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.graph.render_block(out, ctx);
    }

    fn is_active(&self) -> bool {
        self.graph.signal.is_active()
    }
}
