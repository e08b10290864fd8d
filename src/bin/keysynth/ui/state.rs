//! State shown by the UI
//!
//! `EngineStatus` is produced on the audio thread after every callback and
//! must stay `Copy`. `Controls` mirrors what the UI has asked the engine for.

use keysynth::{
    dsp::{envelope::EnvelopeState, oscillator::OscillatorWaveform},
    synth::{KeyId, ModParam, ModulationParams, Patch, SynthMode},
    SynthEngine,
};

/// Snapshot of the engine after an audio callback
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineStatus {
    /// Audio clock in seconds
    pub time: f64,
    /// Voices still producing sound, including fading ones
    pub live_voices: usize,
    /// Voices addressable by key
    pub active_voices: usize,
    pub held_keys: usize,
    pub arp_running: bool,
    pub arp_current: Option<KeyId>,
    /// Envelope of the most recently started keyed voice
    pub envelope: Option<EnvelopeState>,
}

impl EngineStatus {
    pub fn capture(engine: &SynthEngine) -> Self {
        Self {
            time: engine.now(),
            live_voices: engine.registry().live_count(),
            active_voices: engine.registry().active_count(),
            held_keys: engine.held_keys().len(),
            arp_running: engine.arpeggiator().is_running(),
            arp_current: engine.arpeggiator().current(),
            envelope: engine
                .registry()
                .active_voices()
                .last()
                .map(|voice| voice.envelope_state(engine.now())),
        }
    }
}

/// Slider range and step of each live parameter: (min, max, step)
pub fn param_range(param: ModParam) -> (f32, f32, f32) {
    match param {
        ModParam::FmDepth => (0.0, 1000.0, 10.0),
        ModParam::FmRatio => (0.25, 8.0, 0.25),
        ModParam::AmFreq => (0.5, 200.0, 1.0),
        ModParam::AmDepth => (0.0, 1.0, 0.05),
        ModParam::Brightness => (0.0, 2.0, 0.1),
    }
}

/// Settings the UI has sent, mirrored for display
#[derive(Clone, Copy, Debug)]
pub struct Controls {
    pub waveform: OscillatorWaveform,
    pub mode: SynthMode,
    pub arpeggiator: bool,
    pub params: ModulationParams,
    /// Index into `ModParam::ALL` of the parameter the arrow keys adjust
    pub selected: usize,
}

impl Controls {
    pub fn new(patch: Patch, arpeggiator: bool) -> Self {
        Self {
            waveform: patch.waveform,
            mode: patch.mode,
            arpeggiator,
            params: patch.modulation,
            selected: 0,
        }
    }

    pub fn selected_param(&self) -> ModParam {
        ModParam::ALL[self.selected % ModParam::ALL.len()]
    }

    pub fn select_next(&mut self, forward: bool) {
        let len = ModParam::ALL.len();
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }

    pub fn next_waveform(&mut self) -> OscillatorWaveform {
        self.waveform = cycle(&OscillatorWaveform::ALL, self.waveform);
        self.waveform
    }

    pub fn next_mode(&mut self) -> SynthMode {
        self.mode = cycle(&SynthMode::ALL, self.mode);
        self.mode
    }

    /// Step the selected parameter up or down, clamped to its range.
    pub fn step_selected(&mut self, up: bool) -> (ModParam, f32) {
        let param = self.selected_param();
        let (min, max, step) = param_range(param);
        let delta = if up { step } else { -step };
        let value = (self.params.get(param) + delta).clamp(min, max);
        self.params.set(param, value);
        (param, value)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T) -> T {
    let idx = all.iter().position(|&v| v == current).unwrap_or(0);
    all[(idx + 1) % all.len()]
}
