// Purpose: the engine context object. Owns every piece of synth state,
// applies control messages one at a time and renders the output bus.

pub mod input;
pub mod scheduler;

pub use input::InputPort;

use crate::{
    config::EngineConfig,
    dsp::oscillator::OscillatorWaveform,
    error::ConfigError,
    graph::node::RenderCtx,
    synth::{
        arpeggiator::Arpeggiator,
        held_keys::HeldKeys,
        keymap::KeyId,
        message::{MessageReceiver, SynthMessage},
        modulation::{ModParam, ModulationRouter},
        registry::VoiceRegistry,
        voice::{Patch, SynthMode},
    },
    MAX_BLOCK_SIZE,
};

/*
Engine
======

Everything that was ambient state in a browser synth (current waveform,
mode, slider values, held keys, the voice map) lives here and is changed
only through `handle()`:

    input events ─┐
                  ├─→ handle(msg) ─→ HeldKeys / VoiceRegistry / Arpeggiator / Router
    arp ticks ────┘
                            render_block()
    voices ──Σ──→ tremolo ──→ master gain ──→ out

Clock
-----

The audio clock is the number of frames rendered so far. Every control
message applies at the start of the next block. Arpeggiator ticks are
sample-accurate: they are scheduled in whole frames, a block is split at the
frame where a tick falls due, the tick runs, and rendering continues from
there.

Direct Play vs Arpeggiator
--------------------------

While the arpeggiator is enabled, key events only change the held set and
the arpeggiator starts and stops every voice. Toggling it either way first
releases whatever is sounding.
*/

pub struct SynthEngine {
    config: EngineConfig,
    frames: u64,
    held: HeldKeys,
    registry: VoiceRegistry,
    arpeggiator: Arpeggiator,
    router: ModulationRouter,
    waveform: OscillatorWaveform,
    mode: SynthMode,
}

impl SynthEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let registry = VoiceRegistry::new(
            config.keymap.clone(),
            config.envelope,
            config.sample_rate,
        );
        let arpeggiator = Arpeggiator::new(config.arpeggiator_period(), config.sample_rate);
        let router = ModulationRouter::new(config.modulation, config.tremolo);

        tracing::info!(
            sample_rate = config.sample_rate,
            keys = config.keymap.len(),
            mode = %config.mode,
            waveform = config.waveform.name(),
            "synth engine ready"
        );

        Ok(Self {
            waveform: config.waveform,
            mode: config.mode,
            held: HeldKeys::with_capacity(config.keymap.len()),
            config,
            frames: 0,
            registry,
            arpeggiator,
            router,
        })
    }

    /// Audio clock time of the next frame to be rendered, in seconds.
    pub fn now(&self) -> f64 {
        self.frames as f64 / self.config.sample_rate as f64
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn sample_rate(&self) -> f32 {
        self.config.sample_rate
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.waveform
    }

    pub fn mode(&self) -> SynthMode {
        self.mode
    }

    pub fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    pub fn registry(&self) -> &VoiceRegistry {
        &self.registry
    }

    pub fn arpeggiator(&self) -> &Arpeggiator {
        &self.arpeggiator
    }

    pub fn router(&self) -> &ModulationRouter {
        &self.router
    }

    /// What a voice created right now would be built from.
    pub fn patch(&self) -> Patch {
        Patch {
            mode: self.mode,
            waveform: self.waveform,
            modulation: *self.router.params(),
        }
    }

    /// Drain `rx` in arrival order.
    pub fn process_messages<R: MessageReceiver>(&mut self, rx: &mut R) {
        while let Some(msg) = rx.pop() {
            self.handle(msg);
        }
    }

    pub fn handle(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::KeyDown(key) => self.key_down(key),
            SynthMessage::KeyUp(key) => self.key_up(key),
            SynthMessage::SetWaveform(waveform) => self.set_waveform(waveform),
            SynthMessage::SetSynthMode(mode) => self.set_synth_mode(mode),
            SynthMessage::SetArpeggiator(enabled) => self.set_arpeggiator(enabled),
            SynthMessage::SetParameter { param, value } => {
                self.set_parameter(param, value);
            }
            SynthMessage::AllNotesOff => self.all_notes_off(),
        }
    }

    pub fn key_down(&mut self, key: KeyId) {
        if !self.registry.keymap().contains(key) {
            tracing::trace!(key, "key down ignored: unmapped key");
            return;
        }
        if !self.held.insert(key) {
            // Auto-repeat
            return;
        }

        if self.arpeggiator.is_enabled() {
            self.arpeggiator.key_pressed(self.frames);
        } else {
            let (patch, now) = (self.patch(), self.now());
            self.registry.note_on(key, &patch, now);
        }
    }

    pub fn key_up(&mut self, key: KeyId) {
        if !self.held.remove(key) {
            return;
        }

        if self.arpeggiator.is_enabled() {
            self.arpeggiator
                .key_released(key, &self.held, &mut self.registry, self.frames);
        } else {
            let now = self.now();
            self.registry.note_off(key, now);
        }
    }

    /// Applies to basic-mode voices created from now on.
    pub fn set_waveform(&mut self, waveform: OscillatorWaveform) {
        self.waveform = waveform;
        tracing::debug!(waveform = waveform.name(), "waveform changed");
    }

    /// Applies to voices created from now on.
    pub fn set_synth_mode(&mut self, mode: SynthMode) {
        self.mode = mode;
        tracing::debug!(%mode, "synth mode changed");
    }

    pub fn set_arpeggiator(&mut self, enabled: bool) {
        if enabled == self.arpeggiator.is_enabled() {
            return;
        }
        let now = self.now();
        self.registry.release_all(now);
        self.arpeggiator
            .set_enabled(enabled, &self.held, &mut self.registry, self.frames);
    }

    /// Returns the number of voices updated.
    pub fn set_parameter(&mut self, param: ModParam, value: f32) -> usize {
        self.router.route(param, value, &mut self.registry)
    }

    /// Forget held keys and release everything that is keyed.
    pub fn all_notes_off(&mut self) {
        self.held.clear();
        self.arpeggiator.set_enabled(
            self.arpeggiator.is_enabled(),
            &self.held,
            &mut self.registry,
            self.frames,
        );
        let now = self.now();
        self.registry.release_all(now);
        tracing::debug!("all notes off");
    }

    /// Render the next `out.len()` frames of the output bus.
    pub fn render_block(&mut self, out: &mut [f32]) {
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            let mut offset = 0;
            while offset < chunk.len() {
                self.run_due_ticks();

                let remaining = (chunk.len() - offset) as u64;
                let len = match self.arpeggiator.next_due() {
                    Some(due) => remaining.min(due - self.frames),
                    None => remaining,
                } as usize;

                self.render_segment(&mut chunk[offset..offset + len]);
                offset += len;
            }
        }
    }

    fn render_segment(&mut self, out: &mut [f32]) {
        let ctx = RenderCtx::new(self.config.sample_rate, self.now());
        self.registry.render(out, &ctx);
        self.router.apply_tremolo(out, &ctx);

        let gain = self.config.master_gain;
        for sample in out.iter_mut() {
            *sample *= gain;
        }
        self.frames += out.len() as u64;
    }

    fn run_due_ticks(&mut self) {
        while self
            .arpeggiator
            .next_due()
            .is_some_and(|due| due <= self.frames)
        {
            let patch = self.patch();
            self.arpeggiator
                .tick(&self.held, &mut self.registry, &patch, self.frames);
        }
    }
}
