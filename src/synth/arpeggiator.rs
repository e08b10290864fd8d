use crate::{
    engine::scheduler::{period_frames, PeriodicTask},
    synth::{
        held_keys::HeldKeys,
        keymap::KeyId,
        registry::VoiceRegistry,
        voice::Patch,
    },
};

/*
Arpeggiator
===========

Turns the set of held keys into one rotating voice. While enabled it is the
only thing that starts or stops voices; key presses just change which keys
it rotates over.

Timing
------

A PeriodicTask on the audio clock ticks every `period` (rounded to whole
frames, so each step starts on an exact frame). All times passed in are
frame counts. The task exists exactly while "enabled AND at least one key
held" is true:

    enabled, first key down  → task started (first tick one period later)
    last key up              → task dropped, index reset to 0
    disabled                 → task dropped, sounding voice released

Each Tick
---------

    keys    = held keys in press order
    next    = keys[index mod len]
    if next != current:
        release current (if any)
        start next
    index  += 1               ← even when next == current

The index always advances, so with a single key held the same note simply
keeps sounding, and when keys are added the rotation position is already
partway through. With keys {A, B} pressed in that order the sequence is
A, B, A, B, ... one step per tick.
*/

pub struct Arpeggiator {
    enabled: bool,
    index: usize,
    current: Option<KeyId>,
    /// Step length in frames
    period: u64,
    sample_rate: f32,
    task: Option<PeriodicTask>,
}

impl Arpeggiator {
    /// `period` is the step length in seconds.
    pub fn new(period: f64, sample_rate: f32) -> Self {
        Self {
            enabled: false,
            index: 0,
            current: None,
            period: period_frames(period, sample_rate),
            sample_rate,
            task: None,
        }
    }

    /// Step length in frames.
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Key of the arpeggiated voice currently sounding.
    pub fn current(&self) -> Option<KeyId> {
        self.current
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Frame the next step falls on.
    pub fn next_due(&self) -> Option<u64> {
        self.task.as_ref().map(PeriodicTask::next_due)
    }

    /// Enable or disable at `now`.
    ///
    /// Either way any running rotation is stopped first. Enabling while keys
    /// are already held starts the timer straight away.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        held: &HeldKeys,
        registry: &mut VoiceRegistry,
        now: u64,
    ) {
        self.stop(registry, now);
        self.enabled = enabled;
        if enabled && !held.is_empty() {
            self.start(now);
        }
        tracing::debug!(enabled, "arpeggiator toggled");
    }

    /// A key went down (already inserted into `held`).
    pub fn key_pressed(&mut self, now: u64) {
        if self.enabled && self.task.is_none() {
            self.start(now);
        }
    }

    /// A key went up (already removed from `held`).
    pub fn key_released(
        &mut self,
        key: KeyId,
        held: &HeldKeys,
        registry: &mut VoiceRegistry,
        now: u64,
    ) {
        if self.current == Some(key) {
            registry.note_off(key, self.seconds(now));
            self.current = None;
        }
        if held.is_empty() {
            self.stop(registry, now);
        }
    }

    /// Advance one step. Called by the engine when the task is due.
    pub fn tick(
        &mut self,
        held: &HeldKeys,
        registry: &mut VoiceRegistry,
        patch: &Patch,
        now: u64,
    ) {
        if let Some(task) = self.task.as_mut() {
            task.fire();
        }

        let keys = held.as_slice();
        if keys.is_empty() {
            return;
        }

        let next = keys[self.index % keys.len()];
        if self.current != Some(next) {
            let at = self.seconds(now);
            if let Some(previous) = self.current.take() {
                registry.note_off(previous, at);
            }
            registry.note_on(next, patch, at);
            self.current = Some(next);
            tracing::debug!(key = next, index = self.index, "arpeggiator step");
        }

        self.index = self.index.wrapping_add(1);
    }

    fn start(&mut self, now: u64) {
        self.index = 0;
        self.task = Some(PeriodicTask::start(now, self.period));
    }

    /// Cancel the timer, reset the rotation and release the sounding voice.
    fn stop(&mut self, registry: &mut VoiceRegistry, now: u64) {
        self.task = None;
        self.index = 0;
        if let Some(key) = self.current.take() {
            registry.note_off(key, self.seconds(now));
        }
    }

    fn seconds(&self, frame: u64) -> f64 {
        frame as f64 / self.sample_rate as f64
    }
}
