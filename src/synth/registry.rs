use std::collections::HashMap;

use crate::{
    dsp::envelope::EnvelopeConfig,
    graph::{
        buffer::BufferPool,
        node::{GraphNode, RenderCtx},
    },
    synth::{
        keymap::{FrequencyTable, KeyId},
        voice::{Patch, Voice, VoiceId},
    },
    MAX_BLOCK_SIZE,
};

/// Live voices (keyed and fading) the registry holds without reallocating.
pub const VOICE_CAPACITY: usize = 64;

/// Scratch buffers a voice takes at most: envelope stage plus one timbre node.
const BUFFERS_PER_VOICE: usize = 2;

/// Owner of every live voice.
///
/// Two views over the same voices:
/// - `keyed`: key → handle of the voice that key is sounding. At most one
///   entry per key; an entry is removed the moment its key is released.
/// - `voices`: every voice still producing sound, keyed or fading, tracked by
///   its private [`VoiceId`]. A fading voice leaves this list only once its
///   oscillators have stopped.
///
/// A key pressed again while its previous voice is still fading gets a fresh
/// voice; the two overlap on the bus until the old one finishes.
///
/// Storage is sized up front: the key map has room for every mapped key, the
/// voice list for [`VOICE_CAPACITY`] voices and the buffer pool for their
/// scratch. Starting and tearing down voices on the audio thread then only
/// moves things between them.
pub struct VoiceRegistry {
    keymap: FrequencyTable,
    envelope: EnvelopeConfig,
    sample_rate: f32,
    keyed: HashMap<KeyId, VoiceId>,
    voices: Vec<Voice>,
    next_id: u64,
    pool: BufferPool,
    temp_buffer: Vec<f32>,
}

impl VoiceRegistry {
    pub fn new(keymap: FrequencyTable, envelope: EnvelopeConfig, sample_rate: f32) -> Self {
        Self {
            keyed: HashMap::with_capacity(keymap.len()),
            keymap,
            envelope,
            sample_rate,
            voices: Vec::with_capacity(VOICE_CAPACITY),
            next_id: 0,
            pool: BufferPool::new(VOICE_CAPACITY * BUFFERS_PER_VOICE),
            temp_buffer: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    pub fn keymap(&self) -> &FrequencyTable {
        &self.keymap
    }

    /// Start a voice for `key` at `now`.
    ///
    /// No-op when `key` already has a voice or is not in the key table.
    pub fn note_on(&mut self, key: KeyId, patch: &Patch, now: f64) -> Option<VoiceId> {
        if self.keyed.contains_key(&key) {
            tracing::trace!(key, "note on ignored: key already sounding");
            return None;
        }
        let Some(frequency) = self.keymap.lookup(key) else {
            tracing::trace!(key, "note on ignored: unmapped key");
            return None;
        };

        let id = VoiceId(self.next_id);
        self.next_id += 1;

        if self.voices.len() == self.voices.capacity() {
            tracing::warn!(live = self.voices.len(), "voice list full, growing");
        }
        let voice = Voice::create(
            id,
            key,
            frequency,
            patch,
            self.envelope,
            now,
            self.sample_rate,
            &mut self.pool,
        );
        self.voices.push(voice);
        self.keyed.insert(key, id);

        tracing::debug!(key, %id, frequency, mode = %patch.mode, "note on");
        Some(id)
    }

    /// Release the voice sounding `key` at `now`.
    ///
    /// The key is unregistered immediately; the voice keeps fading under its
    /// own handle. Returns the scheduled oscillator stop time, or `None` when
    /// no voice was sounding for `key`.
    pub fn note_off(&mut self, key: KeyId, now: f64) -> Option<f64> {
        let id = self.keyed.remove(&key)?;
        let voice = self.voices.iter_mut().find(|v| v.id() == id)?;
        let stop_at = voice.release(now);

        tracing::debug!(key, %id, stop_at, "note off");
        Some(stop_at)
    }

    /// Release every keyed voice at `now`.
    pub fn release_all(&mut self, now: f64) {
        for (key, id) in self.keyed.drain() {
            if let Some(voice) = self.voices.iter_mut().find(|v| v.id() == id) {
                let stop_at = voice.release(now);
                tracing::debug!(key, %id, stop_at, "note off");
            }
        }
    }

    pub fn is_sounding(&self, key: KeyId) -> bool {
        self.keyed.contains_key(&key)
    }

    /// The keyed (not yet released) voice for `key`.
    pub fn voice_for_key(&self, key: KeyId) -> Option<&Voice> {
        let id = *self.keyed.get(&key)?;
        self.voice(id)
    }

    pub fn voice(&self, id: VoiceId) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id() == id)
    }

    /// Keys with a registered voice, in no particular order.
    pub fn sounding_keys(&self) -> impl Iterator<Item = KeyId> + '_ {
        self.keyed.keys().copied()
    }

    /// Voices still addressable by key.
    pub fn active_voices(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter().filter(|v| !v.is_released())
    }

    pub fn active_voices_mut(&mut self) -> impl Iterator<Item = &mut Voice> {
        self.voices.iter_mut().filter(|v| !v.is_released())
    }

    /// Every voice still producing sound, keyed or fading.
    pub fn live_voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_count(&self) -> usize {
        self.keyed.len()
    }

    pub fn live_count(&self) -> usize {
        self.voices.len()
    }

    /// Sum every live voice into `out`, then tear down voices whose
    /// oscillators stopped within this block.
    pub fn render(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        out.fill(0.0);
        for voice in &mut self.voices {
            let frames = &mut self.temp_buffer[..out.len()];
            voice.render_block(frames, ctx);
            for (o, v) in out.iter_mut().zip(frames.iter()) {
                *o += *v;
            }
        }

        let block_end = ctx.sample_time(out.len());
        let mut idx = 0;
        while idx < self.voices.len() {
            if self.voices[idx].is_finished(block_end) {
                let voice = self.voices.remove(idx);
                tracing::debug!(id = %voice.id(), key = voice.key(), "voice torn down");
                voice.recycle(&mut self.pool);
            } else {
                idx += 1;
            }
        }
    }
}
