use crate::dsp::oscillator::{OscillatorBlock, OscillatorWaveform};
use crate::graph::node::{GraphNode, RenderCtx};

/*
Audio Oscillator
================

An oscillator is the fundamental sound source in a synthesizer. It generates
a repeating waveform at a specific frequency (pitch), producing the raw
audio material that gets shaped by envelopes and modulation.

Waveform Types and Their Character:
-----------------------------------

Sine: The purest tone - a single frequency with no harmonics.
  - Use: additive partials, AM/FM carriers and modulators

Sawtooth: The richest waveform - all harmonics, falling off as 1/n.
  - Sound: Bright, buzzy, brassy

Square: Only odd harmonics, falling off as 1/n.
  - Sound: Hollow, woody, clarinet-like

Triangle: Odd harmonics falling off as 1/n².
  - Sound: Soft, between sine and square

Lifetime
--------

An OscNode starts when it is created and runs until its stop time. A stop
is scheduled on the audio clock (stop_at) rather than applied immediately,
so a voice can stop its oscillators exactly when its release ramp lands.
From the first sample at or past the stop time the node outputs silence
and reports itself inactive; a stopped node never restarts.

Frequency Modulation
--------------------

render_block_fm() takes a per-sample offset in Hz that is added to the
node's frequency:

    f(n) = frequency + offset(n)

Used by the FM voice, where offset is the modulator's output scaled by the
FM depth.
*/

pub struct OscNode {
    osc: OscillatorBlock,
    frequency: f32,
    /// Output scale (partial amplitude, FM depth in Hz, ...)
    level: f32,
    stop_at: Option<f64>,
    stopped: bool,
}

impl OscNode {
    pub fn new(waveform: OscillatorWaveform, frequency: f32) -> Self {
        Self {
            osc: OscillatorBlock::new(waveform),
            frequency,
            level: 1.0,
            stop_at: None,
            stopped: false,
        }
    }

    pub fn sine(frequency: f32) -> Self {
        Self::new(OscillatorWaveform::Sine, frequency)
    }

    pub fn with_level(mut self, level: f32) -> Self {
        self.level = level;
        self
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn set_level(&mut self, level: f32) {
        self.level = level;
    }

    pub fn waveform(&self) -> OscillatorWaveform {
        self.osc.waveform()
    }

    /// Schedule the oscillator to stop at clock time `when`.
    ///
    /// Only the first stop counts, matching a one-shot source.
    pub fn stop(&mut self, when: f64) {
        if self.stop_at.is_none() {
            self.stop_at = Some(when);
        }
    }

    pub fn stop_time(&self) -> Option<f64> {
        self.stop_at
    }

    /// Number of leading samples in this block that are still running.
    #[inline]
    fn running_samples(&mut self, len: usize, ctx: &RenderCtx) -> usize {
        if self.stopped {
            return 0;
        }
        let Some(stop_at) = self.stop_at else {
            return len;
        };
        let remaining = ((stop_at - ctx.time) * ctx.sample_rate as f64).ceil();
        if remaining <= 0.0 {
            self.stopped = true;
            return 0;
        }
        let running = (remaining as usize).min(len);
        if running < len {
            self.stopped = true;
        }
        running
    }

    /// Render with a per-sample frequency offset in Hz.
    pub fn render_block_fm(&mut self, out: &mut [f32], offsets: &[f32], ctx: &RenderCtx) {
        let running = self.running_samples(out.len(), ctx);
        let (live, silent) = out.split_at_mut(running);
        for (sample, offset) in live.iter_mut().zip(offsets) {
            *sample = self.level * self.osc.next_sample(self.frequency + offset, ctx.sample_rate);
        }
        silent.fill(0.0);
    }
}

impl GraphNode for OscNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let running = self.running_samples(out.len(), ctx);
        let (live, silent) = out.split_at_mut(running);
        for sample in live.iter_mut() {
            *sample = self.level * self.osc.next_sample(self.frequency, ctx.sample_rate);
        }
        silent.fill(0.0);
    }

    fn is_active(&self) -> bool {
        !self.stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    #[test]
    fn valid_sine() {
        let sample_rate = 48_000.0;
        let ctx = RenderCtx::new(sample_rate, 0.0);
        let mut node = OscNode::sine(261.63);

        let mut buffer = vec![0.0f32; 128];
        node.render_block(&mut buffer, &ctx);

        let n = 12;
        let expected = (TAU * 261.63 * n as f32 / sample_rate).sin();
        assert!(
            (buffer[n] - expected).abs() < 1e-4,
            "expected {expected}, got {}",
            buffer[n]
        );
    }

    #[test]
    fn level_scales_output() {
        let ctx = RenderCtx::new(48_000.0, 0.0);
        let mut node = OscNode::new(OscillatorWaveform::Square, 100.0).with_level(0.25);
        let mut buffer = vec![0.0f32; 64];
        node.render_block(&mut buffer, &ctx);
        assert!(buffer.iter().all(|s| s.abs() <= 0.25 + 1e-6));
        assert!((buffer[0] - 0.25).abs() < 1e-6);
    }

    #[test]
    fn stops_mid_block_at_scheduled_time() {
        let ctx = RenderCtx::new(1_000.0, 0.0);
        let mut node = OscNode::new(OscillatorWaveform::Square, 10.0);
        node.stop(0.1);

        let mut buffer = vec![0.0f32; 200];
        node.render_block(&mut buffer, &ctx);

        assert!(buffer[..100].iter().all(|s| s.abs() > 0.5));
        assert!(buffer[100..].iter().all(|&s| s == 0.0));
        assert!(!node.is_active());
    }

    #[test]
    fn runs_until_stop_block() {
        let ctx = RenderCtx::new(1_000.0, 0.0);
        let mut node = OscNode::sine(5.0);
        node.stop(1.0);

        let mut buffer = vec![0.0f32; 100];
        node.render_block(&mut buffer, &ctx);
        assert!(node.is_active());
        assert_eq!(node.stop_time(), Some(1.0));
    }

    #[test]
    fn fm_offset_shifts_pitch() {
        let ctx = RenderCtx::new(48_000.0, 0.0);
        let mut plain = OscNode::sine(440.0);
        let mut shifted = OscNode::sine(220.0);

        let mut a = vec![0.0f32; 256];
        let mut b = vec![0.0f32; 256];
        let offsets = vec![220.0f32; 256];
        plain.render_block(&mut a, &ctx);
        shifted.render_block_fm(&mut b, &offsets, &ctx);

        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-3);
        }
    }
}
