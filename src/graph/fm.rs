use crate::{
    graph::{
        node::{GraphNode, RenderCtx},
        oscillator::OscNode,
    },
    MAX_BLOCK_SIZE,
};

/*
Frequency Modulation
====================

Two oscillators: the modulator's output is added to the carrier's
frequency, sample by sample.

    f_carrier(n) = f_base + depth · sin(2π · f_base · ratio · t)

  ratio   Modulator frequency as a multiple of the note. Integer ratios
          keep the sidebands harmonic (bell/organ-like at 1, 2, 3);
          non-integer ratios give clangorous, inharmonic tones.

  depth   Peak frequency deviation in Hz, carried as the modulator's
          level. Larger depth pushes energy into more sidebands and
          brightens the tone.

The modulator tracks the carrier: when the note frequency or the ratio
changes, its frequency is recomputed as base × ratio.
*/

pub struct FmNode {
    pub carrier: OscNode,
    pub modulator: OscNode,
    ratio: f32,
    mod_buffer: Vec<f32>,
}

impl FmNode {
    /// `buffer` holds the modulator output, at least `MAX_BLOCK_SIZE` long.
    pub fn new(
        carrier: OscNode,
        mut modulator: OscNode,
        ratio: f32,
        buffer: Vec<f32>,
    ) -> Self {
        debug_assert!(buffer.len() >= MAX_BLOCK_SIZE);
        modulator.set_frequency(carrier.frequency() * ratio);
        Self {
            carrier,
            modulator,
            ratio,
            mod_buffer: buffer,
        }
    }

    pub fn into_buffer(self) -> Vec<f32> {
        self.mod_buffer
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = ratio;
        self.modulator
            .set_frequency(self.carrier.frequency() * ratio);
    }

    pub fn depth(&self) -> f32 {
        self.modulator.level()
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.modulator.set_level(depth);
    }

    pub fn stop(&mut self, when: f64) {
        self.carrier.stop(when);
        self.modulator.stop(when);
    }
}

impl GraphNode for FmNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        let offsets = &mut self.mod_buffer[..out.len()];
        self.modulator.render_block(offsets, ctx);
        self.carrier.render_block_fm(out, offsets, ctx);
    }

    fn is_active(&self) -> bool {
        self.carrier.is_active()
    }
}
