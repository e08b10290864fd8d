use crate::{
    dsp::oscillator::OscillatorBlock,
    graph::node::{GraphNode, RenderCtx},
};

/*
LFO (Low Frequency Oscillator)
==============================

An oscillator used as a control signal rather than as sound. Its output is
a gain multiplier centered on `center`:

    out(n) = center + depth · sin(2π · rate · t)

With center = 1.0 this is exactly a Web-Audio-style gain parameter whose
base value is 1 and whose input is an oscillator scaled by `depth`.

When to Use LfoNode
-------------------

  Tremolo:    LfoNode::tremolo(5.0, 0.05) multiplies the voice bus by
              1 ± 0.05, a gentle 5 Hz amplitude wobble.

  AM:         LfoNode::tremolo(am_rate, am_depth) as the modulator of an
              Amplify. At rates above ~20 Hz the wobble stops being heard
              as movement and turns into sidebands (carrier ± rate).

Phase
-----

LfoNodes are free-running. The tremolo LFO starts with the engine, so
voices that start at different times share one phase and pulse together.
*/

pub struct LfoNode {
    osc: OscillatorBlock,
    rate: f32,
    depth: f32,
    center: f32,
}

impl LfoNode {
    /// Bipolar sine in -depth..=depth.
    pub fn sine(rate: f32, depth: f32) -> Self {
        Self {
            osc: OscillatorBlock::sine(),
            rate,
            depth,
            center: 0.0,
        }
    }

    /// Gain multiplier swinging around unity.
    pub fn tremolo(rate: f32, depth: f32) -> Self {
        Self {
            center: 1.0,
            ..Self::sine(rate, depth)
        }
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate;
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn set_depth(&mut self, depth: f32) {
        self.depth = depth;
    }
}

impl GraphNode for LfoNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        for sample in out.iter_mut() {
            *sample = self.center + self.depth * self.osc.next_sample(self.rate, ctx.sample_rate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tremolo_stays_within_depth_of_unity() {
        let mut lfo = LfoNode::tremolo(5.0, 0.05);
        let mut buffer = vec![0.0; 48_000 / 5];
        let ctx = RenderCtx::new(48_000.0, 0.0);

        lfo.render_block(&mut buffer, &ctx);

        let max = buffer.iter().copied().fold(f32::MIN, f32::max);
        let min = buffer.iter().copied().fold(f32::MAX, f32::min);
        assert!((max - 1.05).abs() < 1e-3, "max {max}");
        assert!((min - 0.95).abs() < 1e-3, "min {min}");
    }

    #[test]
    fn bipolar_sine_is_centered() {
        let mut lfo = LfoNode::sine(10.0, 2.0);
        let mut buffer = vec![0.0; 4800];
        let ctx = RenderCtx::new(48_000.0, 0.0);

        lfo.render_block(&mut buffer, &ctx);

        let mean = buffer.iter().sum::<f32>() / buffer.len() as f32;
        assert!(mean.abs() < 1e-2, "mean {mean}");
        assert!(buffer.iter().all(|s| s.abs() <= 2.0 + 1e-5));
    }

    #[test]
    fn live_rate_change_keeps_running() {
        let mut lfo = LfoNode::tremolo(5.0, 0.5);
        let ctx = RenderCtx::new(48_000.0, 0.0);
        let mut buffer = vec![0.0; 256];
        lfo.render_block(&mut buffer, &ctx);

        let last = buffer[255];
        lfo.set_rate(40.0);
        lfo.render_block(&mut buffer, &ctx.advanced(256));
        // No phase reset: continues near where it was
        assert!((buffer[0] - last).abs() < 0.05);
        assert_eq!(lfo.rate(), 40.0);
    }
}
