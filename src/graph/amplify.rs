use crate::{
    graph::node::{GraphNode, RenderCtx},
    MAX_BLOCK_SIZE,
};

/// Multiply a signal by a modulator, sample by sample.
///
/// The same combinator serves as an envelope gain stage
/// (`timbre.amplify(env, pool)`) and as amplitude modulation
/// (`carrier.amplify(LfoNode::tremolo(rate, depth), pool)`).
pub struct Amplify<N, M> {
    pub signal: N,
    pub modulator: M,
    temp_buffer: Vec<f32>,
}

impl<N, M> Amplify<N, M> {
    /// `buffer` is the modulator's scratch, at least `MAX_BLOCK_SIZE` long.
    pub fn new(signal: N, modulator: M, buffer: Vec<f32>) -> Self {
        debug_assert!(buffer.len() >= MAX_BLOCK_SIZE);
        Self {
            signal,
            modulator,
            temp_buffer: buffer,
        }
    }

    pub fn into_parts(self) -> (N, M, Vec<f32>) {
        (self.signal, self.modulator, self.temp_buffer)
    }
}

impl<N: GraphNode, M: GraphNode> GraphNode for Amplify<N, M> {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        // Render signal into output
        self.signal.render_block(out, ctx);

        // Slice temp buffer to match output size (RT-safe, no allocation)
        let frames = &mut self.temp_buffer[..out.len()];
        frames.fill(0.0);
        self.modulator.render_block(frames, ctx);

        for (o, m) in out.iter_mut().zip(frames.iter()) {
            *o *= *m;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.signal.note_on(ctx);
        self.modulator.note_on(ctx);
    }

    fn is_active(&self) -> bool {
        self.modulator.is_active() && self.signal.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::OscillatorWaveform;
    use crate::graph::{buffer::BufferPool, extensions::NodeExt, lfo::LfoNode, oscillator::OscNode};

    #[test]
    fn multiplies_signal_by_modulator() {
        let ctx = RenderCtx::new(48_000.0, 0.0);
        // Square carrier is ±1, so the output traces the modulator's magnitude
        let mut pool = BufferPool::new(1);
        let mut am = OscNode::new(OscillatorWaveform::Square, 100.0)
            .amplify(LfoNode::tremolo(30.0, 0.5), &mut pool);
        let mut reference = LfoNode::tremolo(30.0, 0.5);

        let mut out = vec![0.0f32; 128];
        let mut expected = vec![0.0f32; 128];
        am.render_block(&mut out, &ctx);
        reference.render_block(&mut expected, &ctx);

        for (o, e) in out.iter().zip(&expected) {
            assert!((o.abs() - e).abs() < 1e-6);
        }
    }

    #[test]
    fn inactive_once_signal_stops() {
        let ctx = RenderCtx::new(1_000.0, 0.0);
        let mut carrier = OscNode::sine(100.0);
        carrier.stop(0.05);
        let mut am = carrier.amplify(LfoNode::tremolo(5.0, 0.1), &mut BufferPool::new(1));

        let mut out = vec![0.0f32; 100];
        am.render_block(&mut out, &ctx);
        assert!(!am.is_active());
    }
}
