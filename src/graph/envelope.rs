use crate::{
    dsp::envelope::{Envelope, EnvelopeConfig, EnvelopeStage},
    graph::node::{GraphNode, RenderCtx},
};

/// Envelope generator node: renders the gain curve of an [`Envelope`].
///
/// `note_on` schedules the attack at `ctx.time`; `release` schedules the
/// release ramp. Used as the modulator of an `Amplify` it becomes the voice's gain stage.
pub struct EnvNode {
    env: Envelope,
    last_level: f32,
}

impl EnvNode {
    pub fn new(config: EnvelopeConfig) -> Self {
        Self {
            env: Envelope::new(config),
            last_level: config.floor,
        }
    }

    /// Start the release at `now`, returning when it lands on the floor.
    pub fn release(&mut self, now: f64) -> f64 {
        self.env.release(now)
    }

    pub fn envelope(&self) -> &Envelope {
        &self.env
    }

    pub fn stage_at(&self, time: f64) -> EnvelopeStage {
        self.env.stage_at(time)
    }
}

impl GraphNode for EnvNode {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx) {
        self.env.render(out, ctx.time, ctx.sample_rate);
        if let Some(&last) = out.last() {
            self.last_level = last;
        }
    }

    fn note_on(&mut self, ctx: &RenderCtx) {
        self.env.attack(ctx.time);
    }

    fn is_active(&self) -> bool {
        // Done once released and the rendered gain has landed on the floor
        !self.env.is_released() || self.last_level > self.env.config().floor
    }
}
