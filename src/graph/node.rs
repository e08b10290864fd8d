/// Context passed to graph nodes during rendering
///
/// Contains information about what to render:
/// - sample_rate: Audio sample rate (e.g., 48000.0)
/// - time: Audio clock time of the first sample in the block, in seconds
///
/// Voices carry their own pitch, so unlike a MIDI-driven context there is no
/// frequency here: a block is rendered for every sounding voice at once.
#[derive(Debug, Clone, Copy)]
pub struct RenderCtx {
    pub sample_rate: f32,
    pub time: f64,
}

impl RenderCtx {
    pub fn new(sample_rate: f32, time: f64) -> Self {
        Self { sample_rate, time }
    }

    /// Clock time of sample `index` within the block.
    #[inline]
    pub fn sample_time(&self, index: usize) -> f64 {
        self.time + index as f64 / self.sample_rate as f64
    }

    /// Context for the block that starts `frames` samples later.
    pub fn advanced(&self, frames: usize) -> Self {
        Self {
            sample_rate: self.sample_rate,
            time: self.sample_time(frames),
        }
    }
}

/// Trait for nodes whose parameters can be pushed while they sound
///
/// Updates are applied in place: envelopes are not retriggered and
/// oscillators keep their phase.
pub trait Modulatable {
    type Param: Copy;

    /// Current value, or `None` when this node has no such parameter.
    fn get_param(&self, param: Self::Param) -> Option<f32>;

    /// Push a new value. Returns whether the node had the parameter.
    fn set_param(&mut self, param: Self::Param, value: f32) -> bool;
}

/// Core trait for audio processing graph nodes
///
/// Nodes render audio and respond to the note start, which carries the
/// clock time it happens at in `ctx.time`. Releases are scheduled on the
/// envelope directly since they return the time the voice may stop.
pub trait GraphNode: Send {
    fn render_block(&mut self, out: &mut [f32], ctx: &RenderCtx);

    /// Triggered when a note starts
    ///
    /// Default implementation does nothing (passthrough nodes).
    fn note_on(&mut self, _ctx: &RenderCtx) {
        // Default: do nothing
    }

    /// Check if this node is still producing sound
    ///
    /// Used by voice management to know when a voice can be torn down.
    fn is_active(&self) -> bool {
        true
    }
}
