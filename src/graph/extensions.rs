use crate::graph::{
    amplify::Amplify, buffer::BufferPool, fm::FmNode, node::GraphNode, oscillator::OscNode,
};

/// Chain helpers. Scratch buffers for the combined node come from `pool`.
pub trait NodeExt: GraphNode + Sized {
    fn amplify<M: GraphNode>(self, modulator: M, pool: &mut BufferPool) -> Amplify<Self, M> {
        Amplify::new(self, modulator, pool.take())
    }
}

impl<T: GraphNode> NodeExt for T {}

pub trait OscExt {
    /// Frequency-modulate this oscillator by `modulator` (level = depth in Hz).
    fn frequency_modulated(self, modulator: OscNode, ratio: f32, pool: &mut BufferPool)
        -> FmNode;
}

impl OscExt for OscNode {
    fn frequency_modulated(
        self,
        modulator: OscNode,
        ratio: f32,
        pool: &mut BufferPool,
    ) -> FmNode {
        FmNode::new(self, modulator, ratio, pool.take())
    }
}
