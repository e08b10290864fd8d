//! Scratch buffers shared by voices.
//!
//! Nodes that mix or multiply two signals need a block-sized scratch buffer.
//! Voices are created and torn down on the audio thread, so the registry
//! keeps every buffer it has handed out in a [`BufferPool`]: a new voice
//! takes its buffers from the pool and a finished voice gives them back.

use crate::MAX_BLOCK_SIZE;

/// Free list of `MAX_BLOCK_SIZE` scratch buffers.
pub struct BufferPool {
    free: Vec<Vec<f32>>,
}

impl BufferPool {
    /// Pool holding `count` zeroed buffers, with room for `count` returns.
    pub fn new(count: usize) -> Self {
        let mut free = Vec::with_capacity(count);
        free.extend((0..count).map(|_| vec![0.0; MAX_BLOCK_SIZE]));
        Self { free }
    }

    /// Buffers ready to hand out.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.free.capacity()
    }

    /// Take a buffer. Allocates only when the pool has run dry.
    pub fn take(&mut self) -> Vec<f32> {
        match self.free.pop() {
            Some(buffer) => buffer,
            None => {
                tracing::warn!("buffer pool exhausted, allocating");
                vec![0.0; MAX_BLOCK_SIZE]
            }
        }
    }

    /// Return a buffer. Buffers beyond the pool's capacity are dropped.
    pub fn put(&mut self, buffer: Vec<f32>) {
        if buffer.len() == MAX_BLOCK_SIZE && self.free.len() < self.free.capacity() {
            self.free.push(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_come_back() {
        let mut pool = BufferPool::new(2);
        let a = pool.take();
        let b = pool.take();
        assert_eq!(pool.available(), 0);
        assert_eq!(a.len(), MAX_BLOCK_SIZE);

        pool.put(a);
        pool.put(b);
        assert_eq!(pool.available(), 2);
    }

    #[test]
    fn dry_pool_still_hands_out_buffers() {
        let mut pool = BufferPool::new(0);
        let buffer = pool.take();
        assert_eq!(buffer.len(), MAX_BLOCK_SIZE);

        // No room to keep it
        pool.put(buffer);
        assert_eq!(pool.available(), 0);
    }
}
