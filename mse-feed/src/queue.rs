use std::collections::VecDeque;

use bytes::Bytes;

/// FIFO of fragments waiting for the sink to become ready.
#[derive(Debug, Default)]
pub struct FragmentQueue {
    inner: VecDeque<Bytes>,
    peak: usize,
}

impl FragmentQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, fragment: Bytes) {
        self.inner.push_back(fragment);
        self.peak = self.peak.max(self.inner.len());
    }

    pub fn pop(&mut self) -> Option<Bytes> {
        self.inner.pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Highest depth seen since creation.
    pub fn peak(&self) -> usize {
        self.peak
    }

    pub fn clear(&mut self) -> usize {
        let dropped = self.inner.len();
        self.inner.clear();
        dropped
    }
}
