// ── Throughput History Buffer ──

use std::collections::VecDeque;

use crate::model::ThroughputSample;

/// Fixed-length FIFO of recent throughput samples, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct ThroughputHistory {
    samples: VecDeque<ThroughputSample>,
    capacity: usize,
}

impl Default for ThroughputHistory {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl ThroughputHistory {
    pub const DEFAULT_CAPACITY: usize = 60;

    /// A full buffer of zero samples, so charts start at a flat line.
    pub fn new(capacity: usize) -> Self {
        let mut samples = VecDeque::with_capacity(capacity + 1);
        samples.resize(capacity, ThroughputSample::default());
        Self { samples, capacity }
    }

    pub fn push(&mut self, sample: ThroughputSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn latest(&self) -> Option<&ThroughputSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ThroughputSample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<ThroughputSample> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
