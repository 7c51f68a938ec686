use std::collections::VecDeque;

use crate::models::Bar;

/// Rolling window of the most recent bars for one live session.
///
/// Bounded: pushing past capacity evicts the oldest bar.
#[derive(Debug, Clone)]
pub struct BarWindow {
    bars: VecDeque<Bar>,
    capacity: usize,
}

impl BarWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            bars: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, bar: Bar) {
        self.bars.push_back(bar);
        while self.bars.len() > self.capacity {
            self.bars.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.back()
    }

    /// The window contents, oldest first.
    pub fn snapshot(&self) -> Vec<Bar> {
        self.bars.iter().cloned().collect()
    }
}
