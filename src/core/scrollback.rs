//! # Scrollback
//!
//! Ordered, capacity-bounded buffer of decorated lines. Appending past
//! capacity evicts the oldest line first.

use std::collections::VecDeque;

use crate::core::line::DecoratedLine;

pub const DEFAULT_MAX_LINES: usize = 5_000;

#[derive(Debug, Clone)]
pub struct Scrollback {
    lines: VecDeque<DecoratedLine>,
    capacity: usize,
}

impl Scrollback {
    /// A zero capacity is bumped to one so the newest line is always kept.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_MAX_LINES)),
            capacity,
        }
    }

    /// Append a line, returning the evicted line if the buffer was full.
    pub fn push(&mut self, line: DecoratedLine) -> Option<DecoratedLine> {
        let evicted = if self.lines.len() >= self.capacity {
            self.lines.pop_front()
        } else {
            None
        };
        self.lines.push_back(line);
        evicted
    }

    pub fn replace(&mut self, lines: impl IntoIterator<Item = DecoratedLine>) {
        self.lines.clear();
        for line in lines {
            self.push(line);
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &DecoratedLine> + ExactSizeIterator {
        self.lines.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DecoratedLine> {
        self.lines.iter_mut()
    }

    pub fn last(&self) -> Option<&DecoratedLine> {
        self.lines.back()
    }

    pub fn get(&self, index: usize) -> Option<&DecoratedLine> {
        self.lines.get(index)
    }

    pub fn to_vec(&self) -> Vec<DecoratedLine> {
        self.lines.iter().cloned().collect()
    }
}

impl Default for Scrollback {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}
