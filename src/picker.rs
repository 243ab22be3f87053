// picker.rs
use rand::{thread_rng, Rng};
use std::collections::VecDeque;

/// Source of uniformly chosen indices, injected so rounds can be replayed.
pub trait IndexPicker: Send {
    /// Returns an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngPicker;

impl IndexPicker for ThreadRngPicker {
    fn pick(&mut self, len: usize) -> usize {
        thread_rng().gen_range(0..len)
    }
}

/// Replays a fixed sequence, wrapping each value into range. Falls back to
/// index 0 once the sequence is exhausted.
#[derive(Debug, Default, Clone)]
pub struct SequencePicker {
    upcoming: VecDeque<usize>,
}

impl SequencePicker {
    pub fn new(sequence: impl IntoIterator<Item = usize>) -> Self {
        Self {
            upcoming: sequence.into_iter().collect(),
        }
    }
}

impl IndexPicker for SequencePicker {
    fn pick(&mut self, len: usize) -> usize {
        self.upcoming.pop_front().unwrap_or(0) % len
    }
}
