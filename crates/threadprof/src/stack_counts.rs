use std::collections::HashMap;

use crate::frame::Frame;

/// One captured call stack, innermost frame first, exactly as observed at a
/// single sampling tick. Used as an aggregation key: equality is a full
/// ordered sequence comparison.
pub type StackKey = Vec<Frame>;

/// Folds identical stacks into counts.
///
/// `HashMap` iteration order is unspecified, but encoded symbol ids must be
/// reproducible across repeated encodes of the same profile, so entries are
/// kept in an insertion-ordered vec with a hash index alongside. Iteration
/// always yields first-encounter order.
#[derive(Debug, Default)]
pub struct StackCounts {
    index: HashMap<StackKey, usize>,
    entries: Vec<(StackKey, u64)>,
}

impl StackCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with count 1 if the stack is new, otherwise add 1.
    pub fn increment(&mut self, stack: StackKey) {
        match self.index.get(&stack) {
            Some(&at) => self.entries[at].1 += 1,
            None => {
                self.index.insert(stack.clone(), self.entries.len());
                self.entries.push((stack, 1));
            }
        }
    }

    /// Number of distinct stacks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = (&StackKey, u64)> {
        self.entries.iter().map(|(stack, count)| (stack, *count))
    }
}
