//! The bounded set of live hypotheses.

use crate::{error::DecodeError, hypothesis::MentionSet};

/// Owns the live leaves of a search between a reset and a commit.
#[derive(Debug, Default)]
pub struct LeafStore {
    capacity: usize,
    leaves: Vec<MentionSet>,
}

impl LeafStore {
    /// Drop whatever is held and start over from `leaves`. The buffer grows
    /// to `capacity` on first use and is reused afterwards.
    pub fn reset(&mut self, leaves: Vec<MentionSet>, capacity: usize) -> Result<(), DecodeError> {
        if capacity == 0 {
            return Err(DecodeError::ZeroCapacity);
        }
        self.leaves.clear();
        if self.leaves.capacity() < capacity {
            self.leaves.reserve_exact(capacity);
        }
        self.capacity = capacity;
        self.leaves.extend(leaves.into_iter().take(capacity));
        Ok(())
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn leaves(&self) -> &[MentionSet] {
        &self.leaves
    }

    pub fn leaves_mut(&mut self) -> &mut [MentionSet] {
        &mut self.leaves
    }

    /// Replace the leaves wholesale, keeping the allocation.
    pub fn replace(&mut self, leaves: impl IntoIterator<Item = MentionSet>) {
        self.leaves.clear();
        self.leaves.extend(leaves.into_iter().take(self.capacity));
    }

    /// Move every leaf out, leaving the store empty.
    pub fn take(&mut self) -> Vec<MentionSet> {
        self.leaves.drain(..).collect()
    }
}
