//! Caller-owned selection over a fuzzy batch.
//!
//! Selecting only records an id; the batch itself is never touched.

use super::types::{ActorPoint, FuzzyBatch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<u32>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select a point by id. Unknown ids leave the selection unchanged.
    pub fn select<'a>(&mut self, batch: &'a FuzzyBatch, id: u32) -> Option<&'a ActorPoint> {
        let point = batch.get(id)?;
        self.selected = Some(id);
        Some(point)
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected_id(&self) -> Option<u32> {
        self.selected
    }

    pub fn current<'a>(&self, batch: &'a FuzzyBatch) -> Option<&'a ActorPoint> {
        self.selected.and_then(|id| batch.get(id))
    }
}
