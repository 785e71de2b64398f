//! Deadline queue for deferred resolution searches.
//!
//! Entries are ordered by deadline, then by scheduling order. Cancelling
//! removes the entry outright, so a cancelled search can never be popped.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A search scheduled for one requesting episode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledSearch {
    pub id: TimerId,
    pub episode: u64,
    pub attempt: u32,
    pub deadline: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(DateTime<Utc>, TimerId), ScheduledSearch>,
    next_id: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: DateTime<Utc>, episode: u64, attempt: u32) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.insert((deadline, id), ScheduledSearch { id, episode, attempt, deadline });
        id
    }

    /// Remove a pending entry. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let key = self.entries.keys().find(|(_, entry_id)| *entry_id == id).copied();
        match key {
            Some(key) => self.entries.remove(&key).is_some(),
            None => false,
        }
    }

    /// Pop the earliest entry whose deadline is at or before `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<ScheduledSearch> {
        let key = *self.entries.keys().next()?;
        if key.0 > now {
            return None;
        }
        self.entries.remove(&key)
    }

    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
