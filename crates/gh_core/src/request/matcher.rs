//! Matching collaborators.
//!
//! A [`Matcher`] is asked for a responder each time a scheduled search comes
//! due. Returning `None` means nobody answered yet.

use super::types::{HelpRequest, Responder};
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait Matcher {
    fn find_responder(&mut self, request: &HelpRequest, now: DateTime<Utc>) -> Option<Responder>;
}

/// Stand-in search: someone always answers once the delay has passed.
#[derive(Debug, Clone)]
pub struct SimulatedMatcher {
    rng: ChaCha8Rng,
}

impl SimulatedMatcher {
    pub fn new() -> Self {
        Self { rng: ChaCha8Rng::from_entropy() }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }
}

impl Default for SimulatedMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Matcher for SimulatedMatcher {
    fn find_responder(&mut self, request: &HelpRequest, now: DateTime<Utc>) -> Option<Responder> {
        let id = uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid();
        Some(Responder { id, kind: request.kind, matched_at: now })
    }
}

/// Replays a fixed sequence of search outcomes, then finds nobody.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ScriptedMatcher {
    outcomes: std::collections::VecDeque<bool>,
    calls: u32,
}

#[cfg(test)]
impl ScriptedMatcher {
    pub fn new(outcomes: impl IntoIterator<Item = bool>) -> Self {
        Self { outcomes: outcomes.into_iter().collect(), calls: 0 }
    }

    pub fn calls(&self) -> u32 {
        self.calls
    }
}

#[cfg(test)]
impl Matcher for ScriptedMatcher {
    fn find_responder(&mut self, request: &HelpRequest, now: DateTime<Utc>) -> Option<Responder> {
        self.calls += 1;
        if self.outcomes.pop_front().unwrap_or(false) {
            Some(Responder { id: uuid::Uuid::new_v4(), kind: request.kind, matched_at: now })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HelpKind;

    #[test]
    fn test_simulated_matcher_always_answers() {
        let mut matcher = SimulatedMatcher::with_seed(7);
        let request = HelpRequest::new(HelpKind::Safety, String::new(), Utc::now());
        let now = Utc::now();

        let responder = matcher.find_responder(&request, now).unwrap();
        assert_eq!(responder.kind, HelpKind::Safety);
        assert_eq!(responder.matched_at, now);
    }

    #[test]
    fn test_simulated_matcher_seed_is_reproducible() {
        let request = HelpRequest::new(HelpKind::Pad, String::new(), Utc::now());
        let now = Utc::now();
        let a = SimulatedMatcher::with_seed(42).find_responder(&request, now).unwrap();
        let b = SimulatedMatcher::with_seed(42).find_responder(&request, now).unwrap();
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_scripted_matcher_runs_out() {
        let mut matcher = ScriptedMatcher::new([false, true]);
        let request = HelpRequest::new(HelpKind::Other, String::new(), Utc::now());
        let now = Utc::now();

        assert!(matcher.find_responder(&request, now).is_none());
        assert!(matcher.find_responder(&request, now).is_some());
        assert!(matcher.find_responder(&request, now).is_none());
        assert_eq!(matcher.calls(), 3);
    }
}
