use super::clock::{Clock, SystemClock};
use super::matcher::{Matcher, SimulatedMatcher};
use super::timer::{ScheduledSearch, TimerId, TimerQueue};
use super::transitions::TransitionValidator;
use super::types::*;
use crate::config::LifecycleConfig;
use crate::error::{HelpError, Operation, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

type Listener = Box<dyn FnMut(&StatusChange)>;

/// Counters for UI display and diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleStatistics {
    pub submitted: u64,
    pub matched: u64,
    pub resolved: u64,
    pub cancelled: u64,
    /// Requests whose searches all came back empty
    pub exhausted: u64,
}

/// Owns the single help-request slot and drives it through its lifecycle.
///
/// Deferred searches sit in an internal timer queue and only run inside
/// [`poll`](Self::poll), so every state change happens on the caller's thread.
/// Each submission opens a new episode; a search belonging to an older episode
/// is discarded when it comes due.
pub struct LifecycleManager<C: Clock = SystemClock, M: Matcher = SimulatedMatcher> {
    config: LifecycleConfig,
    clock: C,
    matcher: M,
    status: RequestStatus,
    current: Option<HelpRequest>,
    episode: u64,
    pending: Option<TimerId>,
    timers: TimerQueue,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener_id: u64,
    stats: LifecycleStatistics,
}

impl LifecycleManager {
    /// Wall clock and simulated matching
    pub fn with_config(config: LifecycleConfig) -> Result<Self> {
        Self::new(config, SystemClock, SimulatedMatcher::new())
    }
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self::build(LifecycleConfig::default(), SystemClock, SimulatedMatcher::new())
    }
}

impl<C: Clock, M: Matcher> LifecycleManager<C, M> {
    /// Fails with `InvalidParameter` if `config` does not validate.
    pub fn new(config: LifecycleConfig, clock: C, matcher: M) -> Result<Self> {
        config.validate().map_err(HelpError::InvalidParameter)?;
        Ok(Self::build(config, clock, matcher))
    }

    fn build(config: LifecycleConfig, clock: C, matcher: M) -> Self {
        Self {
            config,
            clock,
            matcher,
            status: RequestStatus::Idle,
            current: None,
            episode: 0,
            pending: None,
            timers: TimerQueue::new(),
            listeners: Vec::new(),
            next_listener_id: 0,
            stats: LifecycleStatistics::default(),
        }
    }

    pub fn current_status(&self) -> RequestStatus {
        self.status
    }

    pub fn current_request(&self) -> Option<&HelpRequest> {
        self.current.as_ref()
    }

    pub fn responder(&self) -> Option<&Responder> {
        self.current.as_ref().and_then(|r| r.responder.as_ref())
    }

    pub fn statistics(&self) -> &LifecycleStatistics {
        &self.stats
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    pub fn matcher(&self) -> &M {
        &self.matcher
    }

    /// Whether a search is scheduled for the current request
    pub fn has_pending_search(&self) -> bool {
        self.pending.is_some()
    }

    /// When the next scheduled search comes due
    pub fn next_deadline(&self) -> Option<DateTime<Utc>> {
        self.timers.next_deadline()
    }

    /// Register a listener, called synchronously on every status change.
    pub fn on_status_change<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&StatusChange) + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Submit a new request. Only legal while idle.
    pub fn submit(&mut self, kind: HelpKind, note: impl Into<String>) -> Result<RequestId> {
        if self.status != RequestStatus::Idle {
            debug!(status = %self.status, "Rejected submit");
            return Err(HelpError::invalid_transition(Operation::Submit, self.status));
        }

        let now = self.clock.now();
        let deadline = now.checked_add_signed(self.config.resolution_delay()).ok_or_else(|| {
            HelpError::InvalidParameter(format!("resolution delay overflows clock time {now}"))
        })?;
        let request = HelpRequest::new(kind, note.into(), now);
        let request_id = request.id;

        self.episode += 1;
        self.pending = Some(self.timers.schedule(deadline, self.episode, 1));
        self.current = Some(request);
        self.stats.submitted += 1;

        info!(
            request = %request_id,
            kind = %kind,
            episode = self.episode,
            "Help request submitted"
        );
        self.transition(RequestStatus::Requesting, None);
        Ok(request_id)
    }

    /// Submit with a kind given by name (`pad`, `tissue`, `safety`, `other`).
    pub fn submit_str(&mut self, kind: &str, note: impl Into<String>) -> Result<RequestId> {
        if self.status != RequestStatus::Idle {
            return Err(HelpError::invalid_transition(Operation::Submit, self.status));
        }
        let kind: HelpKind = kind.parse()?;
        self.submit(kind, note)
    }

    /// Withdraw the current request, whether or not someone has answered.
    pub fn cancel(&mut self) -> Result<()> {
        if !self.status.is_occupied() {
            debug!(status = %self.status, "Rejected cancel");
            return Err(HelpError::invalid_transition(Operation::Cancel, self.status));
        }

        if let Some(timer) = self.pending.take() {
            let removed = self.timers.cancel(timer);
            debug!(removed, "Cancelled pending search");
        }
        // Anything still queued for this episode is now stale.
        self.episode += 1;
        self.stats.cancelled += 1;

        let request_id = self.current.as_ref().map(|r| r.id);
        info!(request = ?request_id, "Help request cancelled");
        self.transition(RequestStatus::Idle, None);
        self.current = None;
        Ok(())
    }

    /// Mark the answered request as done.
    pub fn resolve(&mut self) -> Result<()> {
        if self.status != RequestStatus::Active {
            debug!(status = %self.status, "Rejected resolve");
            return Err(HelpError::invalid_transition(Operation::Resolve, self.status));
        }

        if let Some(request) = self.current.as_mut() {
            request.mark_resolved();
            info!(request = %request.id, "Help request resolved");
        }
        self.stats.resolved += 1;

        self.transition(RequestStatus::Resolved, None);
        self.transition(RequestStatus::Idle, None);
        self.current = None;
        Ok(())
    }

    /// Run every search that is due. Returns how many came due.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        while let Some(search) = self.timers.pop_due(now) {
            fired += 1;
            self.run_search(search, now);
        }
        fired
    }

    fn run_search(&mut self, search: ScheduledSearch, now: DateTime<Utc>) {
        let is_current = search.episode == self.episode
            && self.pending == Some(search.id)
            && self.status == RequestStatus::Requesting;
        if !is_current {
            debug!(episode = search.episode, current = self.episode, "Discarding stale search");
            return;
        }
        self.pending = None;

        let Some(request) = self.current.as_ref() else {
            return;
        };

        match self.matcher.find_responder(request, now) {
            Some(responder) => {
                info!(request = %request.id, attempt = search.attempt, "Responder found");
                if let Some(request) = self.current.as_mut() {
                    request.activate(responder.clone());
                }
                self.stats.matched += 1;
                self.transition(RequestStatus::Active, Some(responder));
            }
            None if search.attempt < self.config.max_search_attempts => {
                let next_attempt = search.attempt + 1;
                match now.checked_add_signed(self.config.retry_delay()) {
                    Some(deadline) => {
                        debug!(
                            attempt = search.attempt,
                            next_attempt,
                            "Nobody found, searching again"
                        );
                        self.pending =
                            Some(self.timers.schedule(deadline, self.episode, next_attempt));
                    }
                    None => {
                        warn!(attempt = search.attempt, "Retry deadline out of range, giving up");
                        self.stats.exhausted += 1;
                    }
                }
            }
            None => {
                warn!(
                    request = %request.id,
                    attempts = search.attempt,
                    "No responder found, search exhausted"
                );
                self.stats.exhausted += 1;
            }
        }
    }

    fn transition(&mut self, to: RequestStatus, responder: Option<Responder>) {
        let from = self.status;
        // Callers check their preconditions first; this keeps the slot defined regardless.
        if let Err(e) = TransitionValidator::validate_transition(from, to) {
            warn!("{e}");
            return;
        }

        self.status = to;
        let request_id = self.current.as_ref().map(|r| r.id);
        if let Some(request) = self.current.as_mut() {
            request.status = to;
            if to == RequestStatus::Idle {
                request.responder = None;
            }
        }

        let change = StatusChange {
            request_id,
            previous: from,
            status: to,
            responder,
            at: self.clock.now(),
        };
        debug!(from = %from, to = %to, "Status changed");
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::clock::ManualClock;
    use crate::request::matcher::ScriptedMatcher;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<StatusChange>>>;

    fn create_manager() -> (LifecycleManager<ManualClock, SimulatedMatcher>, ManualClock, Log) {
        let clock = ManualClock::default();
        let mut manager = LifecycleManager::new(
            LifecycleConfig::default(),
            clock.clone(),
            SimulatedMatcher::with_seed(1),
        )
        .unwrap();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        manager.on_status_change(move |change| sink.borrow_mut().push(change.clone()));
        (manager, clock, log)
    }

    fn statuses(log: &Log) -> Vec<RequestStatus> {
        log.borrow().iter().map(|c| c.status).collect()
    }

    #[test]
    fn test_starts_idle() {
        let (manager, _, log) = create_manager();
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(manager.current_request().is_none());
        assert!(manager.responder().is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_submit_moves_to_requesting() {
        let (mut manager, clock, log) = create_manager();
        clock.advance_ms(1234);

        let id = manager.submit(HelpKind::Pad, "").unwrap();

        assert_eq!(manager.current_status(), RequestStatus::Requesting);
        let request = manager.current_request().unwrap();
        assert_eq!(request.id, id);
        assert_eq!(request.kind, HelpKind::Pad);
        assert_eq!(request.created_at, clock.now());
        assert!(request.responder.is_none());
        assert!(manager.has_pending_search());
        assert_eq!(statuses(&log), vec![RequestStatus::Requesting]);
    }

    #[test]
    fn test_submit_rejected_unless_idle() {
        let (mut manager, clock, _) = create_manager();
        manager.submit(HelpKind::Tissue, "").unwrap();

        let err = manager.submit(HelpKind::Pad, "again").unwrap_err();
        assert_eq!(
            err,
            HelpError::invalid_transition(Operation::Submit, RequestStatus::Requesting)
        );
        assert_eq!(manager.current_status(), RequestStatus::Requesting);
        assert_eq!(manager.current_request().unwrap().kind, HelpKind::Tissue);

        clock.advance_ms(5000);
        manager.poll();
        let err = manager.submit(HelpKind::Pad, "").unwrap_err();
        assert_eq!(err, HelpError::invalid_transition(Operation::Submit, RequestStatus::Active));
        assert_eq!(manager.current_status(), RequestStatus::Active);
    }

    #[test]
    fn test_submit_str_rejects_unknown_kind() {
        let (mut manager, _, log) = create_manager();
        let err = manager.submit_str("umbrella", "").unwrap_err();
        assert_eq!(err, HelpError::InvalidKind("umbrella".to_string()));
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(log.borrow().is_empty());

        manager.submit_str("safety-companion", "near gate B").unwrap();
        assert_eq!(manager.current_request().unwrap().kind, HelpKind::Safety);
        assert_eq!(manager.current_request().unwrap().note, "near gate B");
    }

    #[test]
    fn test_submit_str_checks_status_before_kind() {
        let (mut manager, _, _) = create_manager();
        manager.submit(HelpKind::Pad, "").unwrap();
        let err = manager.submit_str("umbrella", "").unwrap_err();
        assert!(matches!(err, HelpError::InvalidTransition { .. }));
    }

    #[test]
    fn test_full_lifecycle_scenario() {
        let (mut manager, clock, log) = create_manager();
        manager.submit_str("pad", "").unwrap();

        clock.advance_ms(4999);
        assert_eq!(manager.poll(), 0);
        assert_eq!(manager.current_status(), RequestStatus::Requesting);

        clock.advance_ms(1);
        assert_eq!(manager.poll(), 1);
        assert_eq!(manager.current_status(), RequestStatus::Active);
        let responder = manager.responder().cloned().unwrap();
        assert_eq!(responder.kind, HelpKind::Pad);
        assert_eq!(responder.matched_at, clock.now());

        manager.resolve().unwrap();
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(manager.current_request().is_none());
        assert!(manager.responder().is_none());

        assert_eq!(
            statuses(&log),
            vec![
                RequestStatus::Requesting,
                RequestStatus::Active,
                RequestStatus::Resolved,
                RequestStatus::Idle,
            ]
        );
        let changes = log.borrow();
        let active = &changes[1];
        assert_eq!(active.previous, RequestStatus::Requesting);
        assert_eq!(active.responder.as_ref(), Some(&responder));
        assert!(changes
            .iter()
            .all(|c| c.status == RequestStatus::Active || c.responder.is_none()));
    }

    #[test]
    fn test_cancel_before_delay_never_activates() {
        let (mut manager, clock, log) = create_manager();
        manager.submit(HelpKind::Pad, "").unwrap();
        clock.advance_ms(2000);

        manager.cancel().unwrap();
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(!manager.has_pending_search());
        assert_eq!(manager.next_deadline(), None);

        clock.advance_ms(60_000);
        assert_eq!(manager.poll(), 0);
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(!statuses(&log).contains(&RequestStatus::Active));
        assert_eq!(statuses(&log), vec![RequestStatus::Requesting, RequestStatus::Idle]);
    }

    #[test]
    fn test_cancel_at_same_instant_wins() {
        let (mut manager, clock, log) = create_manager();
        manager.submit(HelpKind::Tissue, "").unwrap();
        clock.advance_ms(5000);

        manager.cancel().unwrap();
        manager.poll();

        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(!statuses(&log).contains(&RequestStatus::Active));
    }

    #[test]
    fn test_old_episode_cannot_activate_new_request() {
        let (mut manager, clock, log) = create_manager();
        manager.submit(HelpKind::Pad, "first").unwrap();
        clock.advance_ms(3000);
        manager.cancel().unwrap();

        let second = manager.submit(HelpKind::Tissue, "second").unwrap();
        // First request's deadline would have been now + 2000
        clock.advance_ms(2000);
        assert_eq!(manager.poll(), 0);
        assert_eq!(manager.current_status(), RequestStatus::Requesting);

        clock.advance_ms(3000);
        assert_eq!(manager.poll(), 1);
        assert_eq!(manager.current_status(), RequestStatus::Active);
        let active: Vec<_> =
            log.borrow().iter().filter(|c| c.status == RequestStatus::Active).cloned().collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].request_id, Some(second));
    }

    #[test]
    fn test_cancel_from_active_clears_responder() {
        let (mut manager, clock, log) = create_manager();
        manager.submit(HelpKind::Safety, "").unwrap();
        clock.advance_ms(5000);
        manager.poll();
        assert!(manager.responder().is_some());

        manager.cancel().unwrap();
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(manager.responder().is_none());
        assert!(manager.current_request().is_none());
        let last = log.borrow().last().cloned().unwrap();
        assert_eq!(last.previous, RequestStatus::Active);
        assert!(last.responder.is_none());
    }

    #[test]
    fn test_cancel_rejected_when_idle() {
        let (mut manager, _, log) = create_manager();
        let err = manager.cancel().unwrap_err();
        assert_eq!(err, HelpError::invalid_transition(Operation::Cancel, RequestStatus::Idle));
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_resolve_rejected_unless_active() {
        let (mut manager, _, _) = create_manager();
        let err = manager.resolve().unwrap_err();
        assert_eq!(err, HelpError::invalid_transition(Operation::Resolve, RequestStatus::Idle));
        assert_eq!(manager.current_status(), RequestStatus::Idle);

        manager.submit(HelpKind::Other, "").unwrap();
        let err = manager.resolve().unwrap_err();
        assert_eq!(
            err,
            HelpError::invalid_transition(Operation::Resolve, RequestStatus::Requesting)
        );
        assert_eq!(manager.current_status(), RequestStatus::Requesting);
    }

    #[test]
    fn test_can_submit_again_after_resolve() {
        let (mut manager, clock, _) = create_manager();
        manager.submit(HelpKind::Pad, "").unwrap();
        clock.advance_ms(5000);
        manager.poll();
        manager.resolve().unwrap();

        assert!(manager.submit(HelpKind::Tissue, "").is_ok());
        assert_eq!(manager.current_status(), RequestStatus::Requesting);
    }

    #[test]
    fn test_retries_when_nobody_answers() {
        let clock = ManualClock::default();
        let config = LifecycleConfig {
            resolution_delay_ms: 1000,
            retry_delay_ms: 500,
            max_search_attempts: 3,
        };
        let mut manager =
            LifecycleManager::new(config, clock.clone(), ScriptedMatcher::new([false, true]))
                .unwrap();
        manager.submit(HelpKind::Pad, "").unwrap();

        clock.advance_ms(1000);
        assert_eq!(manager.poll(), 1);
        assert_eq!(manager.current_status(), RequestStatus::Requesting);
        assert!(manager.has_pending_search());
        let retry_at = clock.now() + chrono::Duration::milliseconds(500);
        assert_eq!(manager.next_deadline(), Some(retry_at));

        clock.advance_ms(500);
        manager.poll();
        assert_eq!(manager.current_status(), RequestStatus::Active);
        assert_eq!(manager.matcher().calls(), 2);
    }

    #[test]
    fn test_search_exhaustion_leaves_request_open() {
        let clock = ManualClock::default();
        let config = LifecycleConfig {
            resolution_delay_ms: 100,
            retry_delay_ms: 100,
            max_search_attempts: 2,
        };
        let mut manager =
            LifecycleManager::new(config, clock.clone(), ScriptedMatcher::new([])).unwrap();
        manager.submit(HelpKind::Other, "").unwrap();

        for _ in 0..5 {
            clock.advance_ms(100);
            manager.poll();
        }

        assert_eq!(manager.matcher().calls(), 2);
        assert_eq!(manager.current_status(), RequestStatus::Requesting);
        assert!(!manager.has_pending_search());
        assert_eq!(manager.statistics().exhausted, 1);
        assert!(manager.cancel().is_ok());
    }

    #[test]
    fn test_multiple_listeners_and_removal() {
        let (mut manager, clock, log) = create_manager();
        let second: Log = Rc::new(RefCell::new(Vec::new()));
        let sink = second.clone();
        let id = manager.on_status_change(move |change| sink.borrow_mut().push(change.clone()));

        manager.submit(HelpKind::Pad, "").unwrap();
        assert_eq!(second.borrow().len(), 1);

        assert!(manager.remove_listener(id));
        assert!(!manager.remove_listener(id));
        clock.advance_ms(5000);
        manager.poll();

        assert_eq!(second.borrow().len(), 1);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_statistics() {
        let (mut manager, clock, _) = create_manager();

        manager.submit(HelpKind::Pad, "").unwrap();
        manager.cancel().unwrap();

        manager.submit(HelpKind::Pad, "").unwrap();
        clock.advance_ms(5000);
        manager.poll();
        manager.resolve().unwrap();

        let _ = manager.resolve();

        let stats = manager.statistics();
        assert_eq!(stats.submitted, 2);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.exhausted, 0);
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = LifecycleConfig { resolution_delay_ms: i64::MAX as u64, ..Default::default() };
        let result =
            LifecycleManager::new(config, ManualClock::default(), ScriptedMatcher::new([]));
        assert!(matches!(result, Err(HelpError::InvalidParameter(_))));

        let config = LifecycleConfig { max_search_attempts: 0, ..Default::default() };
        assert!(LifecycleManager::with_config(config).is_err());
    }

    #[test]
    fn test_submit_at_end_of_time_fails_cleanly() {
        let (mut manager, clock, log) = create_manager();
        clock.set(DateTime::<Utc>::MAX_UTC);

        let err = manager.submit(HelpKind::Pad, "").unwrap_err();
        assert!(matches!(err, HelpError::InvalidParameter(_)));
        assert_eq!(manager.current_status(), RequestStatus::Idle);
        assert!(manager.current_request().is_none());
        assert!(!manager.has_pending_search());
        assert_eq!(manager.statistics().submitted, 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_retry_past_end_of_time_exhausts() {
        let clock = ManualClock::default();
        let config = LifecycleConfig {
            resolution_delay_ms: 1000,
            retry_delay_ms: 1000,
            max_search_attempts: 3,
        };
        let mut manager =
            LifecycleManager::new(config, clock.clone(), ScriptedMatcher::new([false])).unwrap();
        clock.set(DateTime::<Utc>::MAX_UTC - chrono::Duration::milliseconds(1000));
        manager.submit(HelpKind::Pad, "").unwrap();

        clock.set(DateTime::<Utc>::MAX_UTC);
        assert_eq!(manager.poll(), 1);
        assert_eq!(manager.current_status(), RequestStatus::Requesting);
        assert!(!manager.has_pending_search());
        assert_eq!(manager.statistics().exhausted, 1);
    }
}
