use super::ApiResponse;
use crate::request::{
    Clock, HelpRequest, LifecycleManager, LifecycleStatistics, Matcher, RequestStatus, Responder,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time view of the lifecycle manager for rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleSnapshot {
    pub status: RequestStatus,
    pub request: Option<HelpRequest>,
    pub responder: Option<Responder>,
    pub next_search_at: Option<DateTime<Utc>>,
    pub statistics: LifecycleStatistics,
}

impl LifecycleSnapshot {
    pub fn capture<C: Clock, M: Matcher>(manager: &LifecycleManager<C, M>) -> Self {
        Self {
            status: manager.current_status(),
            request: manager.current_request().cloned(),
            responder: manager.responder().cloned(),
            next_search_at: manager.next_deadline(),
            statistics: manager.statistics().clone(),
        }
    }
}

pub fn lifecycle_snapshot_json<C: Clock, M: Matcher>(
    manager: &LifecycleManager<C, M>,
) -> Result<String, String> {
    let response = ApiResponse::ok(LifecycleSnapshot::capture(manager));
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize snapshot: {e}"))
}
