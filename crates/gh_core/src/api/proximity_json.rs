use super::{ApiError, ApiResponse, API_VERSION};
use crate::config::ProximityConfig;
use crate::proximity::{ActorPoint, ActorRole, Point2, ProximityEngine};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Fuzzy map request; omitted fields take the configured defaults.
///
/// `schema_version`, when given, must equal [`API_VERSION`].
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FuzzyBatchRequest {
    pub schema_version: Option<String>,
    pub seed: Option<u64>,
    pub count: Option<usize>,
    pub role_ratio: Option<f64>,
    #[serde(default)]
    pub config: Option<ProximityConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyBatchResponse {
    pub points: Vec<ActorPoint>,
    pub seekers: usize,
    pub helpers: usize,
}

/// Generate a fuzzy map batch from a JSON request.
///
/// Returns the serialized [`ApiResponse`]. Parameter errors are reported in
/// the response body; `Err` is only returned if the response itself cannot be
/// serialized.
pub fn generate_fuzzy_batch_json(request_json: &str) -> Result<String, String> {
    let response = match serde_json::from_str::<FuzzyBatchRequest>(request_json) {
        Ok(request) => handle_request(request),
        Err(e) => {
            warn!("Malformed fuzzy batch request: {e}");
            ApiResponse::err(ApiError::bad_request(format!("Malformed request: {e}")))
        }
    };
    serde_json::to_string(&response).map_err(|e| format!("Failed to serialize response: {e}"))
}

fn handle_request(request: FuzzyBatchRequest) -> ApiResponse<FuzzyBatchResponse> {
    if let Some(version) = request.schema_version.as_deref() {
        if version != API_VERSION {
            warn!(version, "Unsupported schema version");
            return ApiResponse::err(ApiError::bad_request(format!(
                "Unsupported schema_version {version}, expected {API_VERSION}"
            )));
        }
    }

    let config = request.config.unwrap_or_default();
    let count = request.count.unwrap_or(config.default_count);
    let role_ratio = request.role_ratio.unwrap_or(config.default_role_ratio);

    let engine = match request.seed {
        Some(seed) => ProximityEngine::with_seed(config, seed),
        None => ProximityEngine::new(config),
    };

    let batch =
        engine.and_then(|mut e| e.generate_fuzzy_batch(Point2::ORIGIN, count, role_ratio));
    match batch {
        Ok(batch) => ApiResponse::ok(FuzzyBatchResponse {
            seekers: batch.count_role(ActorRole::Seeker),
            helpers: batch.count_role(ActorRole::Helper),
            points: batch.points().to_vec(),
        }),
        Err(e) => ApiResponse::err(ApiError::from(&e)),
    }
}
