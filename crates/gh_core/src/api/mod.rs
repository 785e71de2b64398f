//! JSON API for UI shells
//!
//! String-in/string-out entry points so a shell written in any language can
//! drive the core without linking against its types.

pub mod lifecycle_json;
pub mod proximity_json;

use crate::error::HelpError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// API version for schema compatibility
pub const API_VERSION: &str = "v1";

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
    pub schema_version: String,
    pub timestamp: DateTime<Utc>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn err(error: ApiError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            schema_version: API_VERSION.to_string(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl From<&HelpError> for ApiError {
    fn from(err: &HelpError) -> Self {
        Self { code: err.code().to_string(), message: err.to_string() }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { code: "BAD_REQUEST".to_string(), message: message.into() }
    }
}

pub use lifecycle_json::{lifecycle_snapshot_json, LifecycleSnapshot};
pub use proximity_json::{generate_fuzzy_batch_json, FuzzyBatchRequest, FuzzyBatchResponse};
