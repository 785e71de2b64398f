use crate::error::HelpError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Category of help being asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HelpKind {
    /// Sanitary pad
    Pad,
    Tissue,
    /// Someone to walk along or wait nearby
    Safety,
    Other,
}

impl HelpKind {
    pub const ALL: [HelpKind; 4] =
        [HelpKind::Pad, HelpKind::Tissue, HelpKind::Safety, HelpKind::Other];

    /// Wire name, also accepted by `FromStr`
    pub fn as_str(&self) -> &'static str {
        match self {
            HelpKind::Pad => "pad",
            HelpKind::Tissue => "tissue",
            HelpKind::Safety => "safety",
            HelpKind::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HelpKind::Pad => "Sanitary pad",
            HelpKind::Tissue => "Tissue",
            HelpKind::Safety => "Safety companion",
            HelpKind::Other => "Other urgent need",
        }
    }
}

impl fmt::Display for HelpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for HelpKind {
    type Err = HelpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pad" | "sanitary-pad" | "sanitary_pad" => Ok(HelpKind::Pad),
            "tissue" => Ok(HelpKind::Tissue),
            "safety" | "safety-companion" | "safety_companion" => Ok(HelpKind::Safety),
            "other" => Ok(HelpKind::Other),
            _ => Err(HelpError::InvalidKind(s.to_string())),
        }
    }
}

/// Lifecycle status of the request slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Idle,
    /// Submitted, searching for a responder
    Requesting,
    /// A responder has answered
    Active,
    /// Finished by the seeker; transient on the way back to idle
    Resolved,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Idle => "idle",
            RequestStatus::Requesting => "requesting",
            RequestStatus::Active => "active",
            RequestStatus::Resolved => "resolved",
        }
    }

    /// Whether the single request slot is occupied
    pub fn is_occupied(&self) -> bool {
        matches!(self, RequestStatus::Requesting | RequestStatus::Active)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anonymous handle for whoever answered a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Responder {
    pub id: Uuid,
    pub kind: HelpKind,
    pub matched_at: DateTime<Utc>,
}

/// The outstanding help request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HelpRequest {
    pub id: RequestId,
    pub kind: HelpKind,
    pub note: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub responder: Option<Responder>,
}

impl HelpRequest {
    pub fn new(kind: HelpKind, note: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id: RequestId::new(),
            kind,
            note,
            status: RequestStatus::Requesting,
            created_at,
            responder: None,
        }
    }

    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }

    pub fn activate(&mut self, responder: Responder) {
        self.status = RequestStatus::Active;
        self.responder = Some(responder);
    }

    pub fn mark_resolved(&mut self) {
        self.status = RequestStatus::Resolved;
    }
}

/// Payload delivered to status listeners
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub request_id: Option<RequestId>,
    pub previous: RequestStatus,
    pub status: RequestStatus,
    /// Present only when entering `Active`
    pub responder: Option<Responder>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ListenerId(pub u64);
