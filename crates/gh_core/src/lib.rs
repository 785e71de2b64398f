//! # gh_core - Help Request Lifecycle & Proximity Obfuscation Engine
//!
//! Core library behind the GirlsHelp app: someone signals that they need a
//! pad, a tissue or a companion, anonymous peers nearby can answer, and the
//! map shows who is around without revealing where exactly.
//!
//! ## Features
//! - Single-slot request state machine (idle → requesting → active → resolved)
//! - Cancellable deferred matching with an injected clock and matcher
//! - Fuzzy point cloud generation that never places a point on the viewer
//! - JSON API for UI shells

pub mod api;
pub mod config;
pub mod error;
pub mod proximity;
pub mod request;

pub use config::{CoreConfig, LifecycleConfig, ProximityConfig};
pub use error::{ConfigError, HelpError, Operation, Result};

pub use request::{
    Clock, HelpKind, HelpRequest, LifecycleManager, LifecycleStatistics, ListenerId, ManualClock,
    Matcher, RequestId, RequestStatus, Responder, SimulatedMatcher, StatusChange, SystemClock,
};

pub use proximity::{
    ActorPoint, ActorRole, FuzzyBatch, NearbyActor, Point2, ProximityEngine, Selection,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
