pub mod engine;
pub mod selection;
pub mod types;

pub use engine::ProximityEngine;
pub use selection::Selection;
pub use types::{ActorPoint, ActorRole, FuzzyBatch, NearbyActor, Point2};
