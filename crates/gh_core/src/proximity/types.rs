use serde::{Deserialize, Serialize};
use std::fmt;

/// 2D coordinate in render units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub const ORIGIN: Point2 = Point2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Angle in radians, counter-clockwise from +x
    pub fn from_polar(radius: f64, angle: f64) -> Self {
        Self { x: angle.cos() * radius, y: angle.sin() * radius }
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance_to(&self, other: Point2) -> f64 {
        (*self - other).length()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Sub for Point2 {
    type Output = Point2;

    fn sub(self, rhs: Point2) -> Point2 {
        Point2 { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    /// Someone asking for help
    Seeker,
    /// Someone able to help
    Helper,
}

impl fmt::Display for ActorRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ActorRole::Seeker => write!(f, "seeker"),
            ActorRole::Helper => write!(f, "helper"),
        }
    }
}

/// A real nearby person, positioned in the same frame as the viewer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NearbyActor {
    pub role: ActorRole,
    pub position: Point2,
}

/// One display-safe point on the fuzzy map.
///
/// Fields are read-only once generated. The true offset, when there is one, is
/// kept out of serialized output and has no public accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorPoint {
    id: u32,
    role: ActorRole,
    fuzzy_position: Point2,
    distance_estimate: u32,
    #[serde(skip)]
    true_position: Option<Point2>,
}

impl ActorPoint {
    pub(crate) fn new(
        id: u32,
        role: ActorRole,
        fuzzy_position: Point2,
        distance_estimate: u32,
        true_position: Option<Point2>,
    ) -> Self {
        Self { id, role, fuzzy_position, distance_estimate, true_position }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn role(&self) -> ActorRole {
        self.role
    }

    pub fn fuzzy_position(&self) -> Point2 {
        self.fuzzy_position
    }

    /// Approximate distance in meters
    pub fn distance_estimate(&self) -> u32 {
        self.distance_estimate
    }

    pub(crate) fn true_position(&self) -> Option<Point2> {
        self.true_position
    }

    /// Detail line for the selection sheet
    pub fn describe(&self) -> String {
        let who = match self.role {
            ActorRole::Helper => "Helper nearby",
            ActorRole::Seeker => "Someone nearby needs help",
        };
        format!("{who}, about {} m away", self.distance_estimate)
    }
}

/// Generation-ordered, immutable set of points for one map activation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuzzyBatch {
    points: Vec<ActorPoint>,
}

impl FuzzyBatch {
    pub(crate) fn from_points(points: Vec<ActorPoint>) -> Self {
        Self { points }
    }

    pub fn points(&self) -> &[ActorPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ActorPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&ActorPoint> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn count_role(&self, role: ActorRole) -> usize {
        self.points.iter().filter(|p| p.role == role).count()
    }
}

impl<'a> IntoIterator for &'a FuzzyBatch {
    type Item = &'a ActorPoint;
    type IntoIter = std::slice::Iter<'a, ActorPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
