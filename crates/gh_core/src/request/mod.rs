pub mod clock;
pub mod manager;
pub mod matcher;
pub mod timer;
pub mod transitions;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use manager::{LifecycleManager, LifecycleStatistics};
pub use matcher::{Matcher, SimulatedMatcher};
pub use transitions::TransitionValidator;
pub use types::{
    HelpKind, HelpRequest, ListenerId, RequestId, RequestStatus, Responder, StatusChange,
};
