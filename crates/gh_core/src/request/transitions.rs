// ============================================================================
// Request Status FSM
// ============================================================================
//
// Valid Transition Diagram:
// ```
// Idle → Requesting → Active → Resolved → Idle
//          ↓            ↓
//         Idle         Idle        (cancel)
// ```
//
// Invalid Examples:
// - Idle → Active (nothing was requested)
// - Requesting → Resolved (nobody has answered yet)
// - Active → Requesting (a matched request is never searched again)

use super::types::RequestStatus;

pub struct TransitionValidator;

impl TransitionValidator {
    /// Validate a status transition
    ///
    /// # Examples
    /// ```
    /// use gh_core::request::{RequestStatus, TransitionValidator};
    ///
    /// assert!(TransitionValidator::validate_transition(
    ///     RequestStatus::Idle,
    ///     RequestStatus::Requesting
    /// ).is_ok());
    ///
    /// assert!(TransitionValidator::validate_transition(
    ///     RequestStatus::Idle,
    ///     RequestStatus::Active
    /// ).is_err());
    /// ```
    pub fn validate_transition(from: RequestStatus, to: RequestStatus) -> Result<(), String> {
        use RequestStatus::*;

        let valid = match (from, to) {
            (Idle, Requesting) => true,

            (Requesting, Active) => true,
            (Requesting, Idle) => true,

            (Active, Resolved) => true,
            (Active, Idle) => true,

            (Resolved, Idle) => true,

            _ => false,
        };

        if !valid {
            return Err(format!("Invalid status transition: {} → {}", from, to));
        }

        Ok(())
    }
}
