//! Structured rationale for a candidate suggestion.
//!
//! Each candidate generator builds a `Reason` instead of a bare `String`, so
//! tests can assert on *why* a suggestion fired (the structured fields)
//! rather than matching against rendered text. `Display` renders the exact
//! template strings that cross the wire; [`crate::suggestion::Suggestion`]
//! stores the rendered form since that is what reaches a UI.

use std::fmt;

use crate::clock::SimTime;

#[derive(Debug, Clone, PartialEq)]
pub enum Reason {
    /// Departure Route Activation.
    DepartureReady { scheduled: SimTime },
    /// Predictive Route Activation.
    PredictiveApproach { distance_m: f64, eta_s: f64 },
    /// Route Deactivation.
    BlocksReadyDepartures { count: usize },
    /// Proceed With Caution.
    ProceedPathClear,
    /// Signal Override.
    OverrideAspect { aspect_name: String },
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::DepartureReady { scheduled } => write!(
                f,
                "Scheduled departure was {scheduled}, minimum stop satisfied. No conflicts detected."
            ),
            Reason::PredictiveApproach { distance_m, eta_s } => write!(
                f,
                "Train is approaching a stop signal ({distance_m:.0}m, ETA {eta_s:.0}s); no conflicts detected ahead."
            ),
            Reason::BlocksReadyDepartures { count } => {
                write!(f, "Route blocks {count} ready departure(s) via interlocking.")
            }
            Reason::ProceedPathClear => {
                write!(f, "Train is stopped at a stop signal with a clear path ahead.")
            }
            Reason::OverrideAspect { aspect_name } => {
                write!(f, "Signal can be set to {aspect_name} for a cautious proceed.")
            }
        }
    }
}

impl From<Reason> for String {
    fn from(reason: Reason) -> Self {
        reason.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_departure_ready_template() {
        let r = Reason::DepartureReady { scheduled: SimTime(6 * 3600 + 5 * 60) };
        assert_eq!(r.to_string(), "Scheduled departure was 06:05:00, minimum stop satisfied. No conflicts detected.");
    }

    #[test]
    fn renders_predictive_approach_template() {
        let r = Reason::PredictiveApproach { distance_m: 400.0, eta_s: 20.0 };
        assert_eq!(r.to_string(), "Train is approaching a stop signal (400m, ETA 20s); no conflicts detected ahead.");
    }

    #[test]
    fn renders_blocks_ready_departures_template() {
        let r = Reason::BlocksReadyDepartures { count: 1 };
        assert_eq!(r.to_string(), "Route blocks 1 ready departure(s) via interlocking.");
    }

    #[test]
    fn renders_proceed_path_clear_template() {
        assert_eq!(
            Reason::ProceedPathClear.to_string(),
            "Train is stopped at a stop signal with a clear path ahead."
        );
    }

    #[test]
    fn renders_override_aspect_template() {
        let r = Reason::OverrideAspect { aspect_name: "CAUTION".to_string() };
        assert_eq!(r.to_string(), "Signal can be set to CAUTION for a cautious proceed.");
    }
}
