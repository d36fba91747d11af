//! Candidate Generators (CG).
//!
//! Five independent producers, one module each, following a
//! one-algorithm-per-file layout. Each generator reads the [`StateReader`]
//! and [`crate::safety`] predicates and returns zero or more
//! [`Suggestion`]s; a precondition miss or a safety veto is always a silent
//! skip of that one candidate, never a partial failure of the whole
//! recomputation.

pub mod deactivation;
pub mod departure;
pub mod override_signal;
pub mod predictive;
pub mod proceed;
pub mod util;
