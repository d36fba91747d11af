//! AI suggestion engine for a railway traffic-control simulator.
//!
//! Given a read-only view of a running simulation (trains, routes, track
//! items, signals, the simulation clock), this crate recomputes a ranked,
//! deduplicated set of operator suggestions — activate a route, deactivate a
//! blocking persistent route, proceed past a stop signal with caution, or
//! temporarily override a signal aspect. It never mutates simulation state
//! except through the host's own accept-path operations
//! ([`host::SimulationHandle::activate_route`] and friends).
//!
//! The crate is organized leaf-first, matching the pipeline it implements:
//! [`reader`] (SSR) and [`geometry`] (GKH) are read-only queries over the
//! host; [`safety`] (SP) layers conservative predicates on top; [`candidates`]
//! (CG) produces suggestions; [`rank`] (RC) and [`reject`] (RF) shape the
//! final list; [`engine`] (SCH) drives the whole thing on the simulation
//! clock and exposes the accept/reject/recompute surface to the host.

pub mod candidates;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod geometry;
pub mod host;
pub mod rank;
pub mod reader;
pub mod reason;
pub mod reject;
pub mod safety;
pub mod suggestion;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use engine::{RecomputeStats, SuggestionEngine};
pub use error::AcceptError;
pub use host::{Options, SimulationHandle};
pub use suggestion::{Action, Suggestion, SuggestionId, SuggestionKind, SuggestionsSnapshot};
