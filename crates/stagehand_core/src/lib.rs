//! Shared vocabulary for the stagehand execution pipeline.
//!
//! This crate is intentionally small and IO-free. It holds the types that both the
//! pipeline and its reporters agree on:
//! - captured failures and the append-only [`FailureList`] that aggregates them,
//! - [`Case`], the per-method failure record and its pass/fail status,
//! - the marker registry and the declarative [`MethodFilter`] used to pick methods out
//!   of a fixture's method table.
//!
//! ## Notes
//!
//! - No global state, no reflection: fixtures describe their methods as data once and
//!   everything downstream filters that data.

pub mod case;
pub mod failure;
pub mod filter;
pub mod markers;

pub use case::{Case, CaseOutcome, CaseStatus};
pub use failure::{Failure, FailureKind, FailureList, Scope};
pub use filter::{MethodFilter, MethodMeta, Receiver, Rule};
pub use markers::{Marker, MarkerId};
