//! The execution pipeline.
//!
//! A [`FixtureStage`] runs a fixture's selected cases through three nested scopes:
//!
//! ```text
//! class set-up ──► instantiation (per case | per fixture)
//!                    └─► instance set-up ──► for each case:
//!                                             method set-up ──► invoke ──► method tear-down
//!                  ◄── instance tear-down ◄── release
//! class tear-down
//! ```
//!
//! Every failure is captured where it happens, tagged with its phase, and appended to
//! the cases it affects. Nothing a fixture does (errors or panics) escapes
//! [`FixtureStage::execute`].

mod builder;
mod fixture;
mod guard;
mod invoke;
mod stage;
mod strategy;

pub use builder::{FixtureStageBuilder, InstanceStageBuilder, MethodStageBuilder};
pub use fixture::{BoxError, Fixture, Method, MethodResult, Release};
pub use invoke::{invoke_all, invoke_all_static};
pub use stage::{ClassHook, FixtureStage, InstanceHook, InstanceStage, MethodStage};
pub use strategy::{Factory, Lifecycle};
