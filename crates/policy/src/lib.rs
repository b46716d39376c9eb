//! Declarative feature gating.
//!
//! Core principle: **every invocation of a gated feature is evaluated
//! against a policy rule before the host performs the action.** A rule
//! expresses who may use a feature, when, how often, and (for monetary
//! features) how much; the [`PolicyEngine`] turns a rule plus a runtime
//! context into exactly one [`PermissionOutcome`].
//!
//! Evaluation never records usage. The host calls
//! [`PolicyEngine::record_use`] after the protected action actually ran.

mod context;
mod engine;
mod outcome;
mod preset;
mod rule;
mod usage;

pub use context::EvalContext;
pub use engine::PolicyEngine;
pub use outcome::PermissionOutcome;
pub use preset::Preset;
pub use rule::{BaselineMode, FeatureConstraints, PolicyRule, RateLimit, RateUnit, TimeWindow};
pub use usage::{UsageCheck, UsageTracker};
